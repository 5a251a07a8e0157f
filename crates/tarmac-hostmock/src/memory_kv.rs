//! An in-memory `kvstore` host.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use prost::Message;
use tarmac_core::{
    CallAddress, HostCall, HostReply, STATUS_BAD_INPUT, STATUS_NOT_FOUND, STATUS_SUCCESS,
    TransportError,
};
use tarmac_proto::Status;
use tarmac_proto::kvstore::{
    KvStoreDelete, KvStoreDeleteResponse, KvStoreGet, KvStoreGetResponse, KvStoreKeys,
    KvStoreKeysResponse, KvStoreSet, KvStoreSetResponse,
};
use tracing::debug;

/// Answers `kvstore/{get,set,delete,keys}` from memory, the way the real
/// host does. Values are scoped by namespace.
#[derive(Clone, Default)]
pub struct MemoryKvHost {
    store: Arc<DashMap<(String, String), Vec<u8>>>,
}

impl fmt::Debug for MemoryKvHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryKvHost")
            .field("entries", &self.store.len())
            .finish()
    }
}

impl MemoryKvHost {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value.
    pub fn with_entry(
        self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.store
            .insert((namespace.into(), key.into()), value.into());
        self
    }

    /// Read a stored value directly.
    pub fn value(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        self.store
            .get(&(namespace.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Number of stored values across all namespaces.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn get(&self, namespace: &str, payload: &[u8]) -> Result<Vec<u8>, prost::DecodeError> {
        let request = KvStoreGet::decode(payload)?;
        let slot = (namespace.to_string(), request.key);
        let response = match self.store.get(&slot) {
            Some(entry) => KvStoreGetResponse {
                status: Some(Status::new(STATUS_SUCCESS, "OK")),
                data: entry.value().clone(),
            },
            None => KvStoreGetResponse {
                status: Some(Status::new(STATUS_NOT_FOUND, "key not found")),
                data: Vec::new(),
            },
        };
        Ok(response.encode_to_vec())
    }

    fn set(&self, namespace: &str, payload: &[u8]) -> Result<Vec<u8>, prost::DecodeError> {
        let request = KvStoreSet::decode(payload)?;
        let status = if request.key.is_empty() {
            Status::new(STATUS_BAD_INPUT, "key must not be empty")
        } else {
            self.store
                .insert((namespace.to_string(), request.key), request.data);
            Status::new(STATUS_SUCCESS, "OK")
        };
        Ok(KvStoreSetResponse {
            status: Some(status),
        }
        .encode_to_vec())
    }

    fn delete(&self, namespace: &str, payload: &[u8]) -> Result<Vec<u8>, prost::DecodeError> {
        let request = KvStoreDelete::decode(payload)?;
        let status = match self.store.remove(&(namespace.to_string(), request.key)) {
            Some(_) => Status::new(STATUS_SUCCESS, "OK"),
            None => Status::new(STATUS_NOT_FOUND, "key not found"),
        };
        Ok(KvStoreDeleteResponse {
            status: Some(status),
        }
        .encode_to_vec())
    }

    fn keys(&self, namespace: &str, payload: &[u8]) -> Result<Vec<u8>, prost::DecodeError> {
        KvStoreKeys::decode(payload)?;
        let mut keys: Vec<String> = self
            .store
            .iter()
            .filter(|entry| entry.key().0 == namespace)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        Ok(KvStoreKeysResponse {
            status: Some(Status::new(STATUS_SUCCESS, "OK")),
            keys,
        }
        .encode_to_vec())
    }
}

impl HostCall for MemoryKvHost {
    fn call(&self, address: &CallAddress, payload: &[u8]) -> HostReply {
        debug!(address = %address, "Memory kvstore call");
        if address.capability() != "kvstore" {
            return HostReply::failed(TransportError::new(format!(
                "unsupported capability {}",
                address.capability()
            )));
        }

        let namespace = address.namespace();
        let result = match address.function() {
            "get" => self.get(namespace, payload),
            "set" => self.set(namespace, payload),
            "delete" => self.delete(namespace, payload),
            "keys" => self.keys(namespace, payload),
            other => {
                return HostReply::failed(TransportError::new(format!(
                    "unsupported kvstore function {other}"
                )));
            }
        };

        match result {
            Ok(response) => HostReply::ok(response),
            Err(e) => HostReply::failed(TransportError::new(format!(
                "malformed kvstore request: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(host: &MemoryKvHost, function: &str, payload: Vec<u8>) -> HostReply {
        host.call(&CallAddress::new("default", "kvstore", function), &payload)
    }

    #[test]
    fn test_set_then_get() {
        let host = MemoryKvHost::new();
        let set = call(
            &host,
            "set",
            KvStoreSet {
                key: "k".into(),
                data: b"v".to_vec(),
            }
            .encode_to_vec(),
        );
        let set = KvStoreSetResponse::decode(set.payload.as_slice()).unwrap();
        assert_eq!(set.status.unwrap().code, STATUS_SUCCESS);

        let get = call(&host, "get", KvStoreGet { key: "k".into() }.encode_to_vec());
        let get = KvStoreGetResponse::decode(get.payload.as_slice()).unwrap();
        assert_eq!(get.status.unwrap().code, STATUS_SUCCESS);
        assert_eq!(get.data, b"v");
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let host = MemoryKvHost::new();
        let get = call(&host, "get", KvStoreGet { key: "nope".into() }.encode_to_vec());
        let get = KvStoreGetResponse::decode(get.payload.as_slice()).unwrap();
        assert_eq!(get.status.unwrap().code, STATUS_NOT_FOUND);

        let delete = call(
            &host,
            "delete",
            KvStoreDelete { key: "nope".into() }.encode_to_vec(),
        );
        let delete = KvStoreDeleteResponse::decode(delete.payload.as_slice()).unwrap();
        assert_eq!(delete.status.unwrap().code, STATUS_NOT_FOUND);
    }

    #[test]
    fn test_keys_are_scoped_by_namespace() {
        let host = MemoryKvHost::new()
            .with_entry("default", "b", b"2".to_vec())
            .with_entry("default", "a", b"1".to_vec())
            .with_entry("other", "c", b"3".to_vec());

        let keys = call(&host, "keys", KvStoreKeys::default().encode_to_vec());
        let keys = KvStoreKeysResponse::decode(keys.payload.as_slice()).unwrap();
        assert_eq!(keys.keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(host.len(), 3);
        assert_eq!(host.value("other", "c"), Some(b"3".to_vec()));
    }

    #[test]
    fn test_unknown_function() {
        let host = MemoryKvHost::new();
        let reply = call(&host, "scan", Vec::new());
        assert_eq!(
            reply.error.unwrap().message(),
            "unsupported kvstore function scan"
        );
    }
}
