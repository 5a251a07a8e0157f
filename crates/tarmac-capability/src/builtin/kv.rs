//! Key-value store client.
//!
//! Keys must be non-empty and values must be present. A missing key on
//! `get` is reported as [`KvError::KeyNotFound`]; deleting a missing key
//! succeeds. Any transport failure is fatal for this capability, even when
//! the host also sent a usable response.

use tarmac_core::{ClientConfig, HostBinding, HostCallError, TransportPolicy};
use tarmac_proto::kvstore::{
    KvStoreDelete, KvStoreDeleteResponse, KvStoreGet, KvStoreGetResponse, KvStoreKeys,
    KvStoreKeysResponse, KvStoreSet, KvStoreSetResponse,
};
use thiserror::Error;
use tracing::debug;

use crate::capability::{Capability, CapabilityId, standard_ids};
use crate::error::{HostErrorExt, PartialError, settle};

const POLICY: TransportPolicy = TransportPolicy::FailFast;

/// Errors returned by the KV client. `T` is the value carried on partial
/// success.
#[derive(Debug, Error)]
pub enum KvError<T = ()> {
    /// The key was empty.
    #[error("key is invalid")]
    InvalidKey,

    /// No value was supplied to `set`.
    #[error("value is invalid")]
    InvalidValue,

    /// The key does not exist.
    #[error("key not found in store: {0}")]
    KeyNotFound(String),

    /// The host call failed.
    #[error(transparent)]
    Host(#[from] HostCallError),

    /// The host returned the value but reported it as partial.
    #[error("{error}")]
    Partial {
        /// The partial value.
        value: T,
        /// Why the value is partial.
        #[source]
        error: HostCallError,
    },
}

impl<T> KvError<T> {
    /// The partial value, if the host returned one.
    pub fn partial_value(&self) -> Option<&T> {
        match self {
            Self::Partial { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Take the partial value and its error.
    pub fn into_partial(self) -> Option<(T, HostCallError)> {
        match self {
            Self::Partial { value, error } => Some((value, error)),
            _ => None,
        }
    }
}

impl<T> HostErrorExt for KvError<T> {
    fn host_error(&self) -> Option<&HostCallError> {
        match self {
            Self::Host(error) | Self::Partial { error, .. } => Some(error),
            _ => None,
        }
    }

    fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_))
            || self.host_error().is_some_and(HostCallError::is_not_found)
    }
}

impl<T> PartialError<T> for KvError<T> {
    fn partial(value: T, error: HostCallError) -> Self {
        Self::Partial { value, error }
    }
}

/// Result type for KV operations.
pub type KvResult<T> = Result<T, KvError<T>>;

/// Operations offered by a key-value store.
///
/// Implemented by [`KvClient`] and by the in-memory
/// [`MemoryKv`](crate::mock::MemoryKv) double.
pub trait Kv: Send + Sync {
    /// Fetch the value stored under `key`.
    fn get(&self, key: &str) -> KvResult<Vec<u8>>;

    /// Store `value` under `key`. `None` is rejected; an empty slice is a
    /// valid value.
    fn set(&self, key: &str, value: Option<&[u8]>) -> KvResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> KvResult<()>;

    /// List every key.
    fn keys(&self) -> KvResult<Vec<String>>;
}

/// Client for the host `kvstore` capability.
#[derive(Debug, Clone)]
pub struct KvClient {
    binding: HostBinding,
}

impl KvClient {
    /// Create a client from the given configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            binding: config.bind(),
        }
    }
}

impl Capability for KvClient {
    fn id(&self) -> CapabilityId {
        standard_ids::KVSTORE
    }

    fn namespace(&self) -> &str {
        self.binding.namespace()
    }
}

impl Kv for KvClient {
    fn get(&self, key: &str) -> KvResult<Vec<u8>> {
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }
        debug!(namespace = self.namespace(), key, "kvstore get");

        let request = KvStoreGet {
            key: key.to_string(),
        };
        let outcome =
            self.binding
                .invoke::<_, KvStoreGetResponse>(self.id().as_str(), "get", &request, POLICY);
        match outcome {
            Err(e) if e.is_not_found() && !e.is_transport() => {
                Err(KvError::KeyNotFound(key.to_string()))
            }
            outcome => settle(outcome, |response| response.data),
        }
    }

    fn set(&self, key: &str, value: Option<&[u8]>) -> KvResult<()> {
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }
        let Some(value) = value else {
            return Err(KvError::InvalidValue);
        };
        debug!(namespace = self.namespace(), key, len = value.len(), "kvstore set");

        let request = KvStoreSet {
            key: key.to_string(),
            data: value.to_vec(),
        };
        let outcome =
            self.binding
                .invoke::<_, KvStoreSetResponse>(self.id().as_str(), "set", &request, POLICY);
        settle(outcome, |_| ())
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }
        debug!(namespace = self.namespace(), key, "kvstore delete");

        let request = KvStoreDelete {
            key: key.to_string(),
        };
        let outcome = self.binding.invoke::<_, KvStoreDeleteResponse>(
            self.id().as_str(),
            "delete",
            &request,
            POLICY,
        );
        match outcome {
            Err(e) if e.is_not_found() && !e.is_transport() => Ok(()),
            outcome => settle(outcome, |_| ()),
        }
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        debug!(namespace = self.namespace(), "kvstore keys");

        let request = KvStoreKeys { return_proto: true };
        let outcome = self.binding.invoke::<_, KvStoreKeysResponse>(
            self.id().as_str(),
            "keys",
            &request,
            POLICY,
        );
        settle(outcome, |response| response.keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use tarmac_hostmock::{MemoryKvHost, MockHost};
    use tarmac_proto::Status;

    fn client(host: impl tarmac_core::HostCall + 'static) -> KvClient {
        KvClient::new(&ClientConfig::new().with_host_call(host))
    }

    fn get_response(code: i32, data: &[u8]) -> Vec<u8> {
        KvStoreGetResponse {
            status: Some(Status::new(code, "status")),
            data: data.to_vec(),
        }
        .encode_to_vec()
    }

    fn set_response(code: i32) -> Vec<u8> {
        KvStoreSetResponse {
            status: Some(Status::new(code, "status")),
        }
        .encode_to_vec()
    }

    #[test]
    fn test_invalid_key_never_calls_host() {
        let mock = MockHost::new("default", "kvstore", "get");
        let kv = client(mock.clone());

        assert!(matches!(kv.get(""), Err(KvError::InvalidKey)));
        assert!(matches!(kv.set("", Some(b"v".as_slice())), Err(KvError::InvalidKey)));
        assert!(matches!(kv.delete(""), Err(KvError::InvalidKey)));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_missing_value_never_calls_host() {
        let mock = MockHost::new("default", "kvstore", "set");
        let kv = client(mock.clone());

        assert!(matches!(kv.set("k", None), Err(KvError::InvalidValue)));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_empty_value_is_valid() {
        let mock = MockHost::new("default", "kvstore", "set")
            .with_payload_validator(|payload| {
                let request = KvStoreSet::decode(payload).map_err(|e| e.to_string())?;
                if request.key == "k" && request.data.is_empty() {
                    Ok(())
                } else {
                    Err(format!("unexpected request {request:?}"))
                }
            })
            .with_response(set_response(200));
        let kv = client(mock.clone());

        kv.set("k", Some(b"".as_slice())).unwrap();
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_get_success() {
        let mock = MockHost::new("default", "kvstore", "get")
            .with_payload_validator(|payload| {
                let request = KvStoreGet::decode(payload).map_err(|e| e.to_string())?;
                (request.key == "greeting")
                    .then_some(())
                    .ok_or_else(|| "wrong key".to_string())
            })
            .with_response(get_response(200, b"hello"));

        assert_eq!(client(mock).get("greeting").unwrap(), b"hello");
    }

    #[test]
    fn test_get_not_found() {
        let mock = MockHost::new("default", "kvstore", "get").with_response(get_response(404, b""));
        let error = client(mock).get("missing").unwrap_err();
        assert!(matches!(error, KvError::KeyNotFound(ref key) if key == "missing"));
        assert!(error.is_not_found());
        assert!(!error.is_transport());
    }

    #[test]
    fn test_get_partial_returns_value() {
        let mock = MockHost::new("default", "kvstore", "get").with_response(get_response(206, b"part"));
        let error = client(mock).get("k").unwrap_err();
        assert!(error.is_partial());
        assert_eq!(error.partial_value().map(Vec::as_slice), Some(b"part".as_slice()));
        let (value, cause) = error.into_partial().unwrap();
        assert_eq!(value, b"part");
        assert_eq!(cause.status_code(), Some(206));
    }

    // KV fails fast on any transport error. SQL and HTTP keep a decodable
    // success instead; see their `test_transport_asymmetry_*` tests.
    #[test]
    fn test_transport_asymmetry_kv_fails_even_with_success_status() {
        let mock = MockHost::new("default", "kvstore", "get")
            .with_response(get_response(200, b"v"))
            .with_transport_error("connection reset");
        let error = client(mock).get("k").unwrap_err();
        assert!(matches!(error, KvError::Host(_)));
        assert!(error.is_transport());
        assert!(!error.is_partial());
    }

    #[test]
    fn test_transport_failure_without_payload() {
        let mock = MockHost::new("default", "kvstore", "get").failing("host unreachable");
        let error = client(mock.clone()).get("k").unwrap_err();
        assert!(matches!(error, KvError::Host(_)));
        assert!(error.is_transport());
        assert!(!error.is_decode());
        assert!(!error.is_not_found());
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_transport_failure_with_undecodable_payload() {
        let mock = MockHost::new("default", "kvstore", "get")
            .with_response(vec![0xff, 0xff, 0xff])
            .with_transport_error("connection reset");
        let error = client(mock).get("k").unwrap_err();
        assert!(error.is_transport());
        assert!(error.is_decode());
    }

    #[test]
    fn test_transport_error_with_partial_payload_is_fatal() {
        let mock = MockHost::new("default", "kvstore", "get")
            .with_response(get_response(206, b"v"))
            .with_transport_error("connection reset");
        let error = client(mock).get("k").unwrap_err();
        assert!(matches!(error, KvError::Host(_)));
        assert!(error.is_transport());
        assert!(error.is_partial());
    }

    #[test]
    fn test_transport_error_with_not_found_is_not_key_not_found() {
        let mock = MockHost::new("default", "kvstore", "get")
            .with_response(get_response(404, b""))
            .with_transport_error("connection reset");
        let error = client(mock).get("k").unwrap_err();
        assert!(matches!(error, KvError::Host(_)));
        assert!(error.is_transport());
        assert!(error.is_not_found());
    }

    #[test]
    fn test_status_errors() {
        struct Case {
            code: i32,
            response_invalid: bool,
        }

        let cases = [
            Case { code: 400, response_invalid: false },
            Case { code: 500, response_invalid: false },
            Case { code: 0, response_invalid: true },
            Case { code: 302, response_invalid: true },
        ];

        for case in cases {
            let mock = MockHost::new("default", "kvstore", "set").with_response(set_response(case.code));
            let error = client(mock).set("k", Some(b"v".as_slice())).unwrap_err();
            assert!(matches!(error, KvError::Host(_)), "code {}", case.code);
            assert_eq!(error.is_response_invalid(), case.response_invalid, "code {}", case.code);
            assert!(!error.is_transport());
        }
    }

    #[test]
    fn test_undecodable_response() {
        let mock = MockHost::new("default", "kvstore", "keys").with_response(vec![0xff, 0x01]);
        let error = client(mock).keys().unwrap_err();
        assert!(error.is_decode());
    }

    #[test]
    fn test_empty_response_is_invalid() {
        let mock = MockHost::new("default", "kvstore", "delete");
        let error = client(mock).delete("k").unwrap_err();
        assert!(error.is_response_invalid());
    }

    #[test]
    fn test_delete_missing_key_succeeds() {
        let kv = client(MemoryKvHost::new());
        kv.delete("never-set").unwrap();
    }

    #[test]
    fn test_round_trip_through_memory_host() {
        let host = MemoryKvHost::new();
        let kv = client(host.clone());

        kv.set("a", Some(b"1".as_slice())).unwrap();
        kv.set("b", Some(b"2".as_slice())).unwrap();
        assert_eq!(kv.get("a").unwrap(), b"1");
        assert_eq!(kv.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        kv.delete("a").unwrap();
        assert!(matches!(kv.get("a"), Err(KvError::KeyNotFound(_))));
        assert_eq!(host.value("default", "b"), Some(b"2".to_vec()));
    }

    #[test]
    fn test_namespace_is_used_in_address() {
        let mock = MockHost::new("tenant", "kvstore", "get").with_response(get_response(200, b"v"));
        let kv = KvClient::new(
            &ClientConfig::new()
                .with_namespace("tenant")
                .with_host_call(mock.clone()),
        );
        assert_eq!(kv.namespace(), "tenant");
        assert_eq!(kv.id().as_str(), "kvstore");
        kv.get("k").unwrap();
        assert_eq!(mock.calls(), 1);
    }
}
