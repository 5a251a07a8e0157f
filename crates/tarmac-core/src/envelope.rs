//! Response envelopes.

use tarmac_proto::Status;
use tarmac_proto::http::HttpClientResponse;
use tarmac_proto::kvstore::{
    KvStoreDeleteResponse, KvStoreGetResponse, KvStoreKeysResponse, KvStoreSetResponse,
};
use tarmac_proto::sql::{SqlExecResponse, SqlQueryResponse};

/// A decoded host response that carries a [`Status`].
pub trait Envelope: prost::Message + Default {
    /// The embedded status, if the host sent one.
    fn status(&self) -> Option<&Status>;
}

macro_rules! impl_envelope {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Envelope for $ty {
                fn status(&self) -> Option<&Status> {
                    self.status.as_ref()
                }
            }
        )*
    };
}

impl_envelope!(
    KvStoreGetResponse,
    KvStoreSetResponse,
    KvStoreDeleteResponse,
    KvStoreKeysResponse,
    HttpClientResponse,
    SqlExecResponse,
    SqlQueryResponse,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let response = KvStoreGetResponse {
            status: Some(Status::ok()),
            data: b"value".to_vec(),
        };
        assert_eq!(response.status().map(|s| s.code), Some(200));
        assert!(SqlExecResponse::default().status().is_none());
    }
}
