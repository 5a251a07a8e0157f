//! Default transport: the waPC host call ABI.
//!
//! Inside a `wasm32` guest, calls go through `wapc_guest::host_call`. The
//! namespace is passed as the waPC binding, the capability as the waPC
//! namespace and the function as the operation. On any other target the
//! transport reports an error instead of calling out.

use tracing::trace;

use crate::host::{CallAddress, HostCall, HostReply, TransportError};

/// Host call implementation backed by the waPC guest library.
#[derive(Debug, Clone, Copy, Default)]
pub struct WapcHost;

impl WapcHost {
    /// Create the default transport.
    pub fn new() -> Self {
        Self
    }
}

impl HostCall for WapcHost {
    fn call(&self, address: &CallAddress, payload: &[u8]) -> HostReply {
        trace!(address = %address, len = payload.len(), "waPC host call");
        imp::host_call(address, payload)
    }
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::*;

    // The waPC guest library reports a failed call as an error only; any
    // response buffer the host wrote alongside it is not surfaced.
    pub(super) fn host_call(address: &CallAddress, payload: &[u8]) -> HostReply {
        match wapc_guest::host_call(
            address.namespace(),
            address.capability(),
            address.function(),
            payload,
        ) {
            Ok(response) => HostReply::ok(response),
            Err(error) => HostReply::failed(TransportError::new(error.to_string())),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::*;

    pub(super) fn host_call(address: &CallAddress, _payload: &[u8]) -> HostReply {
        HostReply::failed(TransportError::new(format!(
            "no waPC host available for {address}: guest is not running on wasm32"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_target_reports_transport_error() {
        let reply = WapcHost::new().call(&CallAddress::new("default", "kvstore", "get"), b"");
        assert!(reply.payload.is_empty());
        let error = reply.error.unwrap();
        assert!(error.message().contains("default/kvstore/get"));
    }
}
