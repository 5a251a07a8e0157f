//! The host call seam.
//!
//! Every capability client talks to the host through a [`HostCall`]. A call
//! is addressed by namespace, capability and function, carries an opaque
//! payload, and yields a [`HostReply`] that may hold a response payload, a
//! transport error, or both at once.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Where a host call is routed: `namespace / capability / function`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallAddress {
    namespace: String,
    capability: String,
    function: String,
}

impl CallAddress {
    /// Create a new call address.
    pub fn new(
        namespace: impl Into<String>,
        capability: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            capability: capability.into(),
            function: function.into(),
        }
    }

    /// The tenant namespace the call is issued under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The capability being called (e.g., `kvstore`).
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// The function within the capability (e.g., `get`).
    pub fn function(&self) -> &str {
        &self.function
    }
}

impl fmt::Display for CallAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.capability, self.function)
    }
}

/// Failure reported by the host call mechanism itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create a transport error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message the host call mechanism reported.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Raw outcome of a host call.
///
/// The payload and the transport error are independent: a host may return a
/// usable response payload alongside a transport error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostReply {
    /// Response bytes, possibly empty.
    pub payload: Vec<u8>,
    /// Transport failure, if any.
    pub error: Option<TransportError>,
}

impl HostReply {
    /// A reply carrying only a payload.
    pub fn ok(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            error: None,
        }
    }

    /// A reply carrying only a transport error.
    pub fn failed(error: TransportError) -> Self {
        Self {
            payload: Vec::new(),
            error: Some(error),
        }
    }

    /// A reply carrying both a payload and a transport error.
    pub fn with_error(payload: impl Into<Vec<u8>>, error: TransportError) -> Self {
        Self {
            payload: payload.into(),
            error: Some(error),
        }
    }
}

/// Something that can deliver a call to the host.
///
/// Implemented for any `Fn(&CallAddress, &[u8]) -> HostReply`, so tests and
/// embedders can pass a closure.
pub trait HostCall: Send + Sync {
    /// Perform one synchronous host call.
    fn call(&self, address: &CallAddress, payload: &[u8]) -> HostReply;
}

impl<F> HostCall for F
where
    F: Fn(&CallAddress, &[u8]) -> HostReply + Send + Sync,
{
    fn call(&self, address: &CallAddress, payload: &[u8]) -> HostReply {
        self(address, payload)
    }
}

/// A host call shared between clients.
pub type SharedHostCall = Arc<dyn HostCall>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        let address = CallAddress::new("tenant", "kvstore", "get");
        assert_eq!(address.to_string(), "tenant/kvstore/get");
        assert_eq!(address.namespace(), "tenant");
        assert_eq!(address.capability(), "kvstore");
        assert_eq!(address.function(), "get");
    }

    #[test]
    fn test_closure_is_host_call() {
        let host: SharedHostCall = Arc::new(|address: &CallAddress, payload: &[u8]| {
            let mut echoed = address.function().as_bytes().to_vec();
            echoed.extend_from_slice(payload);
            HostReply::ok(echoed)
        });

        let reply = host.call(&CallAddress::new("default", "function", "echo"), b"!");
        assert_eq!(reply.payload, b"echo!");
        assert!(reply.error.is_none());
    }

    #[test]
    fn test_reply_carries_payload_and_error() {
        let reply = HostReply::with_error(vec![1, 2], TransportError::new("flaky"));
        assert_eq!(reply.payload, vec![1, 2]);
        assert_eq!(reply.error.unwrap().message(), "flaky");
    }
}
