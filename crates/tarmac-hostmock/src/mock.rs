//! Expectation-checking host call double.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tarmac_core::{CallAddress, HostCall, HostReply, TransportError};
use thiserror::Error;
use tracing::debug;

/// Reasons a [`MockHost`] rejects a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// The call targeted another namespace.
    #[error("unexpected namespace: expected {expected}, got {actual}")]
    UnexpectedNamespace {
        /// Namespace the mock was scripted for.
        expected: String,
        /// Namespace the call used.
        actual: String,
    },

    /// The call targeted another capability.
    #[error("unexpected capability: expected {expected}, got {actual}")]
    UnexpectedCapability {
        /// Capability the mock was scripted for.
        expected: String,
        /// Capability the call used.
        actual: String,
    },

    /// The call targeted another function.
    #[error("unexpected function: expected {expected}, got {actual}")]
    UnexpectedFunction {
        /// Function the mock was scripted for.
        expected: String,
        /// Function the call used.
        actual: String,
    },

    /// The payload validator rejected the request.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<MockError> for TransportError {
    fn from(error: MockError) -> Self {
        TransportError::new(error.to_string())
    }
}

type Validator = Arc<dyn Fn(&[u8]) -> Result<(), String> + Send + Sync>;
type Responder = Arc<dyn Fn() -> Vec<u8> + Send + Sync>;

/// A host call double that checks where calls are sent and answers with a
/// scripted reply.
///
/// Checks run in this order: forced failure, namespace, capability,
/// function, payload validator. A failing check answers with a transport
/// error and no payload. Otherwise the scripted response is returned,
/// together with the scripted transport error if one was set.
#[derive(Clone)]
pub struct MockHost {
    expected: CallAddress,
    fail: Option<TransportError>,
    transport_error: Option<TransportError>,
    validator: Option<Validator>,
    responder: Option<Responder>,
    calls: Arc<AtomicUsize>,
    payloads: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl fmt::Debug for MockHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHost")
            .field("expected", &self.expected)
            .field("fail", &self.fail)
            .field("transport_error", &self.transport_error)
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

impl MockHost {
    /// Create a mock expecting calls to `namespace / capability / function`.
    pub fn new(
        namespace: impl Into<String>,
        capability: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            expected: CallAddress::new(namespace, capability, function),
            fail: None,
            transport_error: None,
            validator: None,
            responder: None,
            calls: Arc::new(AtomicUsize::new(0)),
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every call with this payload.
    pub fn with_response(self, payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        self.with_response_fn(move || payload.clone())
    }

    /// Build the response payload on every call.
    pub fn with_response_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Vec<u8> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(f));
        self
    }

    /// Return this transport error alongside the scripted response.
    pub fn with_transport_error(mut self, message: impl Into<String>) -> Self {
        self.transport_error = Some(TransportError::new(message));
        self
    }

    /// Reject every call with this transport error and no payload.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail = Some(TransportError::new(message));
        self
    }

    /// Validate the request payload before answering.
    pub fn with_payload_validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(f));
        self
    }

    /// Number of calls received, including rejected ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Payloads received, in call order.
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.payloads.lock().clone()
    }

    fn check(&self, address: &CallAddress, payload: &[u8]) -> Result<(), TransportError> {
        if let Some(error) = &self.fail {
            return Err(error.clone());
        }
        if address.namespace() != self.expected.namespace() {
            return Err(MockError::UnexpectedNamespace {
                expected: self.expected.namespace().to_string(),
                actual: address.namespace().to_string(),
            }
            .into());
        }
        if address.capability() != self.expected.capability() {
            return Err(MockError::UnexpectedCapability {
                expected: self.expected.capability().to_string(),
                actual: address.capability().to_string(),
            }
            .into());
        }
        if address.function() != self.expected.function() {
            return Err(MockError::UnexpectedFunction {
                expected: self.expected.function().to_string(),
                actual: address.function().to_string(),
            }
            .into());
        }
        if let Some(validator) = &self.validator {
            validator(payload).map_err(MockError::InvalidPayload)?;
        }
        Ok(())
    }
}

impl HostCall for MockHost {
    fn call(&self, address: &CallAddress, payload: &[u8]) -> HostReply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().push(payload.to_vec());
        debug!(address = %address, len = payload.len(), "Mock host call");

        if let Err(error) = self.check(address, payload) {
            return HostReply::failed(error);
        }

        let payload = self.responder.as_ref().map(|f| f()).unwrap_or_default();
        HostReply {
            payload,
            error: self.transport_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(namespace: &str, capability: &str, function: &str) -> CallAddress {
        CallAddress::new(namespace, capability, function)
    }

    #[test]
    fn test_scripted_response() {
        let mock = MockHost::new("test", "test", "test").with_response(b"test".to_vec());
        let reply = mock.call(&address("test", "test", "test"), b"test");
        assert_eq!(reply.payload, b"test");
        assert!(reply.error.is_none());
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.payloads(), vec![b"test".to_vec()]);
    }

    #[test]
    fn test_failing_returns_no_payload() {
        let mock = MockHost::new("test", "test", "test")
            .with_response(b"test".to_vec())
            .failing("Mock error");
        let reply = mock.call(&address("test", "test", "test"), b"test");
        assert!(reply.payload.is_empty());
        assert_eq!(reply.error.unwrap().message(), "Mock error");
    }

    #[test]
    fn test_address_mismatches() {
        struct Case {
            name: &'static str,
            address: CallAddress,
            want: &'static str,
        }

        let cases = [
            Case {
                name: "namespace",
                address: address("other", "kvstore", "get"),
                want: "unexpected namespace: expected default, got other",
            },
            Case {
                name: "capability",
                address: address("default", "sql", "get"),
                want: "unexpected capability: expected kvstore, got sql",
            },
            Case {
                name: "function",
                address: address("default", "kvstore", "set"),
                want: "unexpected function: expected get, got set",
            },
        ];

        let mock = MockHost::new("default", "kvstore", "get").with_response(b"ok".to_vec());
        for case in cases {
            let reply = mock.call(&case.address, b"");
            assert!(reply.payload.is_empty(), "{}", case.name);
            assert_eq!(reply.error.unwrap().message(), case.want, "{}", case.name);
        }
    }

    #[test]
    fn test_payload_validator() {
        let mock = MockHost::new("test", "test", "test")
            .with_response(b"ok".to_vec())
            .with_payload_validator(|payload| {
                if payload == b"good" {
                    Ok(())
                } else {
                    Err("expected good".to_string())
                }
            });

        let ok = mock.call(&address("test", "test", "test"), b"good");
        assert_eq!(ok.payload, b"ok");

        let rejected = mock.call(&address("test", "test", "test"), b"bad");
        assert_eq!(
            rejected.error.unwrap().message(),
            "invalid payload: expected good"
        );
        assert_eq!(mock.calls(), 2);
    }

    #[test]
    fn test_response_with_transport_error() {
        let mock = MockHost::new("test", "test", "test")
            .with_response(b"data".to_vec())
            .with_transport_error("flaky");
        let reply = mock.call(&address("test", "test", "test"), b"");
        assert_eq!(reply.payload, b"data");
        assert_eq!(reply.error.unwrap().message(), "flaky");
    }

    #[test]
    fn test_default_response_is_empty() {
        let mock = MockHost::new("test", "test", "test");
        let reply = mock.call(&address("test", "test", "test"), b"");
        assert!(reply.payload.is_empty());
        assert!(reply.error.is_none());
    }

    #[test]
    fn test_clones_share_call_counter() {
        let mock = MockHost::new("test", "test", "test");
        let shared = mock.clone();
        shared.call(&address("test", "test", "test"), b"");
        assert_eq!(mock.calls(), 1);
    }
}
