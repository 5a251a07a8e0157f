//! Composed host call errors.
//!
//! A single host call can fail in more than one way at once: the transport
//! may report an error while the host also returned an error status. A
//! [`HostCallError`] keeps every cause, in the order they were detected, so
//! callers can test for any of them.

use std::error::Error as StdError;
use std::fmt;

use crate::host::TransportError;
use crate::status::STATUS_NOT_FOUND;

/// The category of a single failure cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The transport reported a failure.
    HostCall,
    /// The response payload could not be decoded.
    Decode,
    /// The response decoded but is missing data or has an unknown status.
    ResponseInvalid,
    /// The host answered with 400, 404 or 500.
    HostError,
    /// The host answered with 206; data is usable but incomplete.
    Partial,
}

impl ErrorKind {
    fn description(&self) -> &'static str {
        match self {
            Self::HostCall => "host call failed",
            Self::Decode => "failed to decode host response",
            Self::ResponseInvalid => "host response is invalid or unexpected",
            Self::HostError => "host returned an error status",
            Self::Partial => "partial result",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One cause of a [`HostCallError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    kind: ErrorKind,
    code: Option<i32>,
    detail: String,
}

impl Cause {
    /// Create a cause of the given kind.
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            detail: detail.into(),
        }
    }

    /// A transport failure.
    pub fn host_call(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::HostCall, detail)
    }

    /// A decode failure.
    pub fn decode(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, detail)
    }

    /// An invalid or unexpected response.
    pub fn response_invalid(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseInvalid, detail)
    }

    /// An error status reported by the host.
    pub fn host_error(code: i32, detail: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::HostError,
            code: Some(code),
            detail: detail.into(),
        }
    }

    /// A partial result reported by the host.
    pub fn partial(code: i32, detail: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Partial,
            code: Some(code),
            detail: detail.into(),
        }
    }

    /// The category of this cause.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The host status code attached to this cause, if any.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Free-form detail text.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.code) {
            (ErrorKind::HostError, Some(code)) if self.detail.is_empty() => {
                write!(f, "{}: host status {}", self.kind, code)
            }
            (ErrorKind::HostError, Some(code)) => {
                write!(f, "{}: host status {}: {}", self.kind, code, self.detail)
            }
            _ if self.detail.is_empty() => write!(f, "{}", self.kind),
            _ => write!(f, "{}: {}", self.kind, self.detail),
        }
    }
}

/// Error returned when a host call does not fully succeed.
///
/// Holds at least one [`Cause`]. When the transport failed, its cause comes
/// first and the original [`TransportError`] is exposed through
/// [`std::error::Error::source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCallError {
    transport: Option<TransportError>,
    causes: Vec<Cause>,
}

impl HostCallError {
    /// An error made only of a transport failure.
    pub fn from_transport(error: TransportError) -> Self {
        Self {
            causes: vec![Cause::host_call(error.message())],
            transport: Some(error),
        }
    }

    /// An error made of a single cause.
    pub fn from_cause(cause: Cause) -> Self {
        Self {
            transport: None,
            causes: vec![cause],
        }
    }

    /// All causes, in detection order.
    pub fn causes(&self) -> &[Cause] {
        &self.causes
    }

    /// The first cause of the given kind.
    pub fn cause(&self, kind: ErrorKind) -> Option<&Cause> {
        self.causes.iter().find(|c| c.kind == kind)
    }

    /// Whether any cause is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.cause(kind).is_some()
    }

    /// The transport reported a failure.
    pub fn is_transport(&self) -> bool {
        self.is(ErrorKind::HostCall)
    }

    /// The response could not be decoded.
    pub fn is_decode(&self) -> bool {
        self.is(ErrorKind::Decode)
    }

    /// The response was missing data or carried an unknown status.
    pub fn is_response_invalid(&self) -> bool {
        self.is(ErrorKind::ResponseInvalid)
    }

    /// The host answered with an error status.
    pub fn is_host_error(&self) -> bool {
        self.is(ErrorKind::HostError)
    }

    /// The host answered with a partial result.
    pub fn is_partial(&self) -> bool {
        self.is(ErrorKind::Partial)
    }

    /// The host answered with 404.
    pub fn is_not_found(&self) -> bool {
        self.causes
            .iter()
            .any(|c| c.kind == ErrorKind::HostError && c.code == Some(STATUS_NOT_FOUND))
    }

    /// The host status code carried by the error, if one was received.
    pub fn status_code(&self) -> Option<i32> {
        self.causes.iter().find_map(|c| c.code)
    }

    /// The transport error, if the transport failed.
    pub fn transport_error(&self) -> Option<&TransportError> {
        self.transport.as_ref()
    }
}

impl fmt::Display for HostCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cause) in self.causes.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{cause}")?;
        }
        Ok(())
    }
}

impl StdError for HostCallError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.transport.as_ref().map(|e| e as &(dyn StdError + 'static))
    }
}

/// Builds a [`HostCallError`] from the failures observed during one call.
///
/// The transport failure, when present, is always recorded first.
#[derive(Debug, Clone, Default)]
pub struct ErrorComposer {
    transport: Option<TransportError>,
    causes: Vec<Cause>,
}

impl ErrorComposer {
    /// Start composing, seeded with the transport outcome of the call.
    pub fn new(transport: Option<TransportError>) -> Self {
        let causes = transport
            .iter()
            .map(|e| Cause::host_call(e.message()))
            .collect();
        Self { transport, causes }
    }

    /// Record another cause.
    pub fn push(&mut self, cause: Cause) -> &mut Self {
        self.causes.push(cause);
        self
    }

    /// Whether nothing has failed so far.
    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    /// Finish composing. `Ok(())` when no cause was recorded.
    pub fn finish(self) -> Result<(), HostCallError> {
        if self.causes.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// Record a final cause and return the composed error.
    pub fn fail(mut self, cause: Cause) -> HostCallError {
        self.causes.push(cause);
        self.into_error()
    }

    fn into_error(self) -> HostCallError {
        HostCallError {
            transport: self.transport,
            causes: self.causes,
        }
    }
}
