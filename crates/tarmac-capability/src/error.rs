//! Shared error plumbing for capability clients.
//!
//! Every capability error that can come from the host wraps a
//! [`HostCallError`]. [`HostErrorExt`] exposes its identity checks on the
//! capability error itself, so callers never match on strings.

use tarmac_core::{HostCallError, Reply};

/// Identity checks forwarded to the wrapped [`HostCallError`].
pub trait HostErrorExt {
    /// The host call error behind this error, if it came from the host.
    fn host_error(&self) -> Option<&HostCallError>;

    /// The transport failed.
    fn is_transport(&self) -> bool {
        self.host_error().is_some_and(HostCallError::is_transport)
    }

    /// The host response could not be decoded.
    fn is_decode(&self) -> bool {
        self.host_error().is_some_and(HostCallError::is_decode)
    }

    /// The host response was invalid or had an unknown status.
    fn is_response_invalid(&self) -> bool {
        self.host_error()
            .is_some_and(HostCallError::is_response_invalid)
    }

    /// The host reported a partial result.
    fn is_partial(&self) -> bool {
        self.host_error().is_some_and(HostCallError::is_partial)
    }

    /// The host answered 404.
    fn is_not_found(&self) -> bool {
        self.host_error().is_some_and(HostCallError::is_not_found)
    }

    /// The host status code, if one was received.
    fn status_code(&self) -> Option<i32> {
        self.host_error().and_then(HostCallError::status_code)
    }
}

/// A capability error that can carry a partial value.
pub trait PartialError<T>: From<HostCallError> {
    /// Wrap a partial value with the error describing why it is partial.
    fn partial(value: T, error: HostCallError) -> Self;
}

/// Turn a dispatched reply into a capability result.
pub(crate) fn settle<R, T, E>(
    outcome: Result<Reply<R>, HostCallError>,
    convert: impl FnOnce(R) -> T,
) -> Result<T, E>
where
    E: PartialError<T>,
{
    match outcome?.map(convert) {
        Reply::Complete(value) => Ok(value),
        Reply::Partial(value, error) => Err(E::partial(value, error)),
    }
}
