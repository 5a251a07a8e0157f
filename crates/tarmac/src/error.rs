//! Errors raised by the SDK entry point.

use thiserror::Error;

/// Error type a function handler may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from creating an [`Sdk`](crate::Sdk) or dispatching a guest call.
#[derive(Debug, Error)]
pub enum SdkError {
    /// The configuration carried no handler.
    #[error("function handler cannot be missing")]
    HandlerMissing,

    /// A guest call arrived before any handler was registered.
    #[error("no function handler registered")]
    HandlerNotRegistered,

    /// The host invoked an operation this guest does not export.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Handler(#[source] HandlerError),
}
