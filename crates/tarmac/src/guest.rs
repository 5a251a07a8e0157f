//! Guest-side registration of the function handler.
//!
//! The host delivers every invocation as the waPC operation
//! [`HANDLER_OPERATION`]. On `wasm32` that operation is registered with the
//! waPC guest library, which owns the `__guest_call` export, and every call
//! is dispatched through the process-wide [`Registry`].

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::SdkError;
use crate::sdk::Handler;

/// Operation name the host uses to invoke a function.
pub const HANDLER_OPERATION: &str = "handler";

/// Holds the handler the host's calls are dispatched to.
pub struct Registry {
    handler: RwLock<Option<Handler>>,
}

impl Registry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            handler: parking_lot::const_rwlock(None),
        }
    }

    /// Install `handler`, replacing any earlier one.
    pub fn install(&self, handler: Handler) {
        if self.handler.write().replace(handler).is_some() {
            debug!("replacing registered function handler");
        }
    }

    /// Whether a handler has been installed.
    pub fn is_registered(&self) -> bool {
        self.handler.read().is_some()
    }

    /// Run the call the host delivered.
    pub fn dispatch(&self, operation: &str, payload: &[u8]) -> Result<Vec<u8>, SdkError> {
        if operation != HANDLER_OPERATION {
            warn!(operation, "host invoked an unknown operation");
            return Err(SdkError::UnknownOperation(operation.to_string()));
        }
        // Clone out so the handler can re-register without deadlocking.
        let handler = self
            .handler
            .read()
            .clone()
            .ok_or(SdkError::HandlerNotRegistered)?;
        debug!(len = payload.len(), "dispatching guest call");
        handler(payload).map_err(SdkError::Handler)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// The registry host invocations are dispatched through.
pub static REGISTRY: Registry = Registry::new();

/// Install `handler` in [`REGISTRY`]. On `wasm32` it is also registered with
/// the waPC guest library as [`HANDLER_OPERATION`].
pub fn register(handler: Handler) {
    REGISTRY.install(handler);
    #[cfg(target_arch = "wasm32")]
    wapc_guest::register_function(HANDLER_OPERATION, handle_guest_call);
}

#[cfg(target_arch = "wasm32")]
fn handle_guest_call(payload: &[u8]) -> wapc_guest::CallResult {
    Ok(REGISTRY.dispatch(HANDLER_OPERATION, payload)?)
}
