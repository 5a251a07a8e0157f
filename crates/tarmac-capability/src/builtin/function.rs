//! Function-to-function calls.

use tarmac_core::{ClientConfig, HostBinding, HostCallError};
use thiserror::Error;
use tracing::debug;

use crate::capability::{Capability, CapabilityId, standard_ids};
use crate::error::HostErrorExt;

/// Errors returned by the function client.
#[derive(Debug, Error)]
pub enum FunctionError {
    /// The function name was blank.
    #[error("function name is invalid: name must not be blank")]
    InvalidFunctionName,

    /// The host call failed.
    #[error(transparent)]
    Host(#[from] HostCallError),
}

impl HostErrorExt for FunctionError {
    fn host_error(&self) -> Option<&HostCallError> {
        match self {
            Self::Host(error) => Some(error),
            Self::InvalidFunctionName => None,
        }
    }
}

/// Result type for function calls.
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Client for calling other functions through the host.
#[derive(Debug, Clone)]
pub struct FunctionClient {
    binding: HostBinding,
}

impl FunctionClient {
    /// Create a client from the given configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            binding: config.bind(),
        }
    }

    /// Call the function registered as `name`, passing `payload` through
    /// untouched and returning the raw response.
    pub fn call(&self, name: &str, payload: &[u8]) -> FunctionResult<Vec<u8>> {
        if name.trim().is_empty() {
            return Err(FunctionError::InvalidFunctionName);
        }
        debug!(namespace = self.namespace(), function = name, len = payload.len(), "function call");
        Ok(self
            .binding
            .invoke_raw(self.id().as_str(), name, payload)?)
    }
}

impl Capability for FunctionClient {
    fn id(&self) -> CapabilityId {
        standard_ids::FUNCTION
    }

    fn namespace(&self) -> &str {
        self.binding.namespace()
    }
}
