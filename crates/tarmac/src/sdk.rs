//! The SDK entry point.

use std::fmt;
use std::sync::Arc;

use tarmac_capability::{
    FunctionClient, HttpClient, HttpConfig, KvClient, Logger, MetricsClient, SqlClient,
};
use tarmac_core::{ClientConfig, HostCall, RuntimeConfig, SharedHostCall};
use tracing::debug;

use crate::error::{HandlerError, SdkError};
use crate::guest;

/// A function handler: raw request payload in, raw response payload out.
pub type Handler = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, HandlerError> + Send + Sync>;

/// Configuration for [`Sdk::new`].
#[derive(Clone, Default)]
pub struct Config {
    /// Namespace for every client the SDK builds. Empty means
    /// [`DEFAULT_NAMESPACE`](tarmac_core::DEFAULT_NAMESPACE).
    pub namespace: String,
    /// The function handler. Required.
    pub handler: Option<Handler>,
    /// Host call override handed to every client. Defaults to waPC.
    pub host_call: Option<SharedHostCall>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("namespace", &self.namespace)
            .field("handler", &self.handler.as_ref().map(|_| "<fn>"))
            .field("host_call", &self.host_call.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the function handler.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, HandlerError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Route every client's host calls through `host_call`.
    pub fn with_host_call(mut self, host_call: impl HostCall + 'static) -> Self {
        self.host_call = Some(Arc::new(host_call));
        self
    }
}

/// A configured function: its handler, its runtime settings, and factories
/// for capability clients bound to both.
#[derive(Clone)]
pub struct Sdk {
    runtime: RuntimeConfig,
    handler: Handler,
    host_call: Option<SharedHostCall>,
}

impl fmt::Debug for Sdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sdk")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

impl Sdk {
    /// Validate `config` and create the SDK.
    pub fn new(config: Config) -> Result<Self, SdkError> {
        let handler = config.handler.ok_or(SdkError::HandlerMissing)?;
        let runtime = RuntimeConfig::new(config.namespace);
        debug!(namespace = %runtime.namespace, "sdk created");
        Ok(Self {
            runtime,
            handler,
            host_call: config.host_call,
        })
    }

    /// A copy of the runtime configuration.
    pub fn config(&self) -> RuntimeConfig {
        self.runtime.clone()
    }

    /// The resolved namespace.
    pub fn namespace(&self) -> &str {
        &self.runtime.namespace
    }

    /// Invoke the handler directly.
    pub fn handle(&self, payload: &[u8]) -> Result<Vec<u8>, HandlerError> {
        (self.handler)(payload)
    }

    /// Make this SDK's handler the one the host's `handler` operation runs.
    /// A later registration replaces an earlier one.
    pub fn register(&self) {
        guest::register(Arc::clone(&self.handler));
    }

    /// Client configuration carrying this SDK's namespace and host call.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new().with_runtime(self.runtime.clone());
        match &self.host_call {
            Some(host_call) => config.with_shared_host_call(Arc::clone(host_call)),
            None => config,
        }
    }

    /// Key-value client.
    pub fn kv(&self) -> KvClient {
        KvClient::new(&self.client_config())
    }

    /// HTTP client with default settings.
    pub fn http(&self) -> HttpClient {
        HttpClient::new(&HttpConfig::new().with_client(self.client_config()))
    }

    /// SQL client.
    pub fn sql(&self) -> SqlClient {
        SqlClient::new(&self.client_config())
    }

    /// Metrics client.
    pub fn metrics(&self) -> MetricsClient {
        MetricsClient::new(&self.client_config())
    }

    /// Host logger.
    pub fn logger(&self) -> Logger {
        Logger::new(&self.client_config())
    }

    /// Client for calling other functions.
    pub fn functions(&self) -> FunctionClient {
        FunctionClient::new(&self.client_config())
    }
}
