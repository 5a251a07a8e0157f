//! Configuration types shared by every capability client.
//!
//! A client resolves two things from its configuration: the namespace its
//! calls are issued under, and the host call it uses to reach the host.

use std::fmt;
use std::sync::Arc;

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::error::HostCallError;
use crate::host::{CallAddress, HostCall, HostReply, SharedHostCall};
use crate::protocol::{self, Reply, TransportPolicy};
use crate::wapc::WapcHost;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Runtime-wide settings supplied by the function runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Tenant namespace for all host calls.
    pub namespace: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Create a runtime configuration. An empty namespace falls back to
    /// [`DEFAULT_NAMESPACE`].
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        if namespace.is_empty() {
            Self::default()
        } else {
            Self { namespace }
        }
    }
}

/// Configuration accepted by every capability client constructor.
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Explicit namespace; wins over the runtime namespace when non-empty.
    pub namespace: Option<String>,
    /// Runtime settings.
    pub runtime: RuntimeConfig,
    /// Host call override. Defaults to the waPC transport.
    pub host_call: Option<SharedHostCall>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("namespace", &self.namespace)
            .field("runtime", &self.runtime)
            .field("host_call", &self.host_call.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the runtime configuration.
    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    /// Replace the host call.
    pub fn with_host_call(mut self, host_call: impl HostCall + 'static) -> Self {
        self.host_call = Some(Arc::new(host_call));
        self
    }

    /// Replace the host call with a closure.
    pub fn with_host_fn<F>(self, f: F) -> Self
    where
        F: Fn(&CallAddress, &[u8]) -> HostReply + Send + Sync + 'static,
    {
        self.with_host_call(f)
    }

    /// Replace the host call with an already shared one.
    pub fn with_shared_host_call(mut self, host_call: SharedHostCall) -> Self {
        self.host_call = Some(host_call);
        self
    }

    /// The namespace calls will be issued under.
    pub fn resolved_namespace(&self) -> &str {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ if !self.runtime.namespace.is_empty() => &self.runtime.namespace,
            _ => DEFAULT_NAMESPACE,
        }
    }

    /// Resolve the configuration into a [`HostBinding`].
    pub fn bind(&self) -> HostBinding {
        let host = self
            .host_call
            .clone()
            .unwrap_or_else(|| Arc::new(WapcHost::new()));
        HostBinding {
            namespace: self.resolved_namespace().to_string(),
            host,
        }
    }
}

/// A resolved namespace and host call, owned by a capability client.
#[derive(Clone)]
pub struct HostBinding {
    namespace: String,
    host: SharedHostCall,
}

impl fmt::Debug for HostBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBinding")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl HostBinding {
    /// The resolved namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Build the address of a call under this binding's namespace.
    pub fn address(&self, capability: &str, function: &str) -> CallAddress {
        CallAddress::new(self.namespace.as_str(), capability, function)
    }

    /// Call a capability function that answers with an [`Envelope`].
    pub fn invoke<Req, Resp>(
        &self,
        capability: &str,
        function: &str,
        request: &Req,
        policy: TransportPolicy,
    ) -> Result<Reply<Resp>, HostCallError>
    where
        Req: Message,
        Resp: Envelope,
    {
        let address = self.address(capability, function);
        protocol::invoke(self.host.as_ref(), &address, request, policy)
    }

    /// Call a capability function with a raw payload.
    pub fn invoke_raw(
        &self,
        capability: &str,
        function: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>, HostCallError> {
        let address = self.address(capability, function);
        protocol::invoke_raw(self.host.as_ref(), &address, payload)
    }
}
