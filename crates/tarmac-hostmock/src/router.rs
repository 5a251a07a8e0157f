//! Routes calls to per-function handlers.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tarmac_core::{CallAddress, HostCall, HostReply, SharedHostCall, TransportError};
use tracing::debug;

/// A host call double that dispatches by `capability / function`.
///
/// Useful when one test drives several capabilities at once. Calls with no
/// registered route answer with a transport error.
#[derive(Clone, Default)]
pub struct Router {
    routes: Arc<DashMap<(String, String), SharedHostCall>>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.len())
            .finish()
    }
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `capability / function`.
    pub fn route(
        self,
        capability: impl Into<String>,
        function: impl Into<String>,
        handler: impl HostCall + 'static,
    ) -> Self {
        self.routes
            .insert((capability.into(), function.into()), Arc::new(handler));
        self
    }

    /// Register one handler for several functions of a capability.
    pub fn route_all(
        self,
        capability: &str,
        functions: &[&str],
        handler: impl HostCall + Clone + 'static,
    ) -> Self {
        functions.iter().fold(self, |router, function| {
            router.route(capability, *function, handler.clone())
        })
    }

    fn lookup(&self, address: &CallAddress) -> Option<SharedHostCall> {
        self.routes
            .get(&(
                address.capability().to_string(),
                address.function().to_string(),
            ))
            .map(|entry| Arc::clone(entry.value()))
    }
}

impl HostCall for Router {
    fn call(&self, address: &CallAddress, payload: &[u8]) -> HostReply {
        match self.lookup(address) {
            Some(handler) => handler.call(address, payload),
            None => {
                debug!(address = %address, "No route for host call");
                HostReply::failed(TransportError::new(format!("no route for {address}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockHost;

    #[test]
    fn test_routes_by_function() {
        let router = Router::new()
            .route(
                "function",
                "ping",
                |_: &CallAddress, _: &[u8]| HostReply::ok(b"pong".to_vec()),
            )
            .route(
                "function",
                "echo",
                |_: &CallAddress, payload: &[u8]| HostReply::ok(payload),
            );

        let ping = router.call(&CallAddress::new("default", "function", "ping"), b"");
        assert_eq!(ping.payload, b"pong");

        let echo = router.call(&CallAddress::new("default", "function", "echo"), b"hi");
        assert_eq!(echo.payload, b"hi");
    }

    #[test]
    fn test_missing_route() {
        let router = Router::new();
        let reply = router.call(&CallAddress::new("default", "sql", "exec"), b"");
        assert_eq!(
            reply.error.unwrap().message(),
            "no route for default/sql/exec"
        );
    }

    #[test]
    fn test_route_all_shares_handler() {
        let mock = MockHost::new("default", "metrics", "counter");
        let router = Router::new().route_all("metrics", &["counter", "gauge"], mock.clone());

        router.call(&CallAddress::new("default", "metrics", "counter"), b"");
        router.call(&CallAddress::new("default", "metrics", "gauge"), b"");
        assert_eq!(mock.calls(), 2);
    }
}
