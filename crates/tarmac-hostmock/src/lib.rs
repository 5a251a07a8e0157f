//! Tarmac Host Mock
//!
//! Host call doubles for testing guest code without a running host. Each
//! double implements [`tarmac_core::HostCall`] and can be passed to any
//! client through `ClientConfig::with_host_call`.
//!
//! - [`MockHost`]: checks the call address, validates the payload and
//!   answers with a scripted response, a transport error, or both
//! - [`Router`]: dispatches to a different double per function
//! - [`MemoryKvHost`]: an in-memory `kvstore` host
//!
//! # Example
//!
//! ```ignore
//! use tarmac_hostmock::MockHost;
//!
//! let mock = MockHost::new("default", "function", "echo").with_response(b"pong".to_vec());
//! let config = ClientConfig::new().with_host_call(mock.clone());
//! // ... exercise the client ...
//! assert_eq!(mock.calls(), 1);
//! ```

pub mod memory_kv;
pub mod mock;
pub mod router;

pub use memory_kv::MemoryKvHost;
pub use mock::{MockError, MockHost};
pub use router::Router;
