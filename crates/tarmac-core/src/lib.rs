//! Tarmac Core - Guest Side Host Call Protocol
//!
//! This crate holds the machinery every Tarmac capability client shares:
//!
//! - [`HostCall`]: the seam through which a guest reaches its host
//! - [`WapcHost`]: the default waPC transport
//! - [`HostStatus`]: classification of host status codes
//! - [`HostCallError`]: a composed error keeping every failure cause
//! - [`invoke`] / [`invoke_raw`]: encode, call, decode and classify
//! - [`ClientConfig`] / [`HostBinding`]: namespace and transport resolution
//!
//! # Dispatch
//!
//! ```text
//! request ──encode──▶ HostCall ──▶ (payload, transport error?)
//!                                      │
//!                   decode envelope ◀──┘
//!                          │
//!           status 200 ─▶ Complete(value)
//!           status 206 ─▶ Partial(value, error)
//!           400/404/500 ─▶ Err(host error)
//!           other       ─▶ Err(response invalid)
//! ```
//!
//! How a transport error interacts with a decodable response is chosen per
//! capability through [`TransportPolicy`].

pub mod config;
pub mod envelope;
pub mod error;
pub mod host;
pub mod protocol;
pub mod status;
pub mod wapc;

pub use config::{ClientConfig, DEFAULT_NAMESPACE, HostBinding, RuntimeConfig};
pub use envelope::Envelope;
pub use error::{Cause, ErrorComposer, ErrorKind, HostCallError};
pub use host::{CallAddress, HostCall, HostReply, SharedHostCall, TransportError};
pub use protocol::{Reply, TransportPolicy, dispatch, invoke, invoke_raw};
pub use status::{
    HostStatus, STATUS_BAD_INPUT, STATUS_NOT_FOUND, STATUS_PARTIAL, STATUS_SERVER_ERROR,
    STATUS_SUCCESS,
};
pub use wapc::WapcHost;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{ClientConfig, HostBinding, RuntimeConfig};
    pub use crate::error::{ErrorKind, HostCallError};
    pub use crate::host::{CallAddress, HostCall, HostReply, TransportError};
    pub use crate::protocol::{Reply, TransportPolicy};
    pub use crate::status::HostStatus;
}
