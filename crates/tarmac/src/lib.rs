//! # Tarmac - Guest SDK for WebAssembly Functions
//!
//! Tarmac functions run inside a host runtime and reach the outside world
//! only through host capabilities: a key-value store, an HTTP client, a SQL
//! database, metrics, logging and calls to other functions. This crate is
//! the entry point: it registers the function handler and hands out
//! capability clients bound to the function's namespace.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tarmac::prelude::*;
//!
//! let sdk = Sdk::new(
//!     Config::new()
//!         .with_namespace("orders")
//!         .with_handler(|payload: &[u8]| -> Result<Vec<u8>, HandlerError> {
//!             Ok(payload.to_vec())
//!         }),
//! )?;
//! sdk.register();
//!
//! let kv = sdk.kv();
//! kv.set("last-order", Some(b"42".as_slice()))?;
//!
//! let counter = sdk.metrics().new_counter("orders_total")?;
//! counter.inc()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Your Function Handler                  │
//! ├──────────────────────────────────────────────────────────┤
//! │                     tarmac (facade)                      │
//! │              Sdk ── register / client factories          │
//! ├──────────────────────────────────────────────────────────┤
//! │                    tarmac-capability                     │
//! │     kv · http · sql · metrics · logging · function       │
//! ├──────────────────────────────────────────────────────────┤
//! │  tarmac-core (dispatch, errors)  │  tarmac-proto (wire)  │
//! ├──────────────────────────────────────────────────────────┤
//! │                 waPC host call boundary                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Testing
//!
//! [`Config::with_host_call`] routes every client through a double from
//! `tarmac-hostmock`, so handlers can be exercised natively.

pub mod error;
pub mod guest;
pub mod sdk;

pub use error::{HandlerError, SdkError};
pub use guest::{HANDLER_OPERATION, Registry};
pub use sdk::{Config, Handler, Sdk};

// Re-export from sub-crates
pub use tarmac_capability;
pub use tarmac_core;
pub use tarmac_proto;

pub use tarmac_core::{DEFAULT_NAMESPACE, HostCallError, RuntimeConfig};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{HandlerError, SdkError};
    pub use crate::sdk::{Config, Sdk};

    pub use tarmac_capability::{
        Capability, Counter, FunctionClient, FunctionError, Gauge, Histogram, HostErrorExt,
        HostLogLayer, Http, HttpClient, HttpConfig, HttpError, Kv, KvClient, KvError, LogLevel,
        Logger, MetricsClient, MetricsError, QueryResult, Request, Response, SqlClient, SqlError,
    };
    pub use tarmac_core::prelude::*;
}
