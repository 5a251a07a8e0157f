//! Tarmac Capability Clients
//!
//! Thin clients for the capabilities a Tarmac host offers to guest
//! functions. Each client validates its inputs locally, encodes a request,
//! crosses the host call boundary through [`tarmac_core`] and shapes the
//! decoded response into a typed result.
//!
//! # Built-in Capabilities
//!
//! | client | capability | functions |
//! |---|---|---|
//! | [`KvClient`] | `kvstore` | `get`, `set`, `delete`, `keys` |
//! | [`HttpClient`] | `httpclient` | `call` |
//! | [`SqlClient`] | `sql` | `exec`, `query` |
//! | [`MetricsClient`] | `metrics` | `counter`, `gauge`, `histogram` |
//! | [`Logger`] | `logging` | `Info`, `Warn`, `Error`, `Debug`, `Trace` |
//! | [`FunctionClient`] | `function` | any registered function name |
//!
//! # Partial Results
//!
//! When the host answers with a partial status, the value is not thrown
//! away: it travels inside the error's `Partial` variant.
//!
//! ```ignore
//! use tarmac_capability::{HostErrorExt, SqlClient, SqlError};
//!
//! match sql.query("SELECT * FROM orders") {
//!     Ok(rows) => render(rows),
//!     Err(SqlError::Partial { value, error }) => {
//!         tracing::warn!(%error, "showing partial results");
//!         render(value)
//!     }
//!     Err(e) if e.is_transport() => retry_later(),
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//!
//! # Testing
//!
//! Every client accepts a host call override through
//! [`ClientConfig::with_host_call`](tarmac_core::ClientConfig::with_host_call).
//! Code written against the [`Kv`] or [`Http`] traits can also use the
//! whole-client doubles in [`mock`].

pub mod builtin;
pub mod capability;
pub mod error;
pub mod mock;

pub use builtin::{
    ALLOWED_METHODS, Counter, ExecResult, FunctionClient, FunctionError, FunctionResult, Gauge,
    Histogram, HostLogLayer, Http, HttpClient, HttpConfig, HttpError, HttpResult, Kv, KvClient,
    KvError, KvResult, LogLevel, Logger, LoggingError, LoggingResult, MetricsClient, MetricsError,
    MetricsResult, QueryResult, Request, Response, SqlClient, SqlError, SqlResult,
    is_valid_metric_name,
};
pub use capability::{Capability, CapabilityId, standard_ids};
pub use error::{HostErrorExt, PartialError};
