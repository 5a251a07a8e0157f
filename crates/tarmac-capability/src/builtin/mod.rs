//! Built-in capability clients.
//!
//! - [`KvClient`]: key-value store (`kvstore`)
//! - [`HttpClient`]: outbound HTTP (`httpclient`)
//! - [`SqlClient`]: SQL database (`sql`)
//! - [`MetricsClient`]: counters, gauges and histograms (`metrics`)
//! - [`Logger`]: host logger (`logging`)
//! - [`FunctionClient`]: function-to-function calls (`function`)

pub mod function;
pub mod http;
pub mod kv;
pub mod logging;
pub mod metrics;
pub mod sql;

pub use function::{FunctionClient, FunctionError, FunctionResult};
pub use self::http::{
    ALLOWED_METHODS, Http, HttpClient, HttpConfig, HttpError, HttpResult, Request, Response,
};
pub use kv::{Kv, KvClient, KvError, KvResult};
pub use logging::{HostLogLayer, LogLevel, Logger, LoggingError, LoggingResult};
pub use metrics::{
    Counter, Gauge, Histogram, MetricsClient, MetricsError, MetricsResult, is_valid_metric_name,
};
pub use sql::{ExecResult, QueryResult, SqlClient, SqlError, SqlResult};
