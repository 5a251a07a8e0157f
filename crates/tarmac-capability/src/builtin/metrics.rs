//! Custom metrics.
//!
//! Metric names are checked once, when the handle is created. Each
//! emission is one host call with no response envelope. Emission failures
//! are logged and returned, and never stop the caller.

use prost::Message;
use tarmac_core::{ClientConfig, HostBinding, HostCallError};
use tarmac_proto::metrics::{MetricsCounter, MetricsGauge, MetricsHistogram};
use thiserror::Error;
use tracing::{debug, warn};

use crate::capability::{Capability, CapabilityId, standard_ids};
use crate::error::HostErrorExt;

const FN_COUNTER: &str = "counter";
const FN_GAUGE: &str = "gauge";
const FN_HISTOGRAM: &str = "histogram";

const ACTION_INC: &str = "inc";
const ACTION_DEC: &str = "dec";

/// Errors returned by the metrics client.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The metric name is blank or not a valid Prometheus name.
    #[error("metric name is invalid: {0:?}")]
    InvalidMetricName(String),

    /// The host call failed.
    #[error(transparent)]
    Host(#[from] HostCallError),
}

impl HostErrorExt for MetricsError {
    fn host_error(&self) -> Option<&HostCallError> {
        match self {
            Self::Host(error) => Some(error),
            Self::InvalidMetricName(_) => None,
        }
    }
}

/// Result type for metrics operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Check a name against the Prometheus metric name grammar
/// `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Client for the host `metrics` capability.
#[derive(Debug, Clone)]
pub struct MetricsClient {
    binding: HostBinding,
}

impl MetricsClient {
    /// Create a client from the given configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            binding: config.bind(),
        }
    }

    /// Create a counter handle.
    pub fn new_counter(&self, name: &str) -> MetricsResult<Counter> {
        Ok(Counter {
            metric: self.metric(name)?,
        })
    }

    /// Create a gauge handle.
    pub fn new_gauge(&self, name: &str) -> MetricsResult<Gauge> {
        Ok(Gauge {
            metric: self.metric(name)?,
        })
    }

    /// Create a histogram handle.
    pub fn new_histogram(&self, name: &str) -> MetricsResult<Histogram> {
        Ok(Histogram {
            metric: self.metric(name)?,
        })
    }

    fn metric(&self, name: &str) -> MetricsResult<Metric> {
        if name.trim().is_empty() || !is_valid_metric_name(name) {
            return Err(MetricsError::InvalidMetricName(name.to_string()));
        }
        Ok(Metric {
            binding: self.binding.clone(),
            capability: self.id(),
            name: name.to_string(),
        })
    }
}

impl Capability for MetricsClient {
    fn id(&self) -> CapabilityId {
        standard_ids::METRICS
    }

    fn namespace(&self) -> &str {
        self.binding.namespace()
    }
}

#[derive(Debug, Clone)]
struct Metric {
    binding: HostBinding,
    capability: CapabilityId,
    name: String,
}

impl Metric {
    fn emit(&self, function: &str, request: &impl Message) -> MetricsResult<()> {
        debug!(namespace = self.binding.namespace(), metric = %self.name, function, "metrics emit");
        self.binding
            .invoke_raw(self.capability.as_str(), function, &request.encode_to_vec())
            .map(|_| ())
            .map_err(|e| {
                warn!(metric = %self.name, function, error = %e, "Failed to emit metric");
                MetricsError::Host(e)
            })
    }
}

/// A monotonically increasing counter.
#[derive(Debug, Clone)]
pub struct Counter {
    metric: Metric,
}

impl Counter {
    /// The metric name.
    pub fn name(&self) -> &str {
        &self.metric.name
    }

    /// Increment by one.
    pub fn inc(&self) -> MetricsResult<()> {
        let request = MetricsCounter {
            name: self.metric.name.clone(),
        };
        self.metric.emit(FN_COUNTER, &request)
    }
}

/// A value that can go up and down.
#[derive(Debug, Clone)]
pub struct Gauge {
    metric: Metric,
}

impl Gauge {
    /// The metric name.
    pub fn name(&self) -> &str {
        &self.metric.name
    }

    /// Increment by one.
    pub fn inc(&self) -> MetricsResult<()> {
        self.action(ACTION_INC)
    }

    /// Decrement by one.
    pub fn dec(&self) -> MetricsResult<()> {
        self.action(ACTION_DEC)
    }

    fn action(&self, action: &str) -> MetricsResult<()> {
        let request = MetricsGauge {
            name: self.metric.name.clone(),
            action: action.to_string(),
        };
        self.metric.emit(FN_GAUGE, &request)
    }
}

/// A distribution of observed values.
#[derive(Debug, Clone)]
pub struct Histogram {
    metric: Metric,
}

impl Histogram {
    /// The metric name.
    pub fn name(&self) -> &str {
        &self.metric.name
    }

    /// Record one observation.
    pub fn observe(&self, value: f64) -> MetricsResult<()> {
        let request = MetricsHistogram {
            name: self.metric.name.clone(),
            value,
        };
        self.metric.emit(FN_HISTOGRAM, &request)
    }
}
