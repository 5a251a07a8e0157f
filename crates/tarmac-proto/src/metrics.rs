//! Metrics messages (`metrics/{counter,gauge,histogram}`).
//!
//! Metric calls are fire-and-forget; the host does not send a response
//! envelope back.

/// Request for `metrics/counter`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricsCounter {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
}

/// Request for `metrics/gauge`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricsGauge {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    /// Either `"inc"` or `"dec"`.
    #[prost(string, tag = "2")]
    pub action: ::prost::alloc::string::String,
}

/// Request for `metrics/histogram`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricsHistogram {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(double, tag = "2")]
    pub value: f64,
}
