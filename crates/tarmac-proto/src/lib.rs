//! Tarmac Wire Messages
//!
//! Protobuf messages exchanged between guest functions and the Tarmac host.
//! Each capability owns a request/response pair; every response embeds the
//! shared [`Status`] envelope that tells the guest how the host call went.
//!
//! The schema is versioned alongside the host. Field tags must never be
//! reused once published.

pub mod http;
pub mod kvstore;
pub mod metrics;
pub mod sql;

/// Outcome of a host call, embedded in every response message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    /// Host supplied status text (e.g., "OK", or an error description).
    #[prost(string, tag = "1")]
    pub status: ::prost::alloc::string::String,
    /// Numeric outcome code (200, 206, 400, 404, 500).
    #[prost(int32, tag = "2")]
    pub code: i32,
}

impl Status {
    /// Create a status with the given code and text.
    pub fn new(code: i32, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            code,
        }
    }

    /// Shorthand for a `200 OK` status.
    pub fn ok() -> Self {
        Self::new(200, "OK")
    }
}
