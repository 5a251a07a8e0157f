//! Capability identity.
//!
//! Each client targets exactly one host capability. The capability id is
//! the middle segment of every call address the client produces.

use std::borrow::Cow;
use std::fmt;

/// Identifier of a host capability (e.g., `kvstore`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CapabilityId(Cow<'static, str>);

impl CapabilityId {
    /// Create a new capability ID.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for CapabilityId {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

/// Capability ids understood by the host.
pub mod standard_ids {
    use super::CapabilityId;
    use std::borrow::Cow;

    /// Key-value store.
    pub const KVSTORE: CapabilityId = CapabilityId(Cow::Borrowed("kvstore"));
    /// Outbound HTTP.
    pub const HTTPCLIENT: CapabilityId = CapabilityId(Cow::Borrowed("httpclient"));
    /// SQL database.
    pub const SQL: CapabilityId = CapabilityId(Cow::Borrowed("sql"));
    /// Metrics.
    pub const METRICS: CapabilityId = CapabilityId(Cow::Borrowed("metrics"));
    /// Host logger.
    pub const LOGGING: CapabilityId = CapabilityId(Cow::Borrowed("logging"));
    /// Function-to-function calls.
    pub const FUNCTION: CapabilityId = CapabilityId(Cow::Borrowed("function"));
}

/// A client bound to one host capability.
pub trait Capability: fmt::Debug + Send + Sync {
    /// The capability this client calls. Every call address the client
    /// builds uses this id.
    fn id(&self) -> CapabilityId;

    /// The namespace this client's calls are issued under.
    fn namespace(&self) -> &str;
}
