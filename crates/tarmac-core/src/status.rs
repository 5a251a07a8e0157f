//! Host status codes.
//!
//! Every response envelope carries a numeric code. Only the five codes below
//! are meaningful; anything else is an unexpected response.

use std::fmt;

/// The call fully succeeded.
pub const STATUS_SUCCESS: i32 = 200;
/// The call partially succeeded; the response still carries data.
pub const STATUS_PARTIAL: i32 = 206;
/// The request was rejected by the host.
pub const STATUS_BAD_INPUT: i32 = 400;
/// The requested item does not exist.
pub const STATUS_NOT_FOUND: i32 = 404;
/// The host failed while serving the call.
pub const STATUS_SERVER_ERROR: i32 = 500;

/// Classification of a host status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostStatus {
    /// 200
    Success,
    /// 206
    Partial,
    /// 400
    BadInput,
    /// 404
    NotFound,
    /// 500
    ServerError,
    /// Any code outside the known set.
    Unknown(i32),
}

impl HostStatus {
    /// Classify a raw status code.
    pub fn classify(code: i32) -> Self {
        match code {
            STATUS_SUCCESS => Self::Success,
            STATUS_PARTIAL => Self::Partial,
            STATUS_BAD_INPUT => Self::BadInput,
            STATUS_NOT_FOUND => Self::NotFound,
            STATUS_SERVER_ERROR => Self::ServerError,
            other => Self::Unknown(other),
        }
    }

    /// The raw code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => STATUS_SUCCESS,
            Self::Partial => STATUS_PARTIAL,
            Self::BadInput => STATUS_BAD_INPUT,
            Self::NotFound => STATUS_NOT_FOUND,
            Self::ServerError => STATUS_SERVER_ERROR,
            Self::Unknown(code) => *code,
        }
    }

    /// Whether this is one of the host's error statuses (400, 404, 500).
    pub fn is_error(&self) -> bool {
        matches!(self, Self::BadInput | Self::NotFound | Self::ServerError)
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_codes() {
        assert_eq!(HostStatus::classify(200), HostStatus::Success);
        assert_eq!(HostStatus::classify(206), HostStatus::Partial);
        assert_eq!(HostStatus::classify(400), HostStatus::BadInput);
        assert_eq!(HostStatus::classify(404), HostStatus::NotFound);
        assert_eq!(HostStatus::classify(500), HostStatus::ServerError);
    }

    #[test]
    fn test_classify_unknown_codes() {
        assert_eq!(HostStatus::classify(0), HostStatus::Unknown(0));
        assert_eq!(HostStatus::classify(999), HostStatus::Unknown(999));
        assert_eq!(HostStatus::classify(418).code(), 418);
        assert!(!HostStatus::classify(418).is_error());
    }

    #[test]
    fn test_error_statuses() {
        for code in [400, 404, 500] {
            assert!(HostStatus::classify(code).is_error());
        }
        assert!(!HostStatus::Success.is_error());
        assert!(!HostStatus::Partial.is_error());
    }
}
