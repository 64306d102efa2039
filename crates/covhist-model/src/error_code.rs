//! Raw upload error codes
//!
//! The upstream payload carries `errorCode` as an arbitrary JSON value: usually
//! one of a few known strings, sometimes an unseen string, occasionally a
//! malformed object. All of these land in one closed enum so that the fallback
//! branch is explicit everywhere it is matched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire value for a report missing from storage
pub const FILE_NOT_IN_STORAGE: &str = "FILE_NOT_IN_STORAGE";
/// Wire value for an expired report
pub const REPORT_EXPIRED: &str = "REPORT_EXPIRED";
/// Wire value for an empty report
pub const REPORT_EMPTY: &str = "REPORT_EMPTY";

/// Error code attached to an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ErrorCode {
    /// Report file could not be found in storage
    FileNotInStorage,
    /// Report exceeded its maximum age before processing
    ReportExpired,
    /// Report was processed but contained nothing usable
    ReportEmpty,
    /// Any other value, kept verbatim
    Unknown(Value),
}

impl ErrorCode {
    /// Map a raw code string onto the closed set
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            FILE_NOT_IN_STORAGE => Self::FileNotInStorage,
            REPORT_EXPIRED => Self::ReportExpired,
            REPORT_EMPTY => Self::ReportEmpty,
            other => Self::Unknown(Value::String(other.to_string())),
        }
    }

    /// Wire representation, if this code has one of the known spellings
    #[inline]
    #[must_use]
    pub fn as_known_str(&self) -> Option<&'static str> {
        match self {
            Self::FileNotInStorage => Some(FILE_NOT_IN_STORAGE),
            Self::ReportExpired => Some(REPORT_EXPIRED),
            Self::ReportEmpty => Some(REPORT_EMPTY),
            Self::Unknown(_) => None,
        }
    }

    /// Check if the code is outside the known set
    #[inline]
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl From<Value> for ErrorCode {
    fn from(value: Value) -> Self {
        match value {
            Value::String(code) => Self::from_code(&code),
            other => Self::Unknown(other),
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        Self::from_code(code)
    }
}

impl From<ErrorCode> for Value {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Unknown(raw) => raw,
            known => Value::String(known.as_known_str().unwrap_or_default().to_string()),
        }
    }
}
