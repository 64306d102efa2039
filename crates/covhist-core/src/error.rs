//! Error types for coverage history
//!
//! Classification, grouping and filtering are total and never fail; only
//! selection can be asked about a group or member that does not exist.

use covhist_model::ProviderKey;

/// Selection engine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// No provider group with this key
    #[error("unknown provider group: {0}")]
    UnknownGroup(ProviderKey),

    /// Member index past the end of the group
    #[error("upload index {index} out of range for provider {provider} ({len} uploads)")]
    IndexOutOfRange {
        /// Group that was addressed
        provider: ProviderKey,
        /// Requested member index
        index: usize,
        /// Number of members in the group
        len: usize,
    },
}

impl SelectionError {
    /// Create out-of-range error
    pub fn index_out_of_range(provider: ProviderKey, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            provider,
            index,
            len,
        }
    }
}

/// Result type alias for selection operations
pub type SelectionResult<T> = Result<T, SelectionError>;
