//! Error types for upload ingestion

/// Errors while reading upload records
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Payload is not valid JSON or does not match the upload shape
    #[error("invalid upload payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// Payload parsed but has no recognizable uploads list
    #[error("payload has no uploads list: {0}")]
    MissingUploads(String),
}

impl ModelError {
    /// Create missing-uploads error describing where the lookup stopped
    pub fn missing_uploads(detail: impl Into<String>) -> Self {
        Self::MissingUploads(detail.into())
    }
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_uploads_display() {
        let err = ModelError::missing_uploads("commit");
        assert_eq!(err.to_string(), "payload has no uploads list: commit");
    }

    #[test]
    fn json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ModelError = json_err.into();
        assert!(matches!(err, ModelError::InvalidPayload(_)));
    }
}
