//! Error types for report downloads
//!
//! Every variant names the URL or path it concerns so a logged failure
//! identifies which upload it belongs to.

use std::path::PathBuf;

/// Errors in one upload's fetch/save pipeline
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Transport-level request failure
    #[error("request to {url} failed: {source}")]
    Request {
        /// Report URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{url} responded with status {status}")]
    Status {
        /// Report URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Fetch failed for a reason other than transport
    #[error("fetch of {url} failed: {message}")]
    Fetch {
        /// Report URL
        url: String,
        /// What went wrong
        message: String,
    },

    /// Staging or saving the report body failed
    #[error("io error at {path}: {source}")]
    Io {
        /// File being staged or written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Object URL was never created or already revoked
    #[error("unknown object url: {0}")]
    UnknownObject(String),

    /// HTTP client could not be built
    #[error("http client setup failed: {0}")]
    ClientSetup(#[source] reqwest::Error),
}

impl DownloadError {
    /// Create request error for URL
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// Create generic fetch error for URL
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for download operations
pub type DownloadResult<T> = Result<T, DownloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        let err = DownloadError::Status {
            url: "https://example.com/r.txt".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "https://example.com/r.txt responded with status 404");
    }

    #[test]
    fn fetch_display() {
        let err = DownloadError::fetch("https://example.com/a", "connection reset");
        assert_eq!(
            err.to_string(),
            "fetch of https://example.com/a failed: connection reset"
        );
    }

    #[test]
    fn io_display() {
        let err = DownloadError::io_error(
            "/tmp/out",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("io error at /tmp/out"));
    }
}
