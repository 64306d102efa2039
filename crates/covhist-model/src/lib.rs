//! Coverage History Model
//!
//! Typed records for the coverage uploads attached to a commit.
//!
//! # Core Types
//!
//! - **`Upload`**: one coverage report submission (one per CI job/report)
//! - **`ErrorCode`**: closed tagged union over the raw `errorCode` values
//! - **`ProviderKey`**: CI provider bucket, with a sentinel for uploads without one
//!
//! # Example
//!
//! ```rust,ignore
//! use covhist_model::parse_uploads;
//!
//! let uploads = parse_uploads(r#"{"commit": {"uploads": []}}"#)?;
//! assert!(uploads.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod error_code;
pub mod ingest;
pub mod provider;
pub mod time;
pub mod upload;

pub use error::{ModelError, ModelResult};
pub use error_code::ErrorCode;
pub use ingest::{parse_uploads, uploads_from_value};
pub use provider::ProviderKey;
pub use upload::{Upload, UploadErrorEntry, UploadId, UploadState, UploadType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with upload records
    pub use crate::error_code::ErrorCode;
    pub use crate::provider::ProviderKey;
    pub use crate::upload::{Upload, UploadErrorEntry, UploadId, UploadState, UploadType};
}
