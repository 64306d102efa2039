//! Coverage History Download
//!
//! Best-effort batch download of the raw reports in one provider group.
//!
//! # Core Operations
//!
//! - **Fetch**: pull a report body over HTTP ([`HttpFetcher`])
//! - **Save**: stage, save and release each body ([`FsSaver`])
//! - **Batch**: run every upload's pipeline concurrently with isolated failures
//!
//! # Example
//!
//! ```rust,ignore
//! use covhist_download::{BatchDownloader, DownloadConfig};
//!
//! let downloader = BatchDownloader::from_config(&DownloadConfig::new().with_output_dir("reports"))?;
//! let report = downloader.download_all(Some(&ProviderKey::named("travis")), &groups).await;
//! println!("{} of {} saved", report.saved.len(), report.attempted);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod batch;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod saver;

pub use batch::{filename_from_url, BatchDownloader, BatchReport, FALLBACK_FILENAME};
pub use config::DownloadConfig;
pub use error::{DownloadError, DownloadResult};
pub use fetcher::{HttpFetcher, ReportFetcher};
pub use saver::{FsSaver, ObjectUrl, ReportSaver};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
