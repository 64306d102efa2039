//! Coverage History Core
//!
//! Shapes a commit's flat list of coverage uploads into what the
//! "Coverage reports history" panel shows and lets a user pick which uploads
//! count towards coverage.
//!
//! # Core Operations
//!
//! - **Classify**: collapse raw upload errors into categories with counts
//! - **Group**: bucket uploads by CI provider and summarize their lifecycle
//! - **Filter**: derive errored / flag-anomaly subsets and search results
//! - **Select**: tri-state selection per provider group, published to a shared cache
//!
//! # Architecture
//!
//! ```text
//! Uploads → classify ─────────────┐
//!        → group → filter → view  │
//!                 ↓               ▼
//!          SelectionEngine → SharedCache["IgnoredUploadIds"] → coverage recomputation
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use covhist_core::prelude::*;
//!
//! let history = UploadsHistory::build(uploads, &UploadFilters::new());
//! let cache = SharedCache::default();
//! let mut selection = SelectionEngine::new(&history.grouping.grouped_by_provider, cache.clone());
//!
//! selection.toggle_upload(&ProviderKey::named("travis"), 0)?;
//! assert_eq!(cache.ignored_upload_ids(), vec![UploadId(0)]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod classify;
pub mod error;
pub mod filter;
pub mod grouping;
pub mod history;
pub mod notice;
pub mod selection;

pub use cache::{CacheKey, CacheStats, SharedCache, IGNORED_UPLOAD_IDS};
pub use classify::{classify, classify_upload, CategoryCount, ErrorCategory};
pub use error::{SelectionError, SelectionResult};
pub use filter::{
    filter_uploads, main_view, matches_search, FilteredUploads, GroupedRow, GroupedView, MainView,
    UploadFilters,
};
pub use grouping::{group_uploads, UploadGrouping, UploadGroups, UploadsOverview};
pub use history::UploadsHistory;
pub use notice::{upload_notices, ErrorNotice, UploadNotices, MULTIPLE_FLAGS_WARNING};
pub use selection::{derive_state, SelectionEngine, SelectionState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with coverage history
    pub use crate::cache::{SharedCache, IGNORED_UPLOAD_IDS};
    pub use crate::classify::{classify, CategoryCount, ErrorCategory};
    pub use crate::filter::{GroupedView, MainView, UploadFilters};
    pub use crate::grouping::{UploadGrouping, UploadGroups};
    pub use crate::history::UploadsHistory;
    pub use crate::notice::upload_notices;
    pub use crate::selection::{SelectionEngine, SelectionState};
    pub use covhist_model::{ProviderKey, Upload, UploadId, UploadState, UploadType};
}
