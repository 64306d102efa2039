//! Uploads history panel model
//!
//! Ties grouping and filtering together into the data one render of the
//! "Coverage reports history" panel needs.

use crate::filter::{filter_uploads, main_view, FilteredUploads, MainView, UploadFilters};
use crate::grouping::{group_uploads, UploadGrouping};
use covhist_model::Upload;
use serde::Serialize;
use tracing::debug;

/// Everything the history panel renders for one set of filters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadsHistory {
    /// Provider grouping, overview and emptiness
    pub grouping: UploadGrouping,
    /// Defect subsets and search results
    pub filtered: FilteredUploads,
    /// Main list as displayed
    pub main_view: MainView,
}

impl UploadsHistory {
    /// Build the panel model
    #[must_use]
    pub fn build(uploads: Vec<Upload>, filters: &UploadFilters) -> Self {
        let grouping = group_uploads(uploads);
        let filtered = filter_uploads(&grouping.grouped_by_provider, filters);
        let main_view = main_view(&grouping.grouped_by_provider, filters, &filtered);

        debug!(
            providers = grouping.grouped_by_provider.group_count(),
            errored = filtered.errored_uploads.upload_count(),
            flag_errors = filtered.flag_error_uploads.upload_count(),
            shown = main_view.upload_count(),
            "built uploads history"
        );

        Self {
            grouping,
            filtered,
            main_view,
        }
    }

    /// Re-apply a new set of filters to the same grouping
    pub fn refilter(&mut self, filters: &UploadFilters) {
        self.filtered = filter_uploads(&self.grouping.grouped_by_provider, filters);
        self.main_view = main_view(&self.grouping.grouped_by_provider, filters, &self.filtered);
    }
}
