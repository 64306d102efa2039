//! Filter and search views over a grouping
//!
//! The defect subsets (`errored_uploads`, `flag_error_uploads`) are always
//! computed so their counts can be shown while the toggles are off. The
//! toggles only decide what the main list displays. A non-empty search term
//! replaces the grouped main list with a flat result list.

use crate::grouping::UploadGroups;
use covhist_model::{ProviderKey, Upload};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Filter controls for the uploads panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadFilters {
    /// Restrict main list to uploads with flag anomalies
    pub flag_errors: bool,
    /// Restrict main list to errored uploads
    pub upload_errors: bool,
    /// Free-text search over names and flags
    pub search_term: String,
}

impl UploadFilters {
    /// Create filters with everything off
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With flag-error toggle
    #[inline]
    #[must_use]
    pub fn with_flag_errors(mut self, on: bool) -> Self {
        self.flag_errors = on;
        self
    }

    /// With upload-error toggle
    #[inline]
    #[must_use]
    pub fn with_upload_errors(mut self, on: bool) -> Self {
        self.upload_errors = on;
        self
    }

    /// With search term
    #[inline]
    #[must_use]
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Reset all three controls at once
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Normalized search needle, if the term is not blank
    #[must_use]
    pub fn search_needle(&self) -> Option<String> {
        let trimmed = self.search_term.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    /// Check if any control is set
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.flag_errors || self.upload_errors || self.search_needle().is_some()
    }
}

/// Derived subsets of a grouping
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredUploads {
    /// Uploads in the `ERROR` state, by provider
    pub errored_uploads: UploadGroups,
    /// Uploads carrying two or more flags, by provider
    pub flag_error_uploads: UploadGroups,
    /// Flat search matches; empty when the term is blank
    pub search_results: Vec<Upload>,
}

/// Compute the derived subsets
#[must_use]
pub fn filter_uploads(grouped: &UploadGroups, filters: &UploadFilters) -> FilteredUploads {
    let search_results = match filters.search_needle() {
        Some(needle) => grouped
            .uploads()
            .filter(|upload| matches_search(upload, &needle))
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    FilteredUploads {
        errored_uploads: grouped.filtered(Upload::is_errored),
        flag_error_uploads: grouped.filtered(Upload::has_multiple_flags),
        search_results,
    }
}

/// Case-insensitive substring match on an upload's label and flags
///
/// `needle` must already be lowercase.
#[must_use]
pub fn matches_search(upload: &Upload, needle: &str) -> bool {
    upload.label().to_lowercase().contains(needle)
        || upload
            .flags
            .iter()
            .any(|flag| flag.to_lowercase().contains(needle))
}

/// One row of the grouped main list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedRow {
    /// Position of the upload within its full provider group
    pub member_index: usize,
    /// The upload shown on this row
    pub upload: Upload,
}

/// Provider-grouped main list
///
/// Rows keep their index in the unfiltered group, so a row can be mapped back
/// onto selection state even when the toggles hide some of its siblings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedView {
    groups: IndexMap<ProviderKey, Vec<GroupedRow>>,
}

impl GroupedView {
    /// Rows matching `predicate`; groups left empty are omitted
    pub fn from_groups<F>(grouped: &UploadGroups, mut predicate: F) -> Self
    where
        F: FnMut(&Upload) -> bool,
    {
        let groups = grouped
            .iter()
            .filter_map(|(provider, uploads)| {
                let rows: Vec<GroupedRow> = uploads
                    .iter()
                    .enumerate()
                    .filter(|&(_, upload)| predicate(upload))
                    .map(|(member_index, upload)| GroupedRow {
                        member_index,
                        upload: upload.clone(),
                    })
                    .collect();
                (!rows.is_empty()).then(|| (provider.clone(), rows))
            })
            .collect();
        Self { groups }
    }

    /// Groups with their rows, in display order
    pub fn iter(&self) -> impl Iterator<Item = (&ProviderKey, &[GroupedRow])> {
        self.groups.iter().map(|(provider, rows)| (provider, rows.as_slice()))
    }

    /// Every displayed upload, group by group
    pub fn uploads(&self) -> impl Iterator<Item = &Upload> {
        self.groups.values().flatten().map(|row| &row.upload)
    }

    /// Provider keys in display order
    #[must_use]
    pub fn provider_order(&self) -> Vec<ProviderKey> {
        self.groups.keys().cloned().collect()
    }

    /// Number of groups displayed
    #[inline]
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of rows displayed
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// What the main uploads list displays
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "uploads", rename_all = "camelCase")]
pub enum MainView {
    /// Provider-grouped list, possibly restricted by the defect toggles
    Grouped(GroupedView),
    /// Flat search results; grouped display is suppressed
    Search(Vec<Upload>),
}

impl MainView {
    /// Number of uploads displayed
    #[must_use]
    pub fn upload_count(&self) -> usize {
        match self {
            Self::Grouped(groups) => groups.upload_count(),
            Self::Search(results) => results.len(),
        }
    }
}

/// Resolve the main list for the given filters
///
/// Search wins outright over the toggles and reuses the matches already held
/// in `filtered`. With both toggles on, an upload must be both errored and
/// flag-anomalous to be shown.
#[must_use]
pub fn main_view(
    grouped: &UploadGroups,
    filters: &UploadFilters,
    filtered: &FilteredUploads,
) -> MainView {
    if filters.search_needle().is_some() {
        return MainView::Search(filtered.search_results.clone());
    }

    let view = match (filters.upload_errors, filters.flag_errors) {
        (false, false) => GroupedView::from_groups(grouped, |_| true),
        (true, false) => GroupedView::from_groups(grouped, Upload::is_errored),
        (false, true) => GroupedView::from_groups(grouped, Upload::has_multiple_flags),
        (true, true) => GroupedView::from_groups(grouped, |upload| {
            upload.is_errored() && upload.has_multiple_flags()
        }),
    };
    MainView::Grouped(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use covhist_model::UploadState;

    fn fixture() -> UploadGroups {
        UploadGroups::from_uploads(vec![
            Upload::new(0)
                .with_provider("travis")
                .with_name("Unit Tests")
                .with_state(UploadState::Error),
            Upload::new(1)
                .with_provider("travis")
                .with_name("integration")
                .with_flags(["backend", "frontend"]),
            Upload::new(2)
                .with_provider("circleci")
                .with_name("e2e")
                .with_state(UploadState::Error)
                .with_flags(["a", "b"]),
        ])
    }

    fn view(filters: &UploadFilters) -> MainView {
        let grouped = fixture();
        let filtered = filter_uploads(&grouped, filters);
        main_view(&grouped, filters, &filtered)
    }

    #[test]
    fn subsets_are_computed_with_toggles_off() {
        let filtered = filter_uploads(&fixture(), &UploadFilters::new());

        assert_eq!(filtered.errored_uploads.upload_count(), 2);
        assert_eq!(filtered.flag_error_uploads.upload_count(), 2);
        assert!(filtered.search_results.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_on_name() {
        let filters = UploadFilters::new().with_search_term("unit");
        let filtered = filter_uploads(&fixture(), &filters);

        assert_eq!(filtered.search_results.len(), 1);
        assert_eq!(filtered.search_results[0].name.as_deref(), Some("Unit Tests"));
    }

    #[test]
    fn search_matches_flags() {
        let filters = UploadFilters::new().with_search_term("FRONT");
        let view = view(&filters);
        assert_eq!(view.upload_count(), 1);
    }

    #[test]
    fn blank_search_keeps_grouped_view() {
        let filters = UploadFilters::new().with_search_term("   ");
        assert!(matches!(view(&filters), MainView::Grouped(_)));
    }

    #[test]
    fn upload_errors_toggle_restricts_main_list() {
        let filters = UploadFilters::new().with_upload_errors(true);
        let MainView::Grouped(groups) = view(&filters) else {
            panic!("expected grouped view");
        };
        assert_eq!(groups.upload_count(), 2);
        assert!(groups.uploads().all(Upload::is_errored));
    }

    #[test]
    fn both_toggles_intersect() {
        let filters = UploadFilters::new().with_upload_errors(true).with_flag_errors(true);
        let MainView::Grouped(groups) = view(&filters) else {
            panic!("expected grouped view");
        };
        assert_eq!(groups.provider_order(), vec![ProviderKey::named("circleci")]);
    }

    #[test]
    fn grouped_rows_keep_member_index() {
        let filters = UploadFilters::new().with_flag_errors(true);
        let MainView::Grouped(groups) = view(&filters) else {
            panic!("expected grouped view");
        };
        let travis: Vec<usize> = groups
            .iter()
            .find(|(provider, _)| **provider == ProviderKey::named("travis"))
            .map(|(_, rows)| rows.iter().map(|row| row.member_index).collect())
            .unwrap();
        assert_eq!(travis, vec![1]);
        assert_eq!(groups.group_count(), 2);
    }

    #[test]
    fn search_view_uses_precomputed_results() {
        let filters = UploadFilters::new().with_search_term("e2e");
        let grouped = fixture();
        let filtered = FilteredUploads {
            search_results: vec![Upload::new(42)],
            ..FilteredUploads::default()
        };
        assert_eq!(
            main_view(&grouped, &filters, &filtered),
            MainView::Search(vec![Upload::new(42)])
        );
    }

    #[test]
    fn clear_resets_everything() {
        let mut filters = UploadFilters::new()
            .with_upload_errors(true)
            .with_flag_errors(true)
            .with_search_term("x");
        filters.clear();
        assert_eq!(filters, UploadFilters::default());
        assert!(!filters.is_active());
    }
}
