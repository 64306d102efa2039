//! Error classification
//!
//! Collapses an upload's raw error entries into canonical categories with
//! counts. Null entries are skipped; every other entry lands in exactly one
//! category, so the emitted counts always sum to the number of non-null
//! entries.

use covhist_model::{ErrorCode, Upload, UploadErrorEntry};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Canonical error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ErrorCategory {
    /// Report missing from storage
    #[serde(rename = "fileNotFoundInStorage")]
    FileNotFoundInStorage,
    /// Report too old to process
    #[serde(rename = "reportExpired")]
    ReportExpired,
    /// Report had no usable content
    #[serde(rename = "reportEmpty")]
    ReportEmpty,
    /// Any code outside the known set, including null or malformed codes
    #[serde(rename = "UNKNOWN_ERROR")]
    Unknown,
}

impl ErrorCategory {
    /// Category for a raw code
    #[must_use]
    pub fn from_code(code: Option<&ErrorCode>) -> Self {
        match code {
            Some(ErrorCode::FileNotInStorage) => Self::FileNotFoundInStorage,
            Some(ErrorCode::ReportExpired) => Self::ReportExpired,
            Some(ErrorCode::ReportEmpty) => Self::ReportEmpty,
            Some(ErrorCode::Unknown(_)) | None => Self::Unknown,
        }
    }

    /// Stable category name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::FileNotFoundInStorage => "fileNotFoundInStorage",
            Self::ReportExpired => "reportExpired",
            Self::ReportEmpty => "reportEmpty",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One deduplicated category row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Category
    pub category: ErrorCategory,
    /// Number of raw entries that fell into it
    pub count: usize,
}

/// Classify raw error entries
///
/// Rows come out in first-seen order, one per category.
#[must_use]
pub fn classify<'a, I>(errors: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a Option<UploadErrorEntry>>,
{
    let mut counts: IndexMap<ErrorCategory, usize> = IndexMap::new();
    for entry in errors.into_iter().flatten() {
        *counts
            .entry(ErrorCategory::from_code(entry.error_code.as_ref()))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect()
}

/// Classify one upload's errors
#[inline]
#[must_use]
pub fn classify_upload(upload: &Upload) -> Vec<CategoryCount> {
    classify(&upload.errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(code: &str) -> Option<UploadErrorEntry> {
        Some(UploadErrorEntry::new(code))
    }

    #[test]
    fn empty_list_has_no_rows() {
        assert!(classify(&Vec::<Option<UploadErrorEntry>>::new()).is_empty());
    }

    #[test]
    fn duplicates_collapse_into_one_row() {
        let errors = vec![entry("REPORT_EMPTY"); 5];
        assert_eq!(
            classify(&errors),
            vec![CategoryCount {
                category: ErrorCategory::ReportEmpty,
                count: 5
            }]
        );
    }

    #[test]
    fn null_entries_are_skipped() {
        let errors = vec![None, entry("REPORT_EXPIRED"), None];
        let rows = classify(&errors);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 1);
    }

    #[test]
    fn null_code_counts_as_unknown() {
        let errors = vec![Some(UploadErrorEntry::without_code())];
        assert_eq!(classify(&errors)[0].category, ErrorCategory::Unknown);
    }

    #[test]
    fn object_code_counts_as_unknown() {
        let errors = vec![Some(UploadErrorEntry::new(ErrorCode::Unknown(json!({"nested": true}))))];
        assert_eq!(
            classify(&errors),
            vec![CategoryCount {
                category: ErrorCategory::Unknown,
                count: 1
            }]
        );
    }

    #[test]
    fn category_names() {
        assert_eq!(ErrorCategory::FileNotFoundInStorage.name(), "fileNotFoundInStorage");
        assert_eq!(ErrorCategory::Unknown.to_string(), "UNKNOWN_ERROR");
    }
}
