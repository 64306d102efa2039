//! Upload error notices
//!
//! Turns classifier rows into the fixed messages shown next to an upload.
//! Flags and errors are independent signals: an upload can carry a
//! multiple-flags warning with or without error notices.

use crate::classify::{classify_upload, CategoryCount, ErrorCategory};
use covhist_model::Upload;
use serde::Serialize;
use std::fmt;

/// Warning shown for uploads carrying two or more flags
pub const MULTIPLE_FLAGS_WARNING: &str =
    "Multiple flags detected. Consider splitting this upload into one upload per flag.";

/// Message for unknown or unclassifiable errors
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// One line of error text shown next to an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    /// Category the notice describes
    pub category: ErrorCategory,
    /// Fixed explanatory message
    pub message: &'static str,
    /// Documentation link, when one exists
    pub doc_link: Option<&'static str>,
    /// Number of raw errors collapsed into this notice
    pub count: usize,
}

impl ErrorNotice {
    /// Notice for a classifier row
    #[must_use]
    pub fn from_count(row: CategoryCount) -> Self {
        let (message, doc_link) = category_text(row.category);
        Self {
            category: row.category,
            message,
            doc_link,
            count: row.count,
        }
    }

    /// Notice shown for an errored upload that reported no usable errors
    #[must_use]
    pub fn unknown_fallback() -> Self {
        Self {
            category: ErrorCategory::Unknown,
            message: UNKNOWN_ERROR_MESSAGE,
            doc_link: None,
            count: 1,
        }
    }
}

impl fmt::Display for ErrorNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)?;
        if self.count > 1 {
            write!(f, " ({})", self.count)?;
        }
        Ok(())
    }
}

/// Everything worth flagging about one upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadNotices {
    /// Error notices, one per category
    pub errors: Vec<ErrorNotice>,
    /// Multiple-flags warning, if applicable
    pub flag_warning: Option<&'static str>,
}

impl UploadNotices {
    /// Check if there is nothing to show
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.flag_warning.is_none()
    }
}

/// Build notices for an upload
///
/// An upload in the `ERROR` state whose errors classify to nothing still gets a
/// single "Unknown error" notice.
#[must_use]
pub fn upload_notices(upload: &Upload) -> UploadNotices {
    let rows = classify_upload(upload);

    let errors = if rows.is_empty() && upload.is_errored() {
        vec![ErrorNotice::unknown_fallback()]
    } else {
        rows.into_iter().map(ErrorNotice::from_count).collect()
    };

    UploadNotices {
        errors,
        flag_warning: upload.has_multiple_flags().then_some(MULTIPLE_FLAGS_WARNING),
    }
}

fn category_text(category: ErrorCategory) -> (&'static str, Option<&'static str>) {
    match category {
        ErrorCategory::FileNotFoundInStorage => (
            "Upload failed: the report could not be found in storage. Please rerun the upload.",
            Some("https://docs.codecov.com/docs/error-reference#file-not-found-in-storage"),
        ),
        ErrorCategory::ReportExpired => (
            "Upload exceeds the max age of 12h and was not processed. Please rerun the upload.",
            Some("https://docs.codecov.com/docs/error-reference#report-expired"),
        ),
        ErrorCategory::ReportEmpty => (
            "Unusable report due to issues such as source code unavailability, path mismatch, empty report, or incorrect data format.",
            Some("https://docs.codecov.com/docs/error-reference#unusable-reports"),
        ),
        ErrorCategory::Unknown => (UNKNOWN_ERROR_MESSAGE, None),
    }
}
