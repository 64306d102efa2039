//! Upload records
//!
//! An `Upload` is one coverage report submission tied to a commit. Records come
//! from the commit detail query and are never mutated here; every optional
//! field tolerates both absence and an explicit `null`.

use crate::error_code::ErrorCode;
use crate::provider::ProviderKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Upload identifier, unique within a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadId(pub i64);

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UploadId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Server-side processing lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadState {
    /// Upload received, processing not finished
    #[default]
    Started,
    /// Report processed
    Processed,
    /// Report processed and merged
    Complete,
    /// Processing failed
    Error,
}

impl UploadState {
    /// Wire name of the state
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Processed => "PROCESSED",
            Self::Complete => "COMPLETE",
            Self::Error => "ERROR",
        }
    }
}

/// How the upload's coverage was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadType {
    /// Freshly measured for this commit
    #[default]
    Uploaded,
    /// Reused from a prior commit
    #[serde(alias = "CARRIEDFORWARD")]
    CarriedForward,
}

/// One raw error entry reported for an upload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadErrorEntry {
    /// Raw code, possibly missing or malformed
    #[serde(default)]
    pub error_code: Option<ErrorCode>,
}

impl UploadErrorEntry {
    /// Create entry with a code
    #[inline]
    #[must_use]
    pub fn new(code: impl Into<ErrorCode>) -> Self {
        Self {
            error_code: Some(code.into()),
        }
    }

    /// Create entry whose code is null
    #[inline]
    #[must_use]
    pub fn without_code() -> Self {
        Self { error_code: None }
    }
}

/// One coverage report submission
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Upload {
    /// Identifier; absent on never-persisted draft rows
    pub id: Option<UploadId>,
    /// Display name
    pub name: Option<String>,
    /// Processing lifecycle
    #[serde(deserialize_with = "null_as_default")]
    pub state: UploadState,
    /// Free-text CI provider name
    pub provider: Option<String>,
    /// Creation timestamp
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
    /// Ordered flag tags
    #[serde(deserialize_with = "null_as_default")]
    pub flags: Vec<String>,
    /// Raw report download location
    pub download_url: Option<String>,
    /// CI job page
    pub ci_url: Option<String>,
    /// Fresh or carried forward
    #[serde(deserialize_with = "null_as_default")]
    pub upload_type: UploadType,
    /// CI job identifier
    pub job_code: Option<String>,
    /// CI build identifier
    pub build_code: Option<String>,
    /// Raw error entries; individual entries may be null
    #[serde(deserialize_with = "null_as_default")]
    pub errors: Vec<Option<UploadErrorEntry>>,
}

/// Label used when an upload has neither a name nor a build code
pub const FALLBACK_LABEL: &str = "upload";

impl Upload {
    /// Create upload with an id and defaults everywhere else
    #[inline]
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self {
            id: Some(UploadId(id)),
            ..Self::default()
        }
    }

    /// Create upload without an id (draft row)
    #[inline]
    #[must_use]
    pub fn draft() -> Self {
        Self::default()
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With lifecycle state
    #[inline]
    #[must_use]
    pub fn with_state(mut self, state: UploadState) -> Self {
        self.state = state;
        self
    }

    /// With CI provider
    #[inline]
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// With flag tags
    #[must_use]
    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// With raw error entries
    #[inline]
    #[must_use]
    pub fn with_errors(mut self, errors: Vec<Option<UploadErrorEntry>>) -> Self {
        self.errors = errors;
        self
    }

    /// With download URL
    #[inline]
    #[must_use]
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    /// With upload type
    #[inline]
    #[must_use]
    pub fn with_upload_type(mut self, upload_type: UploadType) -> Self {
        self.upload_type = upload_type;
        self
    }

    /// With build code
    #[inline]
    #[must_use]
    pub fn with_build_code(mut self, build_code: impl Into<String>) -> Self {
        self.build_code = Some(build_code.into());
        self
    }

    /// With creation time
    #[inline]
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Display label: name, then build code, then a fixed fallback
    #[must_use]
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.build_code.as_deref().filter(|code| !code.is_empty()))
            .unwrap_or(FALLBACK_LABEL)
    }

    /// Provider grouping key
    #[inline]
    #[must_use]
    pub fn provider_key(&self) -> ProviderKey {
        ProviderKey::from_provider(self.provider.as_deref())
    }

    /// Non-empty download URL, if any
    #[inline]
    #[must_use]
    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Check if processing failed
    #[inline]
    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.state == UploadState::Error
    }

    /// Check if coverage was reused from a prior commit
    #[inline]
    #[must_use]
    pub fn is_carried_forward(&self) -> bool {
        self.upload_type == UploadType::CarriedForward
    }

    /// Check if the upload carries two or more flags
    #[inline]
    #[must_use]
    pub fn has_multiple_flags(&self) -> bool {
        self.flags.len() >= 2
    }

    /// Non-null error entries
    pub fn error_entries(&self) -> impl Iterator<Item = &UploadErrorEntry> {
        self.errors.iter().flatten()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
