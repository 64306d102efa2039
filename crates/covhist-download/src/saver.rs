//! Report saving
//!
//! A fetched body is first staged as a temporary object addressed by an
//! [`ObjectUrl`], then saved under a filename, then revoked. Revoking drops
//! the staged copy; it must happen once per created object whether or not
//! the save succeeded.

use crate::config::DownloadConfig;
use crate::error::{DownloadError, DownloadResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempPath;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Upper bound on " (n)" suffixes tried for a taken filename
const MAX_RENAME_ATTEMPTS: u32 = 1000;

/// Handle to a staged report body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    /// Wrap a raw handle string
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Handle as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stages, saves and releases report bodies
#[async_trait]
pub trait ReportSaver: Send + Sync {
    /// Stage a body and hand back its handle
    async fn create_object(&self, body: Vec<u8>) -> DownloadResult<ObjectUrl>;

    /// Save a staged body under `filename`, returning where it landed
    async fn save(&self, object: &ObjectUrl, filename: &str) -> DownloadResult<PathBuf>;

    /// Release a staged body
    fn revoke(&self, object: &ObjectUrl);
}

/// Saver writing into a local directory
///
/// Staged bodies are temp files inside the output directory. A filename that
/// is already taken gets a `" (n)"` suffix before its extension, so
/// concurrent saves never overwrite each other.
#[derive(Debug)]
pub struct FsSaver {
    output_dir: PathBuf,
    staged: Mutex<HashMap<ObjectUrl, TempPath>>,
    next_id: AtomicU64,
}

impl FsSaver {
    /// Create saver for a directory
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            staged: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Create saver from download configuration
    #[inline]
    #[must_use]
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(config.output_dir.clone())
    }

    /// Target directory
    #[inline]
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Number of objects created and not yet revoked
    #[must_use]
    pub fn staged_count(&self) -> usize {
        self.staged.lock().len()
    }

    async fn claim_destination(&self, filename: &str) -> DownloadResult<(PathBuf, File)> {
        let (stem, extension) = split_extension(filename);
        for attempt in 0..MAX_RENAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                filename.to_string()
            } else {
                format!("{stem} ({attempt}){extension}")
            };
            let path = self.output_dir.join(candidate);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(DownloadError::io_error(path, e)),
            }
        }
        Err(DownloadError::io_error(
            self.output_dir.join(filename),
            std::io::Error::new(ErrorKind::AlreadyExists, "no free filename left"),
        ))
    }
}

#[async_trait]
impl ReportSaver for FsSaver {
    async fn create_object(&self, body: Vec<u8>) -> DownloadResult<ObjectUrl> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| DownloadError::io_error(&self.output_dir, e))?;

        let staged = tempfile::Builder::new()
            .prefix(".covhist-")
            .suffix(".part")
            .tempfile_in(&self.output_dir)
            .map_err(|e| DownloadError::io_error(&self.output_dir, e))?
            .into_temp_path();

        // A failed write drops `staged`, which deletes the temp file.
        tokio::fs::write(&staged, &body)
            .await
            .map_err(|e| DownloadError::io_error(staged.to_path_buf(), e))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let object = ObjectUrl(format!("blob:covhist/{id}"));
        self.staged.lock().insert(object.clone(), staged);
        debug!(object = %object, bytes = body.len(), "staged report");
        Ok(object)
    }

    async fn save(&self, object: &ObjectUrl, filename: &str) -> DownloadResult<PathBuf> {
        let source = self
            .staged
            .lock()
            .get(object)
            .map(|path| path.to_path_buf())
            .ok_or_else(|| DownloadError::UnknownObject(object.to_string()))?;

        let (destination, mut target) = self.claim_destination(filename).await?;
        let mut reader = File::open(&source)
            .await
            .map_err(|e| DownloadError::io_error(&source, e))?;
        tokio::io::copy(&mut reader, &mut target)
            .await
            .map_err(|e| DownloadError::io_error(&destination, e))?;
        target
            .flush()
            .await
            .map_err(|e| DownloadError::io_error(&destination, e))?;

        Ok(destination)
    }

    fn revoke(&self, object: &ObjectUrl) {
        let Some(staged) = self.staged.lock().remove(object) else {
            debug!(object = %object, "revoke of unknown object");
            return;
        };
        if let Err(e) = staged.close() {
            warn!(object = %object, error = %e, "failed to remove staged report");
        }
    }
}

/// Split `name.ext` into (`name`, `.ext`); dotfiles keep their leading dot
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(i) if i > 0 => filename.split_at(i),
        _ => (filename, ""),
    }
}
