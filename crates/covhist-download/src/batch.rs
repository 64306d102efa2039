//! Batch report download
//!
//! Downloads every report in one provider group concurrently. Each upload
//! runs its own fetch → stage → save → release pipeline; a failure in one
//! pipeline is logged and counted but never cancels or fails the others.

use crate::config::DownloadConfig;
use crate::error::DownloadResult;
use crate::fetcher::{HttpFetcher, ReportFetcher};
use crate::saver::{FsSaver, ReportSaver};
use covhist_core::UploadGroups;
use covhist_model::{ProviderKey, UploadId};
use futures::future::join_all;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Filename used when a URL has no usable last path segment
pub const FALLBACK_FILENAME: &str = "coverage-report.txt";

/// Outcome of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Uploads with a download URL that were attempted
    pub attempted: usize,
    /// Where each successful report landed
    pub saved: Vec<PathBuf>,
    /// Uploads whose pipeline failed
    pub failed: usize,
}

impl BatchReport {
    /// True when every attempted download succeeded
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Concurrent per-provider report downloader
#[derive(Clone)]
pub struct BatchDownloader {
    fetcher: Arc<dyn ReportFetcher>,
    saver: Arc<dyn ReportSaver>,
}

impl std::fmt::Debug for BatchDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchDownloader").finish_non_exhaustive()
    }
}

impl BatchDownloader {
    /// Create downloader from a fetcher and saver
    #[must_use]
    pub fn new(fetcher: Arc<dyn ReportFetcher>, saver: Arc<dyn ReportSaver>) -> Self {
        Self { fetcher, saver }
    }

    /// HTTP fetcher plus filesystem saver from configuration
    pub fn from_config(config: &DownloadConfig) -> DownloadResult<Self> {
        Ok(Self::new(
            Arc::new(HttpFetcher::new(config)?),
            Arc::new(FsSaver::from_config(config)),
        ))
    }

    /// Download all reports for `provider`
    ///
    /// An empty, absent or unknown provider is a no-op. Uploads without a
    /// download URL are skipped. Resolves once every pipeline has settled.
    pub async fn download_all(
        &self,
        provider: Option<&ProviderKey>,
        groups: &UploadGroups,
    ) -> BatchReport {
        let Some(provider) = provider else {
            return BatchReport::default();
        };
        let Some(uploads) = groups.get(provider) else {
            return BatchReport::default();
        };

        let jobs: Vec<_> = uploads
            .iter()
            .filter_map(|upload| upload.download_url().map(|url| (upload.id, url)))
            .map(|(id, url)| self.download_logged(provider, id, url))
            .collect();

        let attempted = jobs.len();
        let saved: Vec<PathBuf> = join_all(jobs).await.into_iter().flatten().collect();
        let report = BatchReport {
            attempted,
            failed: attempted - saved.len(),
            saved,
        };

        info!(
            provider = %provider,
            attempted = report.attempted,
            saved = report.saved.len(),
            failed = report.failed,
            "batch download finished"
        );
        report
    }

    async fn download_logged(
        &self,
        provider: &ProviderKey,
        id: Option<UploadId>,
        url: &str,
    ) -> Option<PathBuf> {
        match self.download_one(url).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!(
                    upload_id = ?id.map(|id| id.0),
                    provider = %provider,
                    url,
                    error = %e,
                    "report download failed"
                );
                None
            }
        }
    }

    async fn download_one(&self, url: &str) -> DownloadResult<PathBuf> {
        let body = self.fetcher.fetch(url).await?;
        let object = self.saver.create_object(body).await?;
        let saved = self.saver.save(&object, &filename_from_url(url)).await;
        self.saver.revoke(&object);
        saved
    }
}

/// Last path segment of a URL, ignoring query and fragment
#[must_use]
pub fn filename_from_url(url: &str) -> String {
    let segment = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit(['/', '\\']).next())
            .map(str::to_string),
    };

    match segment {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => FALLBACK_FILENAME.to_string(),
    }
}
