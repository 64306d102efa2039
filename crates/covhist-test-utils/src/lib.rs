//! Testing utilities for coverage history workspace
//!
//! Shared upload fixtures plus recording fetcher/saver fakes.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use covhist_download::{DownloadError, DownloadResult, ObjectUrl, ReportFetcher, ReportSaver};
use covhist_model::{ErrorCode, Upload, UploadErrorEntry, UploadState, UploadType};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const STORAGE_BASE: &str = "https://storage.example.com/v4/raw";

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn report_url(id: i64) -> String {
    format!("{STORAGE_BASE}/{id}.txt")
}

pub fn create_upload(id: i64, provider: &str) -> Upload {
    Upload::new(id)
        .with_provider(provider)
        .with_name(format!("upload-{id}"))
        .with_state(UploadState::Processed)
        .with_download_url(report_url(id))
        .with_created_at(fixed_now())
}

pub fn create_errored_upload(id: i64, provider: &str, codes: &[&str]) -> Upload {
    let errors = codes
        .iter()
        .map(|code| Some(UploadErrorEntry::new(ErrorCode::from_code(code))))
        .collect();
    create_upload(id, provider)
        .with_state(UploadState::Error)
        .with_errors(errors)
}

pub fn create_carried_forward(id: i64, provider: &str) -> Upload {
    create_upload(id, provider).with_upload_type(UploadType::CarriedForward)
}

/// Two processed travis uploads with ids 0 and 1
pub fn travis_pair() -> Vec<Upload> {
    vec![create_upload(0, "travis"), create_upload(1, "travis")]
}

/// A realistic commit: several providers, a provider-less upload, one error,
/// one flag anomaly and one carried-forward upload
pub fn mixed_commit() -> Vec<Upload> {
    vec![
        create_upload(10, "travis").with_flags(["unit"]),
        create_errored_upload(11, "circleci", &["REPORT_EMPTY"]),
        Upload::new(12)
            .with_name("no provider")
            .with_state(UploadState::Complete)
            .with_download_url(report_url(12)),
        create_upload(13, "travis").with_flags(["unit", "integration"]),
        create_carried_forward(14, "github-actions"),
        Upload::new(15).with_state(UploadState::Started),
    ]
}

pub const COMMIT_PAYLOAD: &str = r#"{
  "commit": {
    "uploads": [
      {"id": 0, "name": "first", "state": "PROCESSED", "provider": "travis",
       "flags": ["unit"], "downloadUrl": "https://storage.example.com/v4/raw/0.txt",
       "uploadType": "UPLOADED", "errors": []},
      {"id": 1, "state": "ERROR", "provider": "travis", "buildCode": "build-1",
       "flags": null, "errors": [{"errorCode": "REPORT_EXPIRED"}, null]},
      {"id": 2, "state": "COMPLETE", "provider": null, "uploadType": "CARRIED_FORWARD"}
    ]
  }
}"#;

/// Fetcher answering every URL with its own bytes, except configured failures
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_on(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ReportFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> DownloadResult<Vec<u8>> {
        self.calls.lock().push(url.to_string());
        if self.failing.contains(url) {
            return Err(DownloadError::fetch(url, "simulated failure"));
        }
        Ok(url.as_bytes().to_vec())
    }
}

/// In-memory saver recording every create, save and revoke
#[derive(Debug, Default)]
pub struct RecordingSaver {
    next_id: AtomicUsize,
    fail_saves: bool,
    created: Mutex<Vec<ObjectUrl>>,
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    revoked: Mutex<Vec<ObjectUrl>>,
    bodies: Mutex<Vec<(ObjectUrl, Vec<u8>)>>,
}

impl RecordingSaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `save` call fails
    #[must_use]
    pub fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn created(&self) -> Vec<ObjectUrl> {
        self.created.lock().clone()
    }

    pub fn revoked(&self) -> Vec<ObjectUrl> {
        self.revoked.lock().clone()
    }

    pub fn saved_filenames(&self) -> Vec<String> {
        self.saved.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn saved_body(&self, filename: &str) -> Option<Vec<u8>> {
        self.saved
            .lock()
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, body)| body.clone())
    }
}

#[async_trait]
impl ReportSaver for RecordingSaver {
    async fn create_object(&self, body: Vec<u8>) -> DownloadResult<ObjectUrl> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let object = ObjectUrl::new(format!("blob:test/{id}"));
        self.created.lock().push(object.clone());
        self.bodies.lock().push((object.clone(), body));
        Ok(object)
    }

    async fn save(&self, object: &ObjectUrl, filename: &str) -> DownloadResult<PathBuf> {
        if self.fail_saves {
            return Err(DownloadError::io_error(
                filename,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "simulated"),
            ));
        }
        let body = self
            .bodies
            .lock()
            .iter()
            .find(|(candidate, _)| candidate == object)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| DownloadError::UnknownObject(object.to_string()))?;
        self.saved.lock().push((filename.to_string(), body));
        Ok(PathBuf::from(filename))
    }

    fn revoke(&self, object: &ObjectUrl) {
        self.revoked.lock().push(object.clone());
    }
}
