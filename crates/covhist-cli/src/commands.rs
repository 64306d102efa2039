//! Subcommand handlers

use crate::render::{render_list, render_summary};
use anyhow::{bail, Context};
use chrono::Utc;
use covhist_core::{SelectionEngine, SelectionState, SharedCache, UploadFilters, UploadGroups, UploadsHistory};
use covhist_download::{BatchDownloader, BatchReport, DownloadConfig};
use covhist_model::{parse_uploads, provider::NOT_SPECIFIED_KEY, ProviderKey, Upload};
use serde_json::json;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Read uploads from a file, or stdin for `-`
pub(crate) fn load_uploads(path: &Path) -> anyhow::Result<Vec<Upload>> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading uploads from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading uploads from {}", path.display()))?
    };
    let uploads = parse_uploads(&text).context("parsing uploads payload")?;
    debug!(count = uploads.len(), "loaded uploads");
    Ok(uploads)
}

/// Map a command-line provider key onto a group key
///
/// `none` names the group of uploads without a provider, unless a provider
/// literally called `none` has a group of its own.
pub(crate) fn resolve_provider(groups: &UploadGroups, key: &str) -> ProviderKey {
    let named = ProviderKey::named(key);
    if key == NOT_SPECIFIED_KEY && groups.get(&named).is_none() {
        ProviderKey::NotSpecified
    } else {
        named
    }
}

/// One `--deselect` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Deselection {
    /// Whole provider group
    Group(String),
    /// One member by index within its group
    Upload(String, usize),
}

impl FromStr for Deselection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            bail!("empty --deselect value");
        }
        match s.rsplit_once(':') {
            Some((provider, index)) if !provider.is_empty() => match index.parse::<usize>() {
                Ok(index) => Ok(Self::Upload(provider.to_string(), index)),
                Err(_) => Ok(Self::Group(s.to_string())),
            },
            _ => Ok(Self::Group(s.to_string())),
        }
    }
}

/// Options for `covhist list`
#[derive(Debug, Clone, Default)]
pub(crate) struct ListOptions {
    pub(crate) filters: UploadFilters,
    pub(crate) deselect: Vec<Deselection>,
    pub(crate) json: bool,
}

/// `covhist summary`
pub(crate) fn run_summary(uploads: Vec<Upload>) -> String {
    let history = UploadsHistory::build(uploads, &UploadFilters::new());
    render_summary(&history, Utc::now())
}

/// `covhist list`
pub(crate) fn run_list(uploads: Vec<Upload>, options: &ListOptions) -> anyhow::Result<String> {
    let history = UploadsHistory::build(uploads, &options.filters);
    let groups = &history.grouping.grouped_by_provider;
    let mut engine = SelectionEngine::new(groups, SharedCache::default());

    for deselection in &options.deselect {
        match deselection {
            Deselection::Group(key) => {
                let provider = resolve_provider(groups, key);
                if engine.group_state(&provider)? != SelectionState::NoneSelected {
                    engine.toggle_group(&provider)?;
                }
            }
            Deselection::Upload(key, index) => {
                let provider = resolve_provider(groups, key);
                engine.set_upload_selected(&provider, *index, false)?;
            }
        }
    }

    if options.json {
        let value = json!({
            "history": history,
            "ignoredUploadIds": engine.ignored_upload_ids(),
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }
    Ok(render_list(&history, &engine))
}

/// `covhist download`
pub(crate) async fn run_download(
    uploads: Vec<Upload>,
    provider: &str,
    config: &DownloadConfig,
) -> anyhow::Result<BatchReport> {
    let groups = UploadGroups::from_uploads(uploads);
    let provider = resolve_provider(&groups, provider);
    if groups.get(&provider).is_none() {
        info!(provider = %provider, "no uploads for provider");
    }

    let downloader = BatchDownloader::from_config(config)?;
    Ok(downloader.download_all(Some(&provider), &groups).await)
}
