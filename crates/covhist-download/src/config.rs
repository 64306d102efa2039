//! Download configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for fetching and saving reports
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory saved reports land in
    pub output_dir: PathBuf,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl DownloadConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With user agent
    #[inline]
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            request_timeout_secs: 30,
            user_agent: format!("covhist/{}", crate::VERSION),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DownloadConfig::new();
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("covhist/"));
    }

    #[test]
    fn builders() {
        let config = DownloadConfig::new()
            .with_output_dir("reports")
            .with_timeout_secs(5)
            .with_user_agent("ci-bot");
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.user_agent, "ci-bot");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: DownloadConfig = toml::from_str("output_dir = \"out\"").unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.request_timeout_secs, 30);
    }
}
