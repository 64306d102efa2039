//! CLI configuration file

use anyhow::Context;
use covhist_download::DownloadConfig;
use serde::Deserialize;
use std::path::Path;

/// Contents of the `--config` TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub(crate) download: DownloadConfig,
    pub(crate) logging: LoggingConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct LoggingConfig {
    /// Emit JSON log lines
    pub(crate) json: bool,
    /// Filter directive used when `RUST_LOG` is unset
    pub(crate) filter: Option<String>,
}

impl CliConfig {
    /// Load from a file, or defaults when no file is given
    pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn reads_both_tables() {
        let config = CliConfig::parse(
            r#"
            [download]
            output_dir = "reports"
            request_timeout_secs = 10

            [logging]
            json = true
            filter = "covhist_core=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.download.output_dir, PathBuf::from("reports"));
        assert_eq!(config.download.request_timeout_secs, 10);
        assert!(config.download.user_agent.starts_with("covhist/"));
        assert!(config.logging.json);
        assert_eq!(config.logging.filter.as_deref(), Some("covhist_core=debug"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\njson = true").unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert!(config.logging.json);
        assert_eq!(config.download, DownloadConfig::default());
    }

    #[test]
    fn bad_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[download]\nrequest_timeout_secs = \"soon\"").unwrap();

        let err = CliConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("parsing config"));
    }
}
