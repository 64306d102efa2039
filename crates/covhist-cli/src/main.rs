//! `covhist`: coverage reports history for one commit
//!
//! Reads a commit's uploads as JSON and prints the history panel: overview,
//! provider groups, error notices, filtered and searched lists, selection
//! state, and batch report downloads.

mod cli;
mod commands;
mod config;
mod render;

use anyhow::Context;
use clap::ArgMatches;
use commands::{Deselection, ListOptions};
use config::CliConfig;
use covhist_core::UploadFilters;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool, default_directive: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive.unwrap_or("info")));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn input_path(args: &ArgMatches) -> &Path {
    args.get_one::<PathBuf>("input")
        .map_or(Path::new("-"), PathBuf::as_path)
}

fn list_options(args: &ArgMatches) -> anyhow::Result<ListOptions> {
    let mut filters = UploadFilters::new()
        .with_upload_errors(args.get_flag("errors"))
        .with_flag_errors(args.get_flag("flag-errors"));
    if let Some(term) = args.get_one::<String>("search") {
        filters = filters.with_search_term(term.clone());
    }

    let deselect = args
        .get_many::<String>("deselect")
        .into_iter()
        .flatten()
        .map(|raw| raw.parse::<Deselection>())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(ListOptions {
        filters,
        deselect,
        json: args.get_flag("json"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = cli::build_cli().get_matches();

    let mut config = CliConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if matches.get_flag("json-logs") {
        config.logging.json = true;
    }
    init_tracing(config.logging.json, config.logging.filter.as_deref());

    match matches.subcommand() {
        Some(("summary", args)) => {
            let uploads = commands::load_uploads(input_path(args))?;
            print!("{}", commands::run_summary(uploads));
        }
        Some(("list", args)) => {
            let options = list_options(args)?;
            let uploads = commands::load_uploads(input_path(args))?;
            println!("{}", commands::run_list(uploads, &options)?.trim_end());
        }
        Some(("download", args)) => {
            let provider = args
                .get_one::<String>("provider")
                .context("--provider is required")?;
            if let Some(dir) = args.get_one::<PathBuf>("output-dir") {
                config.download.output_dir = dir.clone();
            }
            if let Some(secs) = args.get_one::<u64>("timeout") {
                config.download.request_timeout_secs = *secs;
            }

            let uploads = commands::load_uploads(input_path(args))?;
            let report = commands::run_download(uploads, provider, &config.download).await?;

            for path in &report.saved {
                println!("saved {}", path.display());
            }
            println!(
                "{} of {} report(s) saved, {} failed",
                report.saved.len(),
                report.attempted,
                report.failed
            );
            if !report.is_complete() {
                warn!(failed = report.failed, "some reports could not be downloaded");
                return Ok(ExitCode::FAILURE);
            }
            info!(output_dir = %config.download.output_dir.display(), "downloads complete");
        }
        Some((other, _)) => anyhow::bail!("unknown subcommand: {other}"),
        None => anyhow::bail!("no subcommand given"),
    }

    Ok(ExitCode::SUCCESS)
}
