//! Command-line definition

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn input_arg() -> Arg {
    Arg::new("input")
        .long("input")
        .short('i')
        .default_value("-")
        .value_parser(value_parser!(PathBuf))
        .help("Uploads JSON (array or commit payload); '-' reads stdin")
}

pub(crate) fn build_cli() -> Command {
    Command::new("covhist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Coverage reports history for a commit")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("summary")
                .about("Overview sentence, provider groups and per-upload notices")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("list")
                .about("Main uploads list with selection state")
                .arg(input_arg())
                .arg(
                    Arg::new("errors")
                        .long("errors")
                        .action(ArgAction::SetTrue)
                        .help("Show only errored uploads"),
                )
                .arg(
                    Arg::new("flag-errors")
                        .long("flag-errors")
                        .action(ArgAction::SetTrue)
                        .help("Show only uploads with multiple flags"),
                )
                .arg(
                    Arg::new("search")
                        .long("search")
                        .help("Case-insensitive search over names and flags"),
                )
                .arg(
                    Arg::new("deselect")
                        .long("deselect")
                        .action(ArgAction::Append)
                        .value_name("PROVIDER[:INDEX]")
                        .help("Deselect a whole provider group or one of its uploads"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("download")
                .about("Download every raw report of one provider group")
                .arg(input_arg())
                .arg(
                    Arg::new("provider")
                        .long("provider")
                        .short('p')
                        .required(true)
                        .help("Provider group key ('none' for uploads without a provider)"),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory to save reports into"),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_parser(value_parser!(u64))
                        .help("Per-request timeout in seconds"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn list_collects_repeated_deselects() {
        let matches = build_cli()
            .try_get_matches_from([
                "covhist", "list", "--deselect", "travis", "--deselect", "circleci:1", "--errors",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "list");
        let deselects: Vec<&String> = args.get_many::<String>("deselect").unwrap().collect();
        assert_eq!(deselects, ["travis", "circleci:1"]);
        assert!(args.get_flag("errors"));
        assert!(!args.get_flag("flag-errors"));
    }

    #[test]
    fn download_requires_provider() {
        assert!(build_cli().try_get_matches_from(["covhist", "download"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["covhist", "summary", "--json-logs", "-i", "uploads.json"])
            .unwrap();
        assert!(matches.get_flag("json-logs"));
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(
            args.get_one::<PathBuf>("input"),
            Some(&PathBuf::from("uploads.json"))
        );
    }
}
