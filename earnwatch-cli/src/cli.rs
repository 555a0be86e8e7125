//! CLI argument parsing using clap derive API
//!
//! Purely declarative; no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// earnwatch -- Salad earnings, wallet, bandwidth and error telemetry from local logs.
///
/// Use `earnwatch <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "earnwatch", version, about, long_about = None)]
pub struct Cli {
    /// Path to the earnwatch.toml configuration file.
    #[arg(short, long, default_value = "earnwatch.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one scan cycle and print the merged event feed.
    Scan(ScanArgs),

    /// Print the deduplicated, non-dismissed workload failures.
    Errors(ErrorsArgs),

    /// Dismiss a workload failure by its timestamp key.
    Dismiss(DismissArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Log directory to scan (default: `ingest.log_dir` from config).
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

// ---- errors ----

#[derive(Args, Debug)]
pub struct ErrorsArgs {
    /// Log directory to read (default: `ingest.log_dir` from config).
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

// ---- dismiss ----

#[derive(Args, Debug)]
pub struct DismissArgs {
    /// Timestamp key of the error, e.g. "2024-01-01 00:00:00.000 -05:00".
    pub key: String,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, ingest, server, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_with_log_dir() {
        let cli = Cli::try_parse_from(["earnwatch", "scan", "--log-dir", "/srv/logs"])
            .expect("scan should parse");
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.log_dir, Some(PathBuf::from("/srv/logs")));
            }
            other => panic!("expected scan, got {:?}", other),
        }
        assert_eq!(cli.config, PathBuf::from("earnwatch.toml"));
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_parse_global_output_after_subcommand() {
        let cli = Cli::try_parse_from(["earnwatch", "errors", "--output", "json"])
            .expect("global flag should parse after subcommand");
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Errors(_)));
    }

    #[test]
    fn test_parse_dismiss_requires_key() {
        assert!(Cli::try_parse_from(["earnwatch", "dismiss"]).is_err());

        let cli = Cli::try_parse_from(["earnwatch", "dismiss", "2024-01-01 00:00:00.000 -05:00"])
            .expect("dismiss should parse");
        match cli.command {
            Commands::Dismiss(args) => assert_eq!(args.key, "2024-01-01 00:00:00.000 -05:00"),
            other => panic!("expected dismiss, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_show_section() {
        let cli = Cli::try_parse_from(["earnwatch", "config", "show", "--section", "ingest"])
            .expect("config show should parse");
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => assert_eq!(section.as_deref(), Some("ingest")),
            other => panic!("expected config show, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_output_format() {
        assert!(Cli::try_parse_from(["earnwatch", "--output", "yaml", "scan"]).is_err());
    }
}
