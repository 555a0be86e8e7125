//! CLI argument definitions for earnwatch-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// earnwatch telemetry daemon.
///
/// Serves the merged earnings/wallet/bandwidth event feed and the
/// workload failure feed over HTTP.
#[derive(Parser, Debug)]
#[command(name = "earnwatch-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to earnwatch.toml configuration file.
    ///
    /// Defaults are used when the file does not exist.
    #[arg(short, long, default_value = "earnwatch.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the log directory to ingest.
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Override the HTTP bind address (e.g. 0.0.0.0:8000).
    #[arg(long)]
    pub bind: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let cli = DaemonCli::try_parse_from(["earnwatch-daemon"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("earnwatch.toml"));
        assert!(!cli.validate);
        assert!(cli.bind.is_none());
    }

    #[test]
    fn overrides_parse() {
        let cli = DaemonCli::try_parse_from([
            "earnwatch-daemon",
            "--config",
            "/etc/earnwatch/earnwatch.toml",
            "--log-level",
            "debug",
            "--log-dir",
            "/srv/salad/logs",
            "--bind",
            "0.0.0.0:8000",
            "--validate",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_dir.as_deref(), Some("/srv/salad/logs"));
        assert_eq!(cli.bind.as_deref(), Some("0.0.0.0:8000"));
        assert!(cli.validate);
    }
}
