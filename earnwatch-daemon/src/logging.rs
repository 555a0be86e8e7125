//! Logging setup for earnwatch-daemon.
//!
//! The subscriber is driven by `[general]`; once it is installed,
//! [`log_startup`] records where the daemon reads logs and keeps state.

use std::str::FromStr;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use earnwatch_core::config::{EarnwatchConfig, GeneralConfig};

/// Output format of the daemon's log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers.
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                other
            )),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once, before the first scan. `RUST_LOG` wins over `log_level`.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let format: LogFormat = config.log_format.parse()?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to initialize {:?} log output: {}", format, e))
}

/// Log the ingestion context the daemon runs with.
///
/// State location matters when `persist_state` is on; a reset at startup is
/// called out separately because it discards every cached cursor.
pub fn log_startup(config: &EarnwatchConfig) {
    let ingest = &config.ingest;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_dir = %ingest.log_dir,
        data_dir = %config.general.data_dir,
        persist_state = ingest.persist_state,
        general_window = ingest.general_window,
        bandwidth_window = ingest.bandwidth_window,
        error_window = ingest.error_window,
        "earnwatch-daemon starting"
    );
    if ingest.reset_state_on_start {
        tracing::warn!(
            data_dir = %config.general.data_dir,
            "reset_state_on_start is set; cached cursors will be cleared"
        );
    }
    if !ingest.persist_state {
        tracing::info!("persist_state is off; cursors live in memory only");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_known_names() {
        assert_eq!("json".parse::<LogFormat>().ok(), Some(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>().ok(), Some(LogFormat::Pretty));
    }

    #[test]
    fn log_format_is_case_sensitive() {
        assert!("JSON".parse::<LogFormat>().is_err());
    }

    #[test]
    fn unknown_format_is_rejected_before_install() {
        let config = GeneralConfig {
            log_format: "xml".to_owned(),
            ..GeneralConfig::default()
        };
        let err = init_tracing(&config).expect_err("xml is not a log format");
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn startup_log_without_subscriber_is_silent() {
        let mut config = EarnwatchConfig::default();
        config.ingest.reset_state_on_start = true;
        config.ingest.persist_state = false;
        log_startup(&config);
    }
}
