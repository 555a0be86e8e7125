//! Command handlers -- one module per subcommand

pub mod config;
pub mod dismiss;
pub mod errors;
pub mod scan;

use std::path::Path;

use earnwatch_core::config::EarnwatchConfig;
use earnwatch_ingest::EngineConfig;

use crate::error::CliError;

/// Load the effective configuration and derive the engine settings.
///
/// A missing config file falls back to defaults so one-shot commands work
/// without any setup. `log_dir` overrides `ingest.log_dir` when given.
pub(crate) async fn engine_config(
    config_path: &Path,
    log_dir: Option<&Path>,
) -> Result<EngineConfig, CliError> {
    let config = EarnwatchConfig::load_or_default(config_path).await?;
    let mut engine = EngineConfig::from_core(&config);
    if let Some(dir) = log_dir {
        engine.log_dir = dir.to_path_buf();
    }
    engine.validate()?;
    Ok(engine)
}
