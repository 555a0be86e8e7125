//! `earnwatch config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use earnwatch_core::config::EarnwatchConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
pub const SECTIONS: [&str; 4] = ["general", "ingest", "server", "metrics"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
///
/// Unlike the scan commands, a missing file is a validation failure here.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = validation_report(config_path, EarnwatchConfig::load(config_path).await);
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = EarnwatchConfig::load_or_default(config_path).await?;
    let report = build_report(&config, config_path, section)?;
    writer.render(&report)
}

fn validation_report(
    config_path: &Path,
    result: Result<EarnwatchConfig, earnwatch_core::error::EarnwatchError>,
) -> ConfigValidationReport {
    let source = config_path.display().to_string();
    match result {
        Ok(_) => ConfigValidationReport {
            source,
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source,
            valid: false,
            errors: vec![e.to_string()],
        },
    }
}

/// Serialise the whole configuration or a single section to TOML.
pub fn build_report(
    config: &EarnwatchConfig,
    config_path: &Path,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section.as_deref() {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("ingest") => toml::to_string_pretty(&config.ingest),
        Some("server") => toml::to_string_pretty(&config.server),
        Some("metrics") => toml::to_string_pretty(&config.metrics),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    }
    .map_err(|e| CliError::Config(format!("failed to serialize configuration: {}", e)))?;

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section,
        config_toml,
    })
}

/// Effective configuration, whole or one section.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Section name (None = full config)
    pub section: Option<String>,
    /// Serialized TOML configuration
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation result.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
