//! `earnwatch errors` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use earnwatch_core::event::ErrorEvent;
use earnwatch_ingest::ErrorFeed;

use crate::cli::ErrorsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `errors` command.
pub async fn execute(
    args: ErrorsArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = super::engine_config(config_path, args.log_dir.as_deref()).await?;
    info!(log_dir = %engine.log_dir.display(), "reading error feed");

    let feed = ErrorFeed::new(&engine)?;
    let errors = tokio::task::spawn_blocking(move || feed.errors())
        .await
        .map_err(|e| CliError::Command(format!("error feed task failed: {}", e)))?;

    writer.render(&ErrorList { errors })
}

/// Current error feed. Serialises as a bare JSON array.
#[derive(Serialize)]
#[serde(transparent)]
pub struct ErrorList {
    pub errors: Vec<ErrorEvent>,
}

impl Render for ErrorList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.errors.is_empty() {
            writeln!(w, "Workload failures: {}", "none".green())?;
            return Ok(());
        }

        writeln!(
            w,
            "Workload failures: {}",
            self.errors.len().to_string().red().bold()
        )?;
        for error in &self.errors {
            writeln!(w)?;
            writeln!(w, "  Key:     {}", error.timestamp.key().bold())?;
            writeln!(w, "  Machine: {}", error.machine_name)?;
            for (i, line) in error.message.lines().enumerate() {
                let label = if i == 0 { "  Message:" } else { "          " };
                writeln!(w, "{} {}", label, line.trim())?;
            }
        }

        Ok(())
    }
}
