//! `earnwatch dismiss` command handler

use std::io::Write;
use std::path::Path;

use tracing::info;

use earnwatch_ingest::{DismissAck, ErrorFeed};

use crate::cli::DismissArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `dismiss` command.
///
/// Dismissals only survive the process when `ingest.persist_state` is enabled.
pub async fn execute(
    args: DismissArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = super::engine_config(config_path, None).await?;
    if engine.state_dir.is_none() {
        tracing::warn!("persist_state is disabled; dismissal will not outlive this process");
    }

    let feed = ErrorFeed::new(&engine)?;
    let ack = feed.dismiss(&args.key)?;
    info!(key = %ack.key, newly_dismissed = ack.newly_dismissed, "dismiss complete");

    writer.render(&ack)
}

impl Render for DismissAck {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.newly_dismissed {
            writeln!(w, "{} {}", "Dismissed:".green().bold(), self.key)
        } else {
            writeln!(w, "{} {}", "Already dismissed:".yellow(), self.key)
        }
    }
}
