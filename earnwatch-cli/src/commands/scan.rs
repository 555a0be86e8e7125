//! `earnwatch scan` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use earnwatch_core::event::Event;
use earnwatch_ingest::{IngestCoordinator, ScanReport};

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = super::engine_config(config_path, args.log_dir.as_deref()).await?;
    info!(log_dir = %engine.log_dir.display(), "starting one-shot scan");

    let coordinator = IngestCoordinator::new(engine)?;
    let report = tokio::task::spawn_blocking(move || coordinator.scan())
        .await
        .map_err(|e| CliError::Command(format!("scan task failed: {}", e)))?;

    writer.render(&EventTable::from(report))
}

/// Scan output: the merged event feed plus cycle counters for text mode.
///
/// Serialises as a bare JSON array of events.
#[derive(Serialize)]
#[serde(transparent)]
pub struct EventTable {
    pub events: Vec<Event>,
    #[serde(skip)]
    pub new_events: usize,
    #[serde(skip)]
    pub files_scanned: usize,
    #[serde(skip)]
    pub files_failed: usize,
}

impl From<ScanReport> for EventTable {
    fn from(report: ScanReport) -> Self {
        Self {
            events: report.events,
            new_events: report.new_events,
            files_scanned: report.files_scanned,
            files_failed: report.files_failed,
        }
    }
}

impl Render for EventTable {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Events: {} ({} new, {} files scanned, {} failed)",
            self.events.len().to_string().bold(),
            self.new_events,
            self.files_scanned,
            self.files_failed
        )?;

        if self.events.is_empty() {
            return Ok(());
        }

        writeln!(w)?;
        writeln!(w, "{:<31} {:<10} DETAIL", "TIMESTAMP", "KIND")?;
        writeln!(w, "{}", "-".repeat(72))?;

        for event in &self.events {
            let kind = event.kind().as_str();
            let kind_colored = match event {
                Event::Earnings(_) => kind.green(),
                Event::Wallet(_) => kind.cyan(),
                Event::Bandwidth(_) => kind.blue(),
                Event::Error(_) => kind.red(),
            };
            writeln!(
                w,
                "{:<31} {:<10} {}",
                event.timestamp().to_string(),
                kind_colored,
                detail(event)
            )?;
        }

        Ok(())
    }
}

fn detail(event: &Event) -> String {
    match event {
        Event::Earnings(e) => format!("{} from {}", e.earnings, e.container_id),
        Event::Wallet(e) => format!(
            "current {} predicted {}",
            e.current_balance, e.predicted_balance
        ),
        Event::Bandwidth(e) => format!("{:.3} MB/s", e.throughput_mbps),
        Event::Error(e) => format!("{}: {}", e.machine_name, e.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earnwatch_core::event::{BandwidthEvent, EarningsEvent, ErrorEvent, Timestamp};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).expect("valid timestamp")
    }

    fn table(events: Vec<Event>) -> EventTable {
        EventTable {
            new_events: events.len(),
            events,
            files_scanned: 1,
            files_failed: 0,
        }
    }

    #[test]
    fn test_event_table_serializes_as_array() {
        let table = table(vec![Event::Earnings(EarningsEvent {
            timestamp: ts("2024-01-01 00:00:00.000 -05:00"),
            earnings: 1.5,
            container_id: "abc".to_owned(),
        })]);

        let json = serde_json::to_value(&table).expect("serialize");
        let events = json.as_array().expect("bare array");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["kind"], "earnings");
        assert_eq!(events[0]["containerId"], "abc");
    }

    #[test]
    fn test_event_table_render_text_rows() {
        let table = table(vec![
            Event::Bandwidth(BandwidthEvent {
                timestamp: ts("2024-01-01 00:00:00.000 -05:00"),
                throughput_mbps: 0.9333,
            }),
            Event::Error(ErrorEvent {
                timestamp: ts("2024-01-01 00:00:01.000 -05:00"),
                machine_name: "rig-1".to_owned(),
                message: "driver mismatch".to_owned(),
            }),
        ]);

        let mut buffer = Vec::new();
        table.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");

        assert!(output.contains("TIMESTAMP"));
        assert!(output.contains("2024-01-01 00:00:00.000 -05:00"));
        assert!(output.contains("0.933 MB/s"));
        assert!(output.contains("rig-1: driver mismatch"));
    }

    #[test]
    fn test_event_table_render_text_empty() {
        let mut buffer = Vec::new();
        table(Vec::new()).render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Events:"));
        assert!(!output.contains("TIMESTAMP"), "no header without rows");
    }
}
