//! Prometheus exporter for the ingestion metrics.
//!
//! The recorder carries explicit buckets for the scan-duration histogram;
//! every other histogram would otherwise be exported as a summary.
//!
//! ```ignore
//! install_metrics_recorder(&config.metrics)?;
//! // every earnwatch_* counter, gauge and histogram is now scraped
//! ```

use std::net::SocketAddr;

use anyhow::Result;
use earnwatch_core::config::MetricsConfig;
use earnwatch_core::metrics as m;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

/// Recorder builder with the earnwatch histogram buckets applied.
pub fn recorder_builder() -> Result<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(m::INGEST_SCAN_DURATION_SECONDS.to_owned()),
            &m::SCAN_DURATION_BUCKETS,
        )
        .map_err(|e| anyhow::anyhow!("invalid scan duration buckets: {}", e))
}

/// Resolve the scrape listener address from `[metrics]`.
pub fn listen_addr(config: &MetricsConfig) -> Result<SocketAddr> {
    if config.endpoint != "/metrics" {
        return Err(anyhow::anyhow!(
            "unsupported metrics endpoint '{}': only '/metrics' is served",
            config.endpoint
        ));
    }
    format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address: {}", e))
}

/// Install the global recorder and start the scrape listener.
///
/// Call once per process; a second call fails because the global recorder
/// is already set.
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr = listen_addr(config)?;
    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces"
        );
    }

    recorder_builder()?
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    m::describe_all();
    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}
