use anyhow::{Context, Result};
use clap::Parser;

use earnwatch_core::config::EarnwatchConfig;
use earnwatch_daemon::cli::DaemonCli;
use earnwatch_daemon::{AppState, app, logging, metrics_server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let mut config = EarnwatchConfig::load_or_default(&cli.config)
        .await
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    // CLI 인자가 설정 파일과 환경변수보다 우선
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    if let Some(log_dir) = cli.log_dir {
        config.ingest.log_dir = log_dir;
    }
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }
    config.validate().context("invalid configuration")?;

    if cli.validate {
        println!("configuration is valid: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;

    logging::log_startup(&config);

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let state = AppState::new(&config)
        .map_err(|e| anyhow::anyhow!("failed to build ingest engine: {}", e))?;
    let app = app(state, &config.server);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("earnwatch-daemon shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
