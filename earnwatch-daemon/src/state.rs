//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use earnwatch_core::config::EarnwatchConfig;
use earnwatch_ingest::{EngineConfig, ErrorFeed, IngestCoordinator, IngestError};

/// State shared by every request handler.
///
/// The coordinator and feed serialize their own mutations internally,
/// so cloning the `Arc`s is all a handler needs.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<IngestCoordinator>,
    pub feed: Arc<ErrorFeed>,
    /// Directory holding `index.html`, if the dashboard is served.
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    /// Build the ingest engine from the loaded configuration.
    ///
    /// Persisted cursor caches and dismissals are loaded here; unreadable
    /// state files fall back to an empty store.
    pub fn new(config: &EarnwatchConfig) -> Result<Self, IngestError> {
        let engine = EngineConfig::from_core(config);
        let feed = ErrorFeed::new(&engine)?;
        let coordinator = IngestCoordinator::new(engine)?;

        Ok(Self {
            coordinator: Arc::new(coordinator),
            feed: Arc::new(feed),
            static_dir: config.server.static_dir.as_ref().map(PathBuf::from),
        })
    }
}
