//! earnwatch daemon library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `earnwatch-daemon` is used as a binary (main.rs).

pub mod cli;
pub mod error;
pub mod logging;
pub mod metrics_server;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{app, router};
pub use state::AppState;
