//! Axum HTTP façade.
//!
//! This crate provides:
//! - Presigned upload/download URL issuance
//! - Playback link create/lookup endpoints
//! - The queue poller, running as an in-process background service
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{PipelineConfig, QueuePoller};
pub use state::AppState;
