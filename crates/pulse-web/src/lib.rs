//! HTTP API for Pulse.
//!
//! Thin axum layer over [`pulse_engine::AnalyticsEngine`]: JSON in, JSON
//! out, with the engine's error taxonomy mapped onto status codes.

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{AppState, create_router};
