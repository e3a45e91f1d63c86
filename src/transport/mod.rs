//! Optional axum surface over the orchestrator.

pub mod errors;
pub mod http;
