//! # reportflow-api
//!
//! HTTP API layer for ReportFlow built on Axum.
//!
//! Exposes the personal and project report job lifecycle, their monitoring
//! logs and a health probe, with request validation and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
