//! # reportflow-core
//!
//! Core crate for ReportFlow: configuration schemas, typed identifiers,
//! collaborator traits and the unified error type.
//!
//! This crate has **no** internal dependencies on other ReportFlow crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
