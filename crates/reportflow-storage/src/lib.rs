//! # reportflow-storage
//!
//! Artifact storage for rendered reports.

pub mod providers;

pub use providers::LocalStorageProvider;
