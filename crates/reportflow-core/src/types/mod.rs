//! Core type definitions used across the ReportFlow workspace.

pub mod id;

pub use id::{JobId, JobLogId, ProjectId, SubscriberId};
