//! Job family orchestration.

pub mod report;

pub use report::{EXECUTION_FAILED_PREFIX, RecoveryReport, ReportJobService};
