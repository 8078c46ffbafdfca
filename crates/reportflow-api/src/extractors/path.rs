//! Typed path parameter helpers.

use std::str::FromStr;

use reportflow_core::error::AppError;
use reportflow_core::types::JobId;

/// Parses a job id from a path segment.
pub fn parse_job_id(s: &str) -> Result<JobId, AppError> {
    JobId::from_str(s).map_err(|_| AppError::validation(format!("Invalid job id: {s}")))
}
