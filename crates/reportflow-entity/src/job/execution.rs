//! Outcome of a single report execution.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reportflow_core::types::JobId;

/// Whether an execution produced its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// The report was rendered and stored.
    Success,
    /// Rendering or storing failed.
    Failed,
}

/// Result handed back by the executor once a firing finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionDetails {
    /// Job that fired.
    pub job_id: JobId,
    /// Success or failure.
    pub status: ExecutionStatus,
    /// Where the artifact can be fetched, on success.
    pub report_url: Option<String>,
    /// Failure cause, on failure.
    pub cause: Option<String>,
    /// Extra data to carry into the monitoring log.
    pub data: HashMap<String, String>,
    /// When execution began.
    pub started_at: DateTime<Utc>,
    /// When execution ended.
    pub finished_at: DateTime<Utc>,
}

impl JobExecutionDetails {
    /// A successful execution that produced `report_url`.
    pub fn succeeded(job_id: JobId, started_at: DateTime<Utc>, report_url: String) -> Self {
        let mut data = HashMap::new();
        data.insert("reportUrl".to_string(), report_url.clone());
        Self {
            job_id,
            status: ExecutionStatus::Success,
            report_url: Some(report_url),
            cause: None,
            data,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// A failed execution.
    pub fn failed(job_id: JobId, started_at: DateTime<Utc>, cause: impl Into<String>) -> Self {
        Self {
            job_id,
            status: ExecutionStatus::Failed,
            report_url: None,
            cause: Some(cause.into()),
            data: HashMap::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Whether the execution succeeded.
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// Wall-clock duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
