//! Monitoring log entries recorded against a job.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reportflow_core::types::{JobId, JobLogId};

use super::status::JobLogStatus;

/// A persisted monitoring entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobLog {
    /// Entry identifier.
    pub id: JobLogId,
    /// Job the entry belongs to.
    pub job_id: JobId,
    /// What happened.
    pub status: JobLogStatus,
    /// Free-form description.
    pub message: String,
    /// Extra key/value data, e.g. `reportUrl` on success.
    #[sqlx(json)]
    pub data: HashMap<String, String>,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
}

/// An entry waiting to be written.
///
/// Built through [`JobInformation::log_entry`](super::JobInformation::log_entry)
/// so every entry is tied to an existing job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobLog {
    job_id: JobId,
    status: JobLogStatus,
    message: String,
    data: HashMap<String, String>,
}

impl NewJobLog {
    pub(crate) fn new(
        job_id: JobId,
        status: JobLogStatus,
        message: String,
        data: HashMap<String, String>,
    ) -> Self {
        Self {
            job_id,
            status,
            message,
            data,
        }
    }

    /// Attach one data entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Owning job.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Entry status.
    pub fn status(&self) -> JobLogStatus {
        self.status
    }

    /// Entry message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Entry data.
    pub fn data(&self) -> &HashMap<String, String> {
        &self.data
    }

    /// Stamp the entry with an id and the current time.
    pub fn into_log(self) -> JobLog {
        JobLog {
            id: JobLogId::new(),
            job_id: self.job_id,
            status: self.status,
            message: self.message,
            data: self.data,
            timestamp: Utc::now(),
        }
    }
}
