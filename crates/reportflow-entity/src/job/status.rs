//! Job and job-log status enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Registered with the engine and firing.
    Running,
    /// A count-bounded job used up all of its firings.
    Completed,
    /// Scheduling failed.
    Failed,
    /// Cancelled before it ever fired.
    Cancelled,
    /// Waiting on an initial offset.
    Delayed,
    /// Persisted but not yet registered with the engine.
    Created,
    /// Paused by the subscriber.
    Stopped,
    /// Resumed after a stop.
    Restarted,
}

impl JobStatus {
    /// Whether a job in this status should be armed in the engine after a
    /// process restart.
    pub fn is_schedulable(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::Running | Self::Delayed | Self::Restarted
        )
    }

    /// Whether the job will never fire again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Return the status as an upper-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Delayed => "DELAYED",
            Self::Created => "CREATED",
            Self::Stopped => "STOPPED",
            Self::Restarted => "RESTARTED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status recorded on a monitoring log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_log_status", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobLogStatus {
    /// A firing began executing.
    Started,
    /// The job used up its firings.
    Finished,
    /// The job was paused.
    Stopped,
    /// A firing produced its report.
    Success,
    /// A firing failed.
    Error,
    /// Something degraded but the firing went on.
    Warning,
    /// The job was created and scheduled.
    Created,
    /// The job was resumed.
    Restarted,
    /// The job was retired.
    Deleted,
}

impl JobLogStatus {
    /// Return the status as an upper-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Finished => "FINISHED",
            Self::Stopped => "STOPPED",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Created => "CREATED",
            Self::Restarted => "RESTARTED",
            Self::Deleted => "DELETED",
        }
    }

    /// Whether the entry records what happened inside a firing.
    pub fn is_execution_event(&self) -> bool {
        matches!(self, Self::Started | Self::Success | Self::Error)
    }
}

impl fmt::Display for JobLogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
