//! Timing engine errors.

use tokio_cron_scheduler::JobSchedulerError;

use reportflow_core::error::AppError;

use crate::engine::JobKey;

/// Failure reported by a timing engine or the scheduler service.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// No job is registered under the key.
    #[error("Job {0} not found in scheduler")]
    JobNotFound(JobKey),

    /// A job is already registered under the key.
    #[error("Job {0} is already scheduled")]
    JobAlreadyExists(JobKey),

    /// The engine refused to pause the job.
    #[error("Failed to pause job {key}: {reason}")]
    JobPausing {
        /// Job being paused.
        key: JobKey,
        /// Engine's explanation.
        reason: String,
    },

    /// The engine refused to resume the job.
    #[error("Failed to resume job {key}: {reason}")]
    JobResuming {
        /// Job being resumed.
        key: JobKey,
        /// Engine's explanation.
        reason: String,
    },

    /// The job's schedule fields cannot be turned into a schedule.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Any other engine failure.
    #[error("Timing engine error: {0}")]
    Engine(String),
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        Self::Engine(err.to_string())
    }
}

impl From<SchedulerError> for AppError {
    fn from(err: SchedulerError) -> Self {
        let message = err.to_string();
        match err {
            SchedulerError::JobNotFound(_) => AppError::not_found(message),
            SchedulerError::JobAlreadyExists(_) => AppError::conflict(message),
            SchedulerError::InvalidSchedule(_) => AppError::validation(message),
            SchedulerError::JobPausing { .. }
            | SchedulerError::JobResuming { .. }
            | SchedulerError::Engine(_) => AppError::scheduling(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use reportflow_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_error_kinds() {
        let key = JobKey::new("42", "personal-report-jobs");
        assert_eq!(
            AppError::from(SchedulerError::JobNotFound(key.clone())).kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            AppError::from(SchedulerError::JobAlreadyExists(key.clone())).kind,
            ErrorKind::Conflict
        );
        let pausing = AppError::from(SchedulerError::JobPausing {
            key,
            reason: "gone".into(),
        });
        assert_eq!(pausing.kind, ErrorKind::Scheduling);
        assert_eq!(
            pausing.message,
            "Failed to pause job personal-report-jobs.42: gone"
        );
    }
}
