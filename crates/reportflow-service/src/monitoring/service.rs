//! Structured monitoring log for jobs.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use reportflow_core::result::AppResult;
use reportflow_core::types::JobId;
use reportflow_database::store::JobLogStore;
use reportflow_entity::job::{JobInformation, JobLog, JobLogStatus};

/// Writes and reads a job's monitoring entries.
#[derive(Debug, Clone)]
pub struct MonitoringService {
    logs: Arc<dyn JobLogStore>,
}

impl MonitoringService {
    /// Creates a new monitoring service.
    pub fn new(logs: Arc<dyn JobLogStore>) -> Self {
        Self { logs }
    }

    /// Record an entry without extra data.
    pub async fn log(
        &self,
        job: &JobInformation,
        status: JobLogStatus,
        message: impl Into<String>,
    ) -> AppResult<JobLog> {
        self.log_with_data(job, status, message, HashMap::new()).await
    }

    /// Record an entry carrying key/value data.
    pub async fn log_with_data(
        &self,
        job: &JobInformation,
        status: JobLogStatus,
        message: impl Into<String>,
        data: HashMap<String, String>,
    ) -> AppResult<JobLog> {
        let entry = data
            .into_iter()
            .fold(job.log_entry(status, message), |entry, (k, v)| entry.with_data(k, v));

        let log = self.logs.append(entry).await?;
        info!(
            job_id = %job.id,
            group = job.group(),
            status = %log.status,
            message = %log.message,
            "Job event"
        );
        Ok(log)
    }

    /// All entries for a job, oldest first.
    pub async fn get_logs(&self, job_id: JobId) -> AppResult<Vec<JobLog>> {
        self.logs.find_by_job(job_id).await
    }
}
