//! CRUD façade over the job information store.

use std::sync::Arc;

use tracing::debug;

use reportflow_core::error::AppError;
use reportflow_core::result::AppResult;
use reportflow_core::types::JobId;
use reportflow_database::store::JobInformationStore;
use reportflow_entity::job::{JobInformation, JobKind, JobStatus};

/// Reads and writes job information. Every read skips retired jobs unless
/// the method name says otherwise.
///
/// This is the only component that moves `remaining_fire_count`.
#[derive(Debug, Clone)]
pub struct JobInformationService {
    store: Arc<dyn JobInformationStore>,
}

impl JobInformationService {
    /// Creates a new job information service.
    pub fn new(store: Arc<dyn JobInformationStore>) -> Self {
        Self { store }
    }

    /// Persist a new job.
    pub async fn save_job_information(&self, job: &JobInformation) -> AppResult<JobInformation> {
        let saved = self.store.insert(job).await?;
        debug!(job_id = %saved.id, job_type = %saved.job_type, "Saved job information");
        Ok(saved)
    }

    /// Load an active job or fail with not-found.
    pub async fn get_job_information(&self, id: JobId) -> AppResult<JobInformation> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))
    }

    /// Load a job even if it has been deleted.
    pub async fn get_job_information_including_inactive(
        &self,
        id: JobId,
    ) -> AppResult<JobInformation> {
        self.store
            .find_including_inactive(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))
    }

    /// Every active job.
    pub async fn get_all_job_information(&self) -> AppResult<Vec<JobInformation>> {
        self.store.find_all().await
    }

    /// Every active job of one family.
    pub async fn get_all_job_information_of_kind(
        &self,
        kind: JobKind,
    ) -> AppResult<Vec<JobInformation>> {
        self.store.find_by_kind(kind).await
    }

    /// Overwrite a job's configuration and status.
    pub async fn update_job_information(&self, job: &JobInformation) -> AppResult<JobInformation> {
        self.store.update(job).await
    }

    /// Set a job's lifecycle status.
    pub async fn update_status(&self, id: JobId, status: JobStatus) -> AppResult<()> {
        self.store.update_status(id, status).await?;
        debug!(job_id = %id, status = %status, "Updated job status");
        Ok(())
    }

    /// Soft-delete a job.
    pub async fn delete_job_information(&self, id: JobId) -> AppResult<()> {
        if self.store.soft_delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Job {id} not found")))
        }
    }

    /// Consume one firing. `None` means nothing was left to consume.
    pub async fn decrement_remaining_fire_count(&self, id: JobId) -> AppResult<Option<i32>> {
        let remaining = self.store.decrement_remaining_fire_count(id).await?;
        debug!(job_id = %id, remaining = ?remaining, "Decremented remaining fire count");
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use reportflow_core::types::SubscriberId;
    use reportflow_database::memory::MemoryJobInformationStore;
    use reportflow_entity::job::{ReportPayload, ReportPeriod, TriggerSpec};

    use super::*;

    fn service() -> JobInformationService {
        JobInformationService::new(Arc::new(MemoryJobInformationStore::new()))
    }

    fn job() -> JobInformation {
        JobInformation::new(
            SubscriberId::new(),
            "monthly",
            TriggerSpec {
                total_fire_count: 2,
                repeat_interval_ms: 60_000,
                ..TriggerSpec::default()
            },
            ReportPayload::PersonalReport {
                period: ReportPeriod {
                    from: NaiveDate::from_ymd_opt(2026, 5, 1).expect("date"),
                    to: NaiveDate::from_ymd_opt(2026, 5, 31).expect("date"),
                },
                email: None,
            },
        )
    }

    #[tokio::test]
    async fn test_get_is_stable_without_mutation() {
        let service = service();
        let job = service.save_job_information(&job()).await.expect("save");

        let first = service.get_job_information(job.id).await.expect("get");
        let second = service.get_job_information(job.id).await.expect("get");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_deleted_job_is_not_found() {
        let service = service();
        let job = service.save_job_information(&job()).await.expect("save");

        service.delete_job_information(job.id).await.expect("delete");
        assert!(service.get_job_information(job.id).await.unwrap_err().is_not_found());
        assert!(service.delete_job_information(job.id).await.unwrap_err().is_not_found());
        assert!(service.get_all_job_information().await.expect("all").is_empty());

        let retired = service
            .get_job_information_including_inactive(job.id)
            .await
            .expect("retired row");
        assert!(!retired.active);
    }

    #[tokio::test]
    async fn test_kind_filter() {
        let service = service();
        service.save_job_information(&job()).await.expect("save");

        assert_eq!(
            service
                .get_all_job_information_of_kind(JobKind::PersonalReport)
                .await
                .expect("list")
                .len(),
            1
        );
        assert!(
            service
                .get_all_job_information_of_kind(JobKind::ProjectReport)
                .await
                .expect("list")
                .is_empty()
        );
    }
}
