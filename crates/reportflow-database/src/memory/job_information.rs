//! In-memory job information store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use reportflow_core::error::AppError;
use reportflow_core::result::AppResult;
use reportflow_core::types::JobId;
use reportflow_entity::job::{JobInformation, JobKind, JobStatus};

use crate::store::JobInformationStore;

/// Job store kept in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryJobInformationStore {
    jobs: DashMap<JobId, JobInformation>,
}

impl MemoryJobInformationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_sorted(&self, keep: impl Fn(&JobInformation) -> bool) -> Vec<JobInformation> {
        let mut jobs: Vec<JobInformation> = self
            .jobs
            .iter()
            .filter(|entry| entry.active && keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        jobs
    }
}

#[async_trait]
impl JobInformationStore for MemoryJobInformationStore {
    async fn insert(&self, job: &JobInformation) -> AppResult<JobInformation> {
        match self.jobs.entry(job.id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!("Job {} already exists", job.id))),
            Entry::Vacant(slot) => {
                slot.insert(job.clone());
                Ok(job.clone())
            }
        }
    }

    async fn find_by_id(&self, id: JobId) -> AppResult<Option<JobInformation>> {
        Ok(self
            .jobs
            .get(&id)
            .filter(|job| job.active)
            .map(|job| job.value().clone()))
    }

    async fn find_including_inactive(&self, id: JobId) -> AppResult<Option<JobInformation>> {
        Ok(self.jobs.get(&id).map(|job| job.value().clone()))
    }

    async fn find_all(&self) -> AppResult<Vec<JobInformation>> {
        Ok(self.collect_sorted(|_| true))
    }

    async fn find_by_kind(&self, kind: JobKind) -> AppResult<Vec<JobInformation>> {
        Ok(self.collect_sorted(|job| job.job_type == kind))
    }

    async fn update(&self, job: &JobInformation) -> AppResult<JobInformation> {
        let mut stored = self
            .jobs
            .get_mut(&job.id)
            .ok_or_else(|| AppError::not_found(format!("Job {} not found", job.id)))?;

        let remaining = stored.remaining_fire_count;
        *stored = job.clone();
        stored.remaining_fire_count = remaining;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn update_status(&self, id: JobId, status: JobStatus) -> AppResult<()> {
        match self.jobs.get_mut(&id) {
            Some(mut job) if job.active => {
                job.status = status;
                job.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(AppError::not_found(format!("Job {id} not found"))),
        }
    }

    async fn soft_delete(&self, id: JobId) -> AppResult<bool> {
        match self.jobs.get_mut(&id) {
            Some(mut job) if job.active => {
                job.active = false;
                job.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn decrement_remaining_fire_count(&self, id: JobId) -> AppResult<Option<i32>> {
        match self.jobs.get_mut(&id) {
            Some(mut job) if job.active && job.remaining_fire_count > 0 => {
                job.remaining_fire_count -= 1;
                job.updated_at = Utc::now();
                Ok(Some(job.remaining_fire_count))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use reportflow_core::error::ErrorKind;
    use reportflow_core::types::SubscriberId;
    use reportflow_entity::job::{ReportPayload, ReportPeriod, TriggerSpec};

    use super::*;

    fn bounded_job(count: i32) -> JobInformation {
        JobInformation::new(
            SubscriberId::new(),
            "weekly digest",
            TriggerSpec {
                total_fire_count: count,
                repeat_interval_ms: 1000,
                ..TriggerSpec::default()
            },
            ReportPayload::PersonalReport {
                period: ReportPeriod {
                    from: NaiveDate::from_ymd_opt(2026, 2, 1).expect("date"),
                    to: NaiveDate::from_ymd_opt(2026, 2, 28).expect("date"),
                },
                email: None,
            },
        )
    }

    #[tokio::test]
    async fn test_insert_twice_conflicts() {
        let store = MemoryJobInformationStore::new();
        let job = bounded_job(1);
        store.insert(&job).await.expect("insert");
        let err = store.insert(&job).await.expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_decrement_stops_at_zero() {
        let store = MemoryJobInformationStore::new();
        let job = bounded_job(2);
        store.insert(&job).await.expect("insert");

        assert_eq!(store.decrement_remaining_fire_count(job.id).await.expect("dec"), Some(1));
        assert_eq!(store.decrement_remaining_fire_count(job.id).await.expect("dec"), Some(0));
        assert_eq!(store.decrement_remaining_fire_count(job.id).await.expect("dec"), None);

        let stored = store.find_by_id(job.id).await.expect("find").expect("present");
        assert_eq!(stored.remaining_fire_count, 0);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_job_from_reads() {
        let store = MemoryJobInformationStore::new();
        let job = bounded_job(1);
        store.insert(&job).await.expect("insert");

        assert!(store.soft_delete(job.id).await.expect("delete"));
        assert!(!store.soft_delete(job.id).await.expect("delete again"));
        assert!(store.find_by_id(job.id).await.expect("find").is_none());
        assert!(store.find_all().await.expect("all").is_empty());

        let retired = store
            .find_including_inactive(job.id)
            .await
            .expect("find")
            .expect("row kept");
        assert!(!retired.active);

        let err = store
            .update_status(job.id, JobStatus::Running)
            .await
            .expect_err("inactive");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_keeps_remaining_count() {
        let store = MemoryJobInformationStore::new();
        let job = bounded_job(3);
        store.insert(&job).await.expect("insert");
        store.decrement_remaining_fire_count(job.id).await.expect("dec");

        let mut changed = job.clone();
        changed.status = JobStatus::Stopped;
        changed.remaining_fire_count = 3;
        let updated = store.update(&changed).await.expect("update");

        assert_eq!(updated.status, JobStatus::Stopped);
        assert_eq!(updated.remaining_fire_count, 2);
    }
}
