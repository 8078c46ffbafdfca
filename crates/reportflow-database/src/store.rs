//! Persistence contracts for jobs and their monitoring logs.
//!
//! Services depend on these traits only. [`crate::repositories`] provides
//! the PostgreSQL implementations and [`crate::memory`] the in-process
//! ones.

use std::fmt::Debug;

use async_trait::async_trait;

use reportflow_core::result::AppResult;
use reportflow_core::types::JobId;
use reportflow_entity::job::{JobInformation, JobKind, JobLog, JobStatus, NewJobLog};

/// Durable store of job configuration and counters.
///
/// Lookups named `find_*` skip soft-deleted rows unless stated otherwise.
#[async_trait]
pub trait JobInformationStore: Send + Sync + Debug + 'static {
    /// Insert a new job and return the stored row.
    async fn insert(&self, job: &JobInformation) -> AppResult<JobInformation>;

    /// Find an active job by id.
    async fn find_by_id(&self, id: JobId) -> AppResult<Option<JobInformation>>;

    /// Find a job by id whether or not it has been soft-deleted.
    async fn find_including_inactive(&self, id: JobId) -> AppResult<Option<JobInformation>>;

    /// All active jobs, oldest first.
    async fn find_all(&self) -> AppResult<Vec<JobInformation>>;

    /// Active jobs of one family, oldest first.
    async fn find_by_kind(&self, kind: JobKind) -> AppResult<Vec<JobInformation>>;

    /// Overwrite a job's configuration, status and active flag.
    ///
    /// `remaining_fire_count` is left untouched; only
    /// [`decrement_remaining_fire_count`](Self::decrement_remaining_fire_count)
    /// moves it.
    async fn update(&self, job: &JobInformation) -> AppResult<JobInformation>;

    /// Set the status of an active job.
    async fn update_status(&self, id: JobId, status: JobStatus) -> AppResult<()>;

    /// Mark a job inactive. Returns `false` if it was already inactive or
    /// does not exist.
    async fn soft_delete(&self, id: JobId) -> AppResult<bool>;

    /// Atomically take one firing from an active job.
    ///
    /// Returns the new remaining count, or `None` when the count was
    /// already zero or the job is gone.
    async fn decrement_remaining_fire_count(&self, id: JobId) -> AppResult<Option<i32>>;
}

/// Append-only store of monitoring entries.
#[async_trait]
pub trait JobLogStore: Send + Sync + Debug + 'static {
    /// Persist one entry.
    async fn append(&self, entry: NewJobLog) -> AppResult<JobLog>;

    /// Every entry for a job in insertion order.
    async fn find_by_job(&self, job_id: JobId) -> AppResult<Vec<JobLog>>;
}
