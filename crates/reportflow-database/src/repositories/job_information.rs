//! Job information repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use reportflow_core::error::{AppError, ErrorKind};
use reportflow_core::result::AppResult;
use reportflow_core::types::JobId;
use reportflow_entity::job::{JobInformation, JobKind, JobStatus};

use crate::store::JobInformationStore;

/// PostgreSQL-backed job information store.
#[derive(Debug, Clone)]
pub struct JobInformationRepository {
    pool: PgPool,
}

impl JobInformationRepository {
    /// Create a new job information repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobInformationStore for JobInformationRepository {
    async fn insert(&self, job: &JobInformation) -> AppResult<JobInformation> {
        sqlx::query_as::<_, JobInformation>(
            "INSERT INTO job_information (id, subscriber_id, job_type, name, total_fire_count, \
             remaining_fire_count, run_forever, repeat_interval_ms, initial_offset_ms, cron, \
             status, active, payload, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING *",
        )
        .bind(job.id)
        .bind(job.subscriber_id)
        .bind(job.job_type)
        .bind(&job.name)
        .bind(job.total_fire_count)
        .bind(job.remaining_fire_count)
        .bind(job.run_forever)
        .bind(job.repeat_interval_ms)
        .bind(job.initial_offset_ms)
        .bind(&job.cron)
        .bind(job.status)
        .bind(job.active)
        .bind(Json(&job.payload))
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db) = e {
                if db.is_unique_violation() {
                    return AppError::conflict(format!("Job {} already exists", job.id));
                }
            }
            AppError::with_source(ErrorKind::Database, "Failed to insert job", e)
        })
    }

    async fn find_by_id(&self, id: JobId) -> AppResult<Option<JobInformation>> {
        sqlx::query_as::<_, JobInformation>(
            "SELECT * FROM job_information WHERE id = $1 AND active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    async fn find_including_inactive(&self, id: JobId) -> AppResult<Option<JobInformation>> {
        sqlx::query_as::<_, JobInformation>("SELECT * FROM job_information WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    async fn find_all(&self) -> AppResult<Vec<JobInformation>> {
        sqlx::query_as::<_, JobInformation>(
            "SELECT * FROM job_information WHERE active ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list jobs", e))
    }

    async fn find_by_kind(&self, kind: JobKind) -> AppResult<Vec<JobInformation>> {
        sqlx::query_as::<_, JobInformation>(
            "SELECT * FROM job_information WHERE active AND job_type = $1 ORDER BY created_at ASC",
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list jobs by kind", e)
        })
    }

    async fn update(&self, job: &JobInformation) -> AppResult<JobInformation> {
        sqlx::query_as::<_, JobInformation>(
            "UPDATE job_information SET name = $2, total_fire_count = $3, run_forever = $4, \
             repeat_interval_ms = $5, initial_offset_ms = $6, cron = $7, status = $8, \
             active = $9, payload = $10, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(job.id)
        .bind(&job.name)
        .bind(job.total_fire_count)
        .bind(job.run_forever)
        .bind(job.repeat_interval_ms)
        .bind(job.initial_offset_ms)
        .bind(&job.cron)
        .bind(job.status)
        .bind(job.active)
        .bind(Json(&job.payload))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update job", e))?
        .ok_or_else(|| AppError::not_found(format!("Job {} not found", job.id)))
    }

    async fn update_status(&self, id: JobId, status: JobStatus) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE job_information SET status = $2, updated_at = NOW() WHERE id = $1 AND active",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update job status", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Job {id} not found")));
        }
        Ok(())
    }

    async fn soft_delete(&self, id: JobId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE job_information SET active = FALSE, updated_at = NOW() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete job", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn decrement_remaining_fire_count(&self, id: JobId) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE job_information SET remaining_fire_count = remaining_fire_count - 1, \
             updated_at = NOW() \
             WHERE id = $1 AND active AND remaining_fire_count > 0 \
             RETURNING remaining_fire_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to decrement fire count", e)
        })
    }
}
