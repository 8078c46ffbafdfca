//! Job log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use reportflow_core::error::{AppError, ErrorKind};
use reportflow_core::result::AppResult;
use reportflow_core::types::JobId;
use reportflow_entity::job::{JobLog, NewJobLog};

use crate::store::JobLogStore;

/// PostgreSQL-backed monitoring log.
#[derive(Debug, Clone)]
pub struct JobLogRepository {
    pool: PgPool,
}

impl JobLogRepository {
    /// Create a new job log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobLogStore for JobLogRepository {
    async fn append(&self, entry: NewJobLog) -> AppResult<JobLog> {
        let log = entry.into_log();
        sqlx::query(
            "INSERT INTO job_logs (id, job_id, status, message, data, timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(log.id)
        .bind(log.job_id)
        .bind(log.status)
        .bind(&log.message)
        .bind(Json(&log.data))
        .bind(log.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append job log", e))?;
        Ok(log)
    }

    async fn find_by_job(&self, job_id: JobId) -> AppResult<Vec<JobLog>> {
        sqlx::query_as::<_, JobLog>(
            "SELECT id, job_id, status, message, data, timestamp FROM job_logs \
             WHERE job_id = $1 ORDER BY seq ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list job logs", e))
    }
}
