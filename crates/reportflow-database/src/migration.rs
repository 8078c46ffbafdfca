//! Schema migrations for the job stores.

use sqlx::PgPool;
use tracing::info;

use reportflow_core::error::{AppError, ErrorKind};
use reportflow_core::result::AppResult;

/// Apply every pending migration under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to migrate job store schema: {e}"),
                e,
            )
        })?;

    info!("Job store schema is up to date");
    Ok(())
}
