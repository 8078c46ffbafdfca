//! Store selection from configuration.

use std::sync::Arc;

use tracing::info;

use reportflow_core::config::{DatabaseBackend, DatabaseConfig};
use reportflow_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::{MemoryJobInformationStore, MemoryJobLogStore};
use crate::migration::run_migrations;
use crate::repositories::{JobInformationRepository, JobLogRepository};
use crate::store::{JobInformationStore, JobLogStore};

/// The pair of stores a running instance works against.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Job configuration and counters.
    pub jobs: Arc<dyn JobInformationStore>,
    /// Monitoring log.
    pub logs: Arc<dyn JobLogStore>,
    /// Present when the stores are PostgreSQL-backed.
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            jobs: Arc::new(MemoryJobInformationStore::new()),
            logs: Arc::new(MemoryJobLogStore::new()),
            pool: None,
        }
    }

    /// Open the stores named by `config.backend`.
    ///
    /// The PostgreSQL backend connects and applies pending migrations first.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            DatabaseBackend::Memory => {
                info!("Using in-memory job stores");
                Ok(Self::in_memory())
            }
            DatabaseBackend::Postgres => {
                let db = DatabasePool::connect(config).await?;
                run_migrations(db.pool()).await?;
                Ok(Self {
                    jobs: Arc::new(JobInformationRepository::new(db.pool().clone())),
                    logs: Arc::new(JobLogRepository::new(db.pool().clone())),
                    pool: Some(db),
                })
            }
        }
    }

    /// Backend name for health reporting.
    pub fn backend_name(&self) -> &'static str {
        if self.pool.is_some() { "postgres" } else { "memory" }
    }

    /// Whether the backing database answers. Always true in memory.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(db) => db.health_check().await,
            None => Ok(true),
        }
    }
}
