//! Timing engines.
//!
//! A [`TimingEngine`] keeps named, grouped registrations and decides when
//! each one fires. Every firing goes through the engine's
//! [`FireDispatcher`](crate::dispatch::FireDispatcher).

pub mod tokio_cron;
pub mod key;
pub mod manual;
pub(crate) mod registry;
pub mod schedule;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use reportflow_core::config::EngineKind;

use crate::dispatch::{FireDispatcher, FireOutcome};
use crate::error::SchedulerError;

pub use self::tokio_cron::CronEngine;
pub use self::key::JobKey;
pub use self::manual::ManualEngine;
pub use self::registry::{EngineState, RegisteredJob};
pub use self::schedule::{Repeat, Schedule, normalize_cron_expression, parse_cron};

/// Registry of timed jobs.
#[async_trait]
pub trait TimingEngine: Send + Sync + Debug + 'static {
    /// Engine name, for logs and health output.
    fn name(&self) -> &'static str;

    /// Begin delivering firings.
    async fn start(&self) -> Result<(), SchedulerError>;

    /// Stop delivering firings.
    async fn shutdown(&self) -> Result<(), SchedulerError>;

    /// Register `key` with `schedule`, active immediately.
    async fn register(&self, key: JobKey, schedule: Schedule) -> Result<(), SchedulerError>;

    /// Suspend future firings, keeping the schedule and its progress.
    async fn pause(&self, key: &JobKey) -> Result<(), SchedulerError>;

    /// Re-arm a paused registration.
    async fn resume(&self, key: &JobKey) -> Result<(), SchedulerError>;

    /// Drop the registration.
    async fn unregister(&self, key: &JobKey) -> Result<(), SchedulerError>;

    /// Registrations in `group`, ordered by key.
    async fn registered(&self, group: &str) -> Vec<RegisteredJob>;

    /// One registration, if present.
    async fn state(&self, key: &JobKey) -> Option<RegisteredJob>;

    /// Fire `key` once, now, subject to its state and remaining firings.
    async fn fire_now(&self, key: &JobKey) -> Result<FireOutcome, SchedulerError>;
}

/// Build the engine selected by `worker.engine`.
pub async fn build_engine(
    kind: EngineKind,
    dispatcher: Arc<FireDispatcher>,
) -> Result<Arc<dyn TimingEngine>, SchedulerError> {
    Ok(match kind {
        EngineKind::Cron => Arc::new(CronEngine::new(dispatcher).await?),
        EngineKind::Manual => Arc::new(ManualEngine::new(dispatcher)),
    })
}
