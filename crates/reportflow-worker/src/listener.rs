//! Fire-count bookkeeping on every firing.

use std::str::FromStr;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use reportflow_core::types::JobId;
use reportflow_entity::job::JobInformation;
use reportflow_service::JobInformationService;

use crate::dispatch::{FireContext, TriggerListener};

/// Consumes one firing from count-bounded jobs and stops firings of jobs
/// that are retired or out of firings.
#[derive(Debug, Clone)]
pub struct FireCountListener {
    jobs: JobInformationService,
}

impl FireCountListener {
    /// Listener name as it appears in logs.
    pub const NAME: &'static str = "fire-count-listener";

    /// Creates a new listener.
    pub fn new(jobs: JobInformationService) -> Self {
        Self { jobs }
    }

    async fn load(&self, ctx: &FireContext) -> Option<JobInformation> {
        let Ok(id) = JobId::from_str(&ctx.key.name) else {
            warn!(job = %ctx.key, "Fired key does not name a job id");
            return None;
        };
        match self.jobs.get_job_information(id).await {
            Ok(job) => Some(job),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                error!(job = %ctx.key, error = %e, "Failed to load fired job");
                None
            }
        }
    }
}

#[async_trait]
impl TriggerListener for FireCountListener {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn veto_job_execution(&self, ctx: &FireContext) -> bool {
        match self.load(ctx).await {
            None => true,
            Some(job) if job.is_exhausted() => {
                debug!(job_id = %job.id, "Vetoing firing of exhausted job");
                true
            }
            Some(_) => false,
        }
    }

    async fn trigger_fired(&self, ctx: &FireContext) {
        let Some(job) = self.load(ctx).await else {
            return;
        };
        if !job.is_fire_count_based() {
            return;
        }

        match self.jobs.decrement_remaining_fire_count(job.id).await {
            Ok(Some(remaining)) => {
                debug!(job_id = %job.id, remaining, "Consumed one firing");
            }
            Ok(None) => warn!(job_id = %job.id, "Fired with no firings left"),
            Err(e) => error!(job_id = %job.id, error = %e, "Failed to decrement fire count"),
        }
    }

    async fn trigger_misfired(&self, ctx: &FireContext) {
        warn!(
            job = %ctx.key,
            scheduled_for = ?ctx.scheduled_for,
            fired_at = %ctx.fired_at,
            "Trigger misfired; firing late"
        );
    }

    async fn trigger_complete(&self, _ctx: &FireContext) {}
}
