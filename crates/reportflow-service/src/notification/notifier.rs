//! Delivery notification once a report is ready.

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::{debug, info};

use reportflow_core::result::AppResult;
use reportflow_entity::job::JobInformation;

/// Tells the subscriber a report is available.
#[async_trait]
pub trait Notifier: Send + Sync + Debug + 'static {
    /// Announce `report_url` for `job`.
    async fn report_ready(&self, job: &JobInformation, report_url: &str) -> AppResult<()>;
}

/// Emits the notification as a structured log event.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a new tracing notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn report_ready(&self, job: &JobInformation, report_url: &str) -> AppResult<()> {
        match job.payload.email() {
            Some(to) => info!(
                job_id = %job.id,
                subscriber_id = %job.subscriber_id,
                to,
                report_url,
                "Report ready for delivery"
            ),
            None => debug!(job_id = %job.id, report_url, "Report ready, no destination"),
        }
        Ok(())
    }
}
