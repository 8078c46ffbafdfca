//! Report execution: render, store, hand back the artifact location.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use reportflow_core::config::ReportsConfig;
use reportflow_core::error::AppError;
use reportflow_core::traits::storage::StorageProvider;
use reportflow_entity::job::{JobExecutionDetails, JobInformation};

use super::renderer::ReportRenderer;

/// Why an execution produced no report.
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// The job's own data cannot produce a report.
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// The run exceeded the configured bound.
    #[error("execution timed out after {0}s")]
    TimedOut(u64),

    /// A collaborator failed.
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Generates and stores report artifacts off the calling task.
#[derive(Debug, Clone)]
pub struct JobExecutorService {
    renderer: Arc<dyn ReportRenderer>,
    storage: Arc<dyn StorageProvider>,
    public_base_url: String,
    timeout: Option<Duration>,
}

impl JobExecutorService {
    /// Creates a new executor.
    pub fn new(
        renderer: Arc<dyn ReportRenderer>,
        storage: Arc<dyn StorageProvider>,
        reports: &ReportsConfig,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            renderer,
            storage,
            public_base_url: reports.public_base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Start executing `job` on its own task.
    ///
    /// The returned handle always resolves to details; failures are reported
    /// as [`ExecutionStatus::Failed`](reportflow_entity::job::ExecutionStatus::Failed).
    pub fn execute(&self, job: JobInformation) -> JoinHandle<JobExecutionDetails> {
        let this = self.clone();
        tokio::spawn(async move { this.run(job).await })
    }

    async fn run(&self, job: JobInformation) -> JobExecutionDetails {
        let started_at = Utc::now();

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.produce(&job, started_at))
                .await
                .unwrap_or_else(|_| Err(JobExecutionError::TimedOut(limit.as_secs()))),
            None => self.produce(&job, started_at).await,
        };

        match outcome {
            Ok(report_url) => {
                info!(job_id = %job.id, report_url = %report_url, "Report generated");
                JobExecutionDetails::succeeded(job.id, started_at, report_url)
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Report generation failed");
                JobExecutionDetails::failed(job.id, started_at, e.to_string())
            }
        }
    }

    async fn produce(
        &self,
        job: &JobInformation,
        generated_at: DateTime<Utc>,
    ) -> Result<String, JobExecutionError> {
        let report = self.renderer.render(job, generated_at).await.map_err(|e| {
            if e.kind == reportflow_core::error::ErrorKind::Validation {
                JobExecutionError::Permanent(e.message)
            } else {
                JobExecutionError::Internal(e)
            }
        })?;

        let path = artifact_path(job, generated_at, &report.file_name);
        self.storage.write(&path, report.body).await?;
        Ok(format!("{}/{}", self.public_base_url, path))
    }
}

/// `reports/{kind}/{job_id}/{timestamp}-{file_name}`
fn artifact_path(job: &JobInformation, generated_at: DateTime<Utc>, file_name: &str) -> String {
    format!(
        "reports/{}/{}/{}-{}",
        job.job_type,
        job.id,
        generated_at.format("%Y%m%dT%H%M%S%3fZ"),
        file_name
    )
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::NaiveDate;

    use reportflow_core::result::AppResult;
    use reportflow_core::types::SubscriberId;
    use reportflow_entity::job::{ExecutionStatus, ReportPayload, ReportPeriod, TriggerSpec};
    use reportflow_storage::LocalStorageProvider;

    use super::*;
    use crate::report::renderer::{JsonReportRenderer, RenderedReport};

    #[derive(Debug)]
    struct StallingRenderer;

    #[async_trait]
    impl ReportRenderer for StallingRenderer {
        async fn render(&self, _: &JobInformation, _: DateTime<Utc>) -> AppResult<RenderedReport> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(RenderedReport {
                file_name: "never.json".into(),
                content_type: "application/json",
                body: Bytes::new(),
            })
        }
    }

    fn job() -> JobInformation {
        JobInformation::new(
            SubscriberId::new(),
            "weekly",
            TriggerSpec::default(),
            ReportPayload::PersonalReport {
                period: ReportPeriod {
                    from: NaiveDate::from_ymd_opt(2026, 1, 5).expect("date"),
                    to: NaiveDate::from_ymd_opt(2026, 1, 11).expect("date"),
                },
                email: None,
            },
        )
    }

    fn reports(base: &str) -> ReportsConfig {
        ReportsConfig {
            public_base_url: base.to_string(),
            ..ReportsConfig::default()
        }
    }

    #[tokio::test]
    async fn test_success_stores_artifact_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let executor = JobExecutorService::new(
            Arc::new(JsonReportRenderer::new()),
            Arc::new(LocalStorageProvider::new(dir.path()).await.unwrap()),
            &reports("https://files.example.com/"),
            Some(Duration::from_secs(30)),
        );
        let job = job();

        let details = executor.execute(job.clone()).await.unwrap();
        assert_eq!(details.status, ExecutionStatus::Success);

        let url = details.report_url.unwrap();
        let path = url.strip_prefix("https://files.example.com/").unwrap();
        assert!(path.starts_with(&format!("reports/personal_report/{}/", job.id)), "{url}");
        assert!(path.ends_with("-personal_report.json"));
        assert!(tokio::fs::try_exists(dir.path().join(path)).await.unwrap());
        assert_eq!(details.data.get("reportUrl"), Some(&url));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_failed_details() {
        let dir = tempfile::tempdir().unwrap();
        let executor = JobExecutorService::new(
            Arc::new(StallingRenderer),
            Arc::new(LocalStorageProvider::new(dir.path()).await.unwrap()),
            &ReportsConfig::default(),
            Some(Duration::from_secs(5)),
        );

        let details = executor.execute(job()).await.unwrap();
        assert_eq!(details.status, ExecutionStatus::Failed);
        assert_eq!(details.cause.as_deref(), Some("execution timed out after 5s"));
    }

    #[tokio::test]
    async fn test_invalid_period_fails_permanently() {
        let dir = tempfile::tempdir().unwrap();
        let executor = JobExecutorService::new(
            Arc::new(JsonReportRenderer::new()),
            Arc::new(LocalStorageProvider::new(dir.path()).await.unwrap()),
            &ReportsConfig::default(),
            None,
        );
        let mut job = job();
        job.payload = ReportPayload::PersonalReport {
            period: ReportPeriod {
                from: NaiveDate::from_ymd_opt(2026, 2, 1).expect("date"),
                to: NaiveDate::from_ymd_opt(2026, 1, 1).expect("date"),
            },
            email: None,
        };

        let details = executor.execute(job).await.unwrap();
        assert!(!details.is_success());
        assert!(details.cause.unwrap().starts_with("Permanent job failure"));
    }
}
