//! Report job orchestration, one service per job family.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use reportflow_core::error::{AppError, ErrorKind};
use reportflow_core::result::AppResult;
use reportflow_core::types::JobId;
use reportflow_entity::job::{
    JobExecutionDetails, JobInformation, JobKind, JobLog, JobLogStatus, JobStatus,
};
use reportflow_service::{JobExecutorService, JobInformationService, MonitoringService, Notifier};

use crate::dispatch::{FireContext, JobBody};
use crate::scheduler::{JobSchedulerService, ScheduledJobView, build_recovery_schedule};

/// Prefix of the monitoring message recorded when an execution fails.
pub const EXECUTION_FAILED_PREFIX: &str = "JOB_EXECUTION_FAILED_BY_EXCEPTION_";

/// Counts from one startup recovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryReport {
    /// Jobs re-armed and firing.
    pub scheduled: usize,
    /// Jobs re-armed in the paused state.
    pub paused: usize,
    /// Jobs found out of firings and marked completed.
    pub completed: usize,
    /// Jobs that could not be re-armed.
    pub failed: usize,
}

/// Lifecycle operations and the firing body for one job family.
#[derive(Debug)]
pub struct ReportJobService {
    kind: JobKind,
    jobs: JobInformationService,
    monitoring: MonitoringService,
    scheduler: JobSchedulerService,
    executor: JobExecutorService,
    notifier: Arc<dyn Notifier>,
}

impl ReportJobService {
    /// Creates a new report job service for `kind`.
    pub fn new(
        kind: JobKind,
        jobs: JobInformationService,
        monitoring: MonitoringService,
        scheduler: JobSchedulerService,
        executor: JobExecutorService,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            kind,
            jobs,
            monitoring,
            scheduler,
            executor,
            notifier,
        }
    }

    /// Family served by this instance.
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    fn group(&self) -> &'static str {
        self.kind.group()
    }

    /// Firing body handed to the engine. Holds the service weakly so the
    /// dispatcher does not keep it alive.
    fn body(self: &Arc<Self>) -> Arc<dyn JobBody> {
        Arc::new(ReportJobBody {
            service: Arc::downgrade(self),
        })
    }

    fn ensure_kind(&self, job: &JobInformation) -> AppResult<()> {
        if job.job_type == self.kind {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Job type {} cannot be handled by the {} service",
                job.job_type, self.kind
            )))
        }
    }

    fn not_found(&self, id: JobId) -> AppError {
        AppError::not_found(format!("Job {id} not found"))
    }

    /// Persist a new job, register it with the engine and mark it running.
    pub async fn run_job(self: &Arc<Self>, mut job: JobInformation) -> AppResult<JobInformation> {
        self.ensure_kind(&job)?;
        job.status = JobStatus::Created;
        let job = self.jobs.save_job_information(&job).await?;

        if let Err(e) = self.scheduler.schedule(self.body(), &job, self.group()).await {
            error!(job_id = %job.id, error = %e, "Failed to schedule job");
            if let Err(update) = self.jobs.update_status(job.id, JobStatus::Failed).await {
                warn!(job_id = %job.id, error = %update, "Failed to mark job as failed");
            }
            return Err(e);
        }

        self.monitoring
            .log(&job, JobLogStatus::Created, format!("Job '{}' created", job.name))
            .await?;

        // A short job may already have completed on its own.
        let current = self.jobs.get_job_information(job.id).await?;
        if current.status == JobStatus::Created {
            self.jobs.update_status(job.id, JobStatus::Running).await?;
        }

        info!(job_id = %job.id, group = self.group(), "Job running");
        self.jobs.get_job_information(job.id).await
    }

    /// Every active job of this family.
    pub async fn get_all_jobs(&self) -> AppResult<Vec<JobInformation>> {
        self.jobs.get_all_job_information_of_kind(self.kind).await
    }

    /// One active job of this family.
    pub async fn get_job(&self, id: JobId) -> AppResult<JobInformation> {
        let job = self.jobs.get_job_information(id).await?;
        if job.job_type != self.kind {
            return Err(self.not_found(id));
        }
        Ok(job)
    }

    /// Pause future firings.
    pub async fn stop_job(&self, id: JobId) -> AppResult<JobInformation> {
        let job = self.get_job(id).await?;
        self.scheduler.pause_job(&job, self.group()).await?;
        self.jobs.update_status(id, JobStatus::Stopped).await?;
        self.monitoring
            .log(&job, JobLogStatus::Stopped, "Job stopped")
            .await?;
        self.get_job(id).await
    }

    /// Resume a stopped job.
    pub async fn restart_job(&self, id: JobId) -> AppResult<JobInformation> {
        let job = self.get_job(id).await?;
        self.scheduler.resume_job(&job, self.group()).await?;
        self.jobs.update_status(id, JobStatus::Restarted).await?;
        self.monitoring
            .log(&job, JobLogStatus::Restarted, "Job restarted")
            .await?;
        self.get_job(id).await
    }

    /// Unregister and retire a job. Its monitoring log stays readable.
    pub async fn delete_job(&self, id: JobId) -> AppResult<()> {
        let job = self.get_job(id).await?;
        match self.scheduler.delete_job(&id.to_string(), self.group()).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(job_id = %id, "Deleted job was not registered");
            }
            Err(e) => return Err(e),
        }
        self.jobs.delete_job_information(id).await?;
        self.monitoring
            .log(&job, JobLogStatus::Deleted, "Job deleted")
            .await?;
        Ok(())
    }

    /// Monitoring log of a job, retired or not, oldest first.
    pub async fn get_logs(&self, id: JobId) -> AppResult<Vec<JobLog>> {
        let job = self.jobs.get_job_information_including_inactive(id).await?;
        if job.job_type != self.kind {
            return Err(self.not_found(id));
        }
        self.monitoring.get_logs(id).await
    }

    /// Jobs of this family currently registered with the engine.
    pub async fn get_scheduled_jobs(&self) -> AppResult<Vec<ScheduledJobView>> {
        self.scheduler.get_all_running_jobs_in_group(self.group()).await
    }

    /// Run one firing of `id`. Failures end up in the monitoring log and
    /// never reach the engine.
    pub async fn execute_job(&self, id: JobId) {
        let job = match self.get_job(id).await {
            Ok(job) => job,
            Err(e) => {
                warn!(job_id = %id, error = %e, "Fired job could not be loaded");
                return;
            }
        };

        self.record(&job, JobLogStatus::Started, "Job execution started", HashMap::new())
            .await;

        let details = match self.executor.execute(job.clone()).await {
            Ok(details) => details,
            Err(e) => JobExecutionDetails::failed(job.id, Utc::now(), e.to_string()),
        };

        if details.is_success() {
            self.on_success(&job, details).await;
        } else {
            let cause = details.cause.as_deref().unwrap_or("unknown");
            self.record(
                &job,
                JobLogStatus::Error,
                format!("{EXECUTION_FAILED_PREFIX}{cause}"),
                details.data,
            )
            .await;
        }

        self.complete_if_exhausted(id).await;
    }

    async fn on_success(&self, job: &JobInformation, details: JobExecutionDetails) {
        let mut data = details.data.clone();
        data.insert("durationMs".to_string(), details.duration_ms().to_string());
        self.record(job, JobLogStatus::Success, "Report generated", data)
            .await;

        let Some(url) = details.report_url.as_deref() else {
            return;
        };
        if let Err(e) = self.notifier.report_ready(job, url).await {
            self.record(
                job,
                JobLogStatus::Warning,
                format!("Report notification failed: {}", e.message),
                HashMap::new(),
            )
            .await;
        }
    }

    /// Retire the registration of a count-bounded job with no firings left.
    async fn complete_if_exhausted(&self, id: JobId) {
        let job = match self.jobs.get_job_information(id).await {
            Ok(job) if job.is_exhausted() => job,
            Ok(_) => return,
            Err(e) => {
                if !e.is_not_found() {
                    warn!(job_id = %id, error = %e, "Failed to reload job after execution");
                }
                return;
            }
        };

        match self.scheduler.delete_job(&id.to_string(), self.group()).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => warn!(job_id = %id, error = %e, "Failed to unregister completed job"),
        }

        if let Err(e) = self.jobs.update_status(id, JobStatus::Completed).await {
            warn!(job_id = %id, error = %e, "Failed to mark job completed");
            return;
        }
        self.record(
            &job,
            JobLogStatus::Finished,
            format!("Job finished after {} firings", job.fired_count()),
            HashMap::new(),
        )
        .await;
    }

    async fn record(
        &self,
        job: &JobInformation,
        status: JobLogStatus,
        message: impl Into<String>,
        data: HashMap<String, String>,
    ) {
        if let Err(e) = self.monitoring.log_with_data(job, status, message, data).await {
            error!(job_id = %job.id, status = %status, error = %e, "Failed to write monitoring entry");
        }
    }

    /// Re-register this family's persisted jobs after a restart.
    pub async fn recover(self: &Arc<Self>) -> AppResult<RecoveryReport> {
        let mut report = RecoveryReport::default();

        for job in self.get_all_jobs().await? {
            if job.status.is_terminal() {
                continue;
            }
            if job.is_exhausted() {
                self.jobs.update_status(job.id, JobStatus::Completed).await?;
                self.record(
                    &job,
                    JobLogStatus::Finished,
                    "Job finished before restart",
                    HashMap::new(),
                )
                .await;
                report.completed += 1;
                continue;
            }

            let paused = job.status == JobStatus::Stopped;
            if !paused && !job.status.is_schedulable() {
                continue;
            }

            if let Err(e) = self.rearm(&job, paused).await {
                if e.kind == ErrorKind::Conflict {
                    debug!(job_id = %job.id, "Job already registered");
                    continue;
                }
                error!(job_id = %job.id, error = %e, "Failed to recover job");
                report.failed += 1;
                continue;
            }

            if paused {
                report.paused += 1;
            } else {
                report.scheduled += 1;
            }
        }

        info!(
            group = self.group(),
            scheduled = report.scheduled,
            paused = report.paused,
            completed = report.completed,
            failed = report.failed,
            "Recovered jobs"
        );
        Ok(report)
    }

    async fn rearm(self: &Arc<Self>, job: &JobInformation, paused: bool) -> AppResult<()> {
        let schedule = build_recovery_schedule(job)?;
        self.scheduler
            .schedule_with(self.body(), job, self.group(), schedule)
            .await?;
        if paused {
            self.scheduler.pause_job(job, self.group()).await?;
        }
        Ok(())
    }
}

struct ReportJobBody {
    service: Weak<ReportJobService>,
}

#[async_trait]
impl JobBody for ReportJobBody {
    async fn run(&self, ctx: &FireContext) {
        let Some(service) = self.service.upgrade() else {
            debug!(job = %ctx.key, "Report service dropped, skipping firing");
            return;
        };
        match JobId::from_str(&ctx.key.name) {
            Ok(id) => service.execute_job(id).await,
            Err(_) => warn!(job = %ctx.key, "Fired key does not name a job id"),
        }
    }
}
