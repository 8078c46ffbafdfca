//! Job scheduler service: from job information to engine registrations.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use reportflow_core::error::AppError;
use reportflow_core::result::AppResult;
use reportflow_core::types::JobId;
use reportflow_entity::job::JobInformation;
use reportflow_service::JobInformationService;

use crate::dispatch::{FireDispatcher, JobBody};
use crate::engine::{EngineState, JobKey, RegisteredJob, Repeat, Schedule, TimingEngine};
use crate::error::SchedulerError;

/// A registered job joined with its stored information.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledJobView {
    /// Stored job.
    pub job: JobInformation,
    /// Group the job is registered under.
    pub group: String,
    /// Whether the engine will fire it.
    pub engine_state: EngineState,
    /// Firings the engine has delivered since registration.
    pub engine_fire_count: u64,
    /// Next expected firing, when known.
    pub next_fire_time: Option<DateTime<Utc>>,
}

impl ScheduledJobView {
    fn new(job: JobInformation, registered: RegisteredJob) -> Self {
        Self {
            job,
            group: registered.key.group,
            engine_state: registered.state,
            engine_fire_count: registered.fired,
            next_fire_time: registered.next_fire_at,
        }
    }
}

/// Engine key for a job.
pub fn job_key(job: &JobInformation, group: &str) -> JobKey {
    JobKey::new(job.id.to_string(), group)
}

/// Turn a job's schedule fields into a concrete schedule.
///
/// Cron wins over every other field. Otherwise the job fires after
/// `initial_offset_ms` and then every `repeat_interval_ms`, forever or for
/// `total_fire_count` firings in all.
pub fn build_schedule(job: &JobInformation) -> AppResult<Schedule> {
    if let Some(expression) = job.cron.as_deref().filter(|_| job.is_cron_based()) {
        return Ok(Schedule::cron(expression)?);
    }
    let firings = (!job.run_forever).then_some(job.total_fire_count);
    fixed_schedule(job, millis(job.initial_offset_ms, "initialOffsetMs")?, firings)
}

/// Schedule for re-arming a job after a restart, counting only the firings
/// it has left.
///
/// A job that already fired waits one interval before its next firing.
pub fn build_recovery_schedule(job: &JobInformation) -> AppResult<Schedule> {
    if job.is_cron_based() || job.run_forever {
        return build_schedule(job);
    }

    let start_after = if job.remaining_fire_count >= job.total_fire_count {
        millis(job.initial_offset_ms, "initialOffsetMs")?
    } else {
        millis(job.repeat_interval_ms, "repeatInterval")?
    };
    fixed_schedule(job, start_after, Some(job.remaining_fire_count))
}

/// `firings` of `None` means unbounded.
fn fixed_schedule(
    job: &JobInformation,
    start_after: Duration,
    firings: Option<i32>,
) -> AppResult<Schedule> {
    let repeat = match firings {
        None => Repeat::Forever,
        Some(n) if n >= 1 => Repeat::Times((n - 1) as u32),
        Some(n) => {
            return Err(SchedulerError::InvalidSchedule(format!(
                "job {} must fire at least once, got {n} firings",
                job.id
            ))
            .into());
        }
    };

    let interval = millis(job.repeat_interval_ms, "repeatInterval")?;
    if interval.is_zero() && repeat != Repeat::Times(0) {
        return Err(SchedulerError::InvalidSchedule(format!(
            "job {} repeats but has no repeat interval",
            job.id
        ))
        .into());
    }

    Ok(Schedule::Fixed {
        start_after,
        interval,
        repeat,
    })
}

fn millis(value: i64, field: &str) -> AppResult<Duration> {
    u64::try_from(value)
        .map(Duration::from_millis)
        .map_err(|_| SchedulerError::InvalidSchedule(format!("{field} must not be negative")).into())
}

/// Registers jobs with the timing engine and answers questions about them.
#[derive(Debug, Clone)]
pub struct JobSchedulerService {
    engine: Arc<dyn TimingEngine>,
    dispatcher: Arc<FireDispatcher>,
    jobs: JobInformationService,
}

impl JobSchedulerService {
    /// Creates a new scheduler service.
    pub fn new(
        engine: Arc<dyn TimingEngine>,
        dispatcher: Arc<FireDispatcher>,
        jobs: JobInformationService,
    ) -> Self {
        Self {
            engine,
            dispatcher,
            jobs,
        }
    }

    /// Register `job` under `group` with the schedule its fields describe.
    pub async fn schedule(
        &self,
        body: Arc<dyn JobBody>,
        job: &JobInformation,
        group: &str,
    ) -> AppResult<JobInformation> {
        let schedule = build_schedule(job)?;
        self.schedule_with(body, job, group, schedule).await
    }

    /// Register `job` under `group` with an explicit schedule.
    pub async fn schedule_with(
        &self,
        body: Arc<dyn JobBody>,
        job: &JobInformation,
        group: &str,
        schedule: Schedule,
    ) -> AppResult<JobInformation> {
        let key = job_key(job, group);

        // Concurrent schedules of one key may interleave here. The body is
        // left bound whenever another call owns the registration.
        let bound_here = self.dispatcher.bind(key.clone(), body);
        if let Err(e) = self.engine.register(key.clone(), schedule.clone()).await {
            if bound_here && !matches!(e, SchedulerError::JobAlreadyExists(_)) {
                self.dispatcher.unbind(&key);
            }
            return Err(e.into());
        }

        info!(job = %key, schedule = ?schedule, "Job scheduled");
        Ok(job.clone())
    }

    /// Suspend future firings of `job`.
    pub async fn pause_job(&self, job: &JobInformation, group: &str) -> AppResult<()> {
        let key = job_key(job, group);
        self.engine.pause(&key).await?;
        info!(job = %key, "Job paused");
        Ok(())
    }

    /// Re-arm a paused job.
    pub async fn resume_job(&self, job: &JobInformation, group: &str) -> AppResult<()> {
        let key = job_key(job, group);
        self.engine.resume(&key).await?;
        info!(job = %key, "Job resumed");
        Ok(())
    }

    /// Every registered job in `group` with its stored information.
    ///
    /// Registrations whose job is no longer active are left out.
    pub async fn get_all_running_jobs_in_group(
        &self,
        group: &str,
    ) -> AppResult<Vec<ScheduledJobView>> {
        let mut views = Vec::new();
        for registered in self.engine.registered(group).await {
            let Ok(id) = JobId::from_str(&registered.key.name) else {
                continue;
            };
            match self.jobs.get_job_information(id).await {
                Ok(job) => views.push(ScheduledJobView::new(job, registered)),
                Err(e) if e.is_not_found() => {
                    warn!(job = %registered.key, "Registered job has no active record");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(views)
    }

    /// One registered job with its stored information.
    pub async fn get_running_job(&self, name: &str, group: &str) -> AppResult<ScheduledJobView> {
        let key = JobKey::new(name, group);
        let registered = self
            .engine
            .state(&key)
            .await
            .ok_or_else(|| AppError::from(SchedulerError::JobNotFound(key.clone())))?;
        let id = JobId::from_str(name)
            .map_err(|_| AppError::from(SchedulerError::JobNotFound(key.clone())))?;
        let job = self.jobs.get_job_information(id).await?;
        Ok(ScheduledJobView::new(job, registered))
    }

    /// Unregister a job. Stored information is untouched.
    pub async fn delete_job(&self, name: &str, group: &str) -> AppResult<()> {
        let key = JobKey::new(name, group);
        let result = self.engine.unregister(&key).await;
        self.dispatcher.unbind(&key);
        result?;
        info!(job = %key, "Job unscheduled");
        Ok(())
    }
}
