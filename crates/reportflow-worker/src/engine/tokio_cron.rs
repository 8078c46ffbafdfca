//! Clock-driven engine on top of `tokio-cron-scheduler`.
//!
//! Cron registrations map to one recurring scheduler job. Fixed schedules
//! are a chain of one-shot jobs: each firing arms the next one `interval`
//! later until the repeat budget is spent. Every armed scheduler job carries
//! its uuid; a firing whose uuid no longer matches the registration (paused,
//! re-armed or unregistered since) is dropped.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::dispatch::{FireDispatcher, FireOutcome};
use crate::error::SchedulerError;

use super::TimingEngine;
use super::key::JobKey;
use super::registry::{EngineState, RegisteredJob, Registration};
use super::schedule::Schedule;

/// `tokio-cron-scheduler` backed engine.
#[derive(Clone)]
pub struct CronEngine {
    inner: Arc<Inner>,
}

struct Inner {
    scheduler: JobScheduler,
    dispatcher: Arc<FireDispatcher>,
    registry: Mutex<HashMap<JobKey, Registration>>,
}

impl std::fmt::Debug for CronEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronEngine").finish()
    }
}

impl CronEngine {
    /// Create the engine. Firings start after [`TimingEngine::start`].
    pub async fn new(dispatcher: Arc<FireDispatcher>) -> Result<Self, SchedulerError> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            inner: Arc::new(Inner {
                scheduler,
                dispatcher,
                registry: Mutex::new(HashMap::new()),
            }),
        })
    }
}

impl Inner {
    /// Arm the next scheduler job for `registration`.
    ///
    /// Fixed schedules fire after `delay`, or after `start_after` when no
    /// delay is given. Callers hold the registry lock, so a zero-delay
    /// firing cannot observe the registration before `armed` is set.
    ///
    /// Boxed because every fixed firing re-arms through here.
    fn arm<'a>(
        self: &'a Arc<Self>,
        key: &'a JobKey,
        registration: &'a mut Registration,
        delay: Option<Duration>,
    ) -> Pin<Box<dyn Future<Output = Result<(), SchedulerError>> + Send + 'a>> {
        Box::pin(async move {
            let weak = Arc::downgrade(self);
            let job = match &registration.schedule {
                Schedule::Cron { expression } => {
                    let key = key.clone();
                    registration.next_due = None;
                    CronJob::new_async(expression.as_str(), move |uuid, _scheduler| {
                        let weak = Weak::clone(&weak);
                        let key = key.clone();
                        Box::pin(async move {
                            if let Some(inner) = weak.upgrade() {
                                inner.cron_fired(key, uuid).await;
                            }
                        })
                    })?
                }
                Schedule::Fixed { start_after, .. } => {
                    let delay = delay.unwrap_or(*start_after);
                    let key = key.clone();
                    registration.next_due = chrono::Duration::from_std(delay)
                        .ok()
                        .map(|d| Utc::now() + d);
                    CronJob::new_one_shot_async(delay, move |uuid, _scheduler| {
                        let weak = Weak::clone(&weak);
                        let key = key.clone();
                        Box::pin(async move {
                            if let Some(inner) = weak.upgrade() {
                                inner.fixed_fired(key, uuid).await;
                            }
                        })
                    })?
                }
            };

            let uuid = job.guid();
            registration.armed = Some(uuid);
            if let Err(e) = self.scheduler.add(job).await {
                registration.armed = None;
                registration.next_due = None;
                return Err(e.into());
            }
            debug!(job = %key, engine_job = %uuid, "Armed scheduler job");
            Ok(())
        })
    }

    async fn disarm(&self, registration: &mut Registration) -> Result<(), SchedulerError> {
        if let Some(uuid) = registration.armed {
            self.scheduler.remove(&uuid).await?;
        }
        registration.armed = None;
        registration.next_due = None;
        Ok(())
    }

    async fn cron_fired(self: Arc<Self>, key: JobKey, uuid: Uuid) {
        let fire_number = {
            let mut registry = self.registry.lock().await;
            let Some(registration) = registry.get_mut(&key) else {
                return;
            };
            if registration.armed != Some(uuid) || !registration.can_fire() {
                debug!(job = %key, "Dropping stale cron firing");
                return;
            }
            registration.record_firing();
            registration.fired
        };

        self.dispatcher.on_fire(key, None, fire_number).await;
    }

    async fn fixed_fired(self: Arc<Self>, key: JobKey, uuid: Uuid) {
        let (fire_number, due) = {
            let mut registry = self.registry.lock().await;
            let Some(registration) = registry.get_mut(&key) else {
                return;
            };
            if registration.armed != Some(uuid) {
                debug!(job = %key, "Dropping stale one-shot firing");
                return;
            }
            let due = registration.next_due;
            registration.armed = None;
            registration.next_due = None;
            if !registration.can_fire() {
                return;
            }

            if registration.record_firing() {
                let interval = registration.schedule.interval();
                if let Err(e) = self.arm(&key, registration, interval).await {
                    error!(job = %key, error = %e, "Failed to arm next firing");
                }
            }
            (registration.fired, due)
        };

        self.dispatcher.on_fire(key, due, fire_number).await;
    }
}

#[async_trait]
impl TimingEngine for CronEngine {
    fn name(&self) -> &'static str {
        "cron"
    }

    async fn start(&self) -> Result<(), SchedulerError> {
        self.inner.scheduler.start().await?;
        info!("Timing engine started");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SchedulerError> {
        let mut scheduler = self.inner.scheduler.clone();
        scheduler.shutdown().await?;
        info!("Timing engine shut down");
        Ok(())
    }

    async fn register(&self, key: JobKey, schedule: Schedule) -> Result<(), SchedulerError> {
        let mut registry = self.inner.registry.lock().await;
        if registry.contains_key(&key) {
            return Err(SchedulerError::JobAlreadyExists(key));
        }

        let mut registration = Registration::new(schedule);
        self.inner.arm(&key, &mut registration, None).await?;
        registry.insert(key, registration);
        Ok(())
    }

    async fn pause(&self, key: &JobKey) -> Result<(), SchedulerError> {
        let mut registry = self.inner.registry.lock().await;
        let registration = registry
            .get_mut(key)
            .ok_or_else(|| SchedulerError::JobNotFound(key.clone()))?;
        if registration.state == EngineState::Paused {
            return Ok(());
        }

        self.inner
            .disarm(registration)
            .await
            .map_err(|e| SchedulerError::JobPausing {
                key: key.clone(),
                reason: e.to_string(),
            })?;
        registration.state = EngineState::Paused;
        Ok(())
    }

    async fn resume(&self, key: &JobKey) -> Result<(), SchedulerError> {
        let mut registry = self.inner.registry.lock().await;
        let registration = registry
            .get_mut(key)
            .ok_or_else(|| SchedulerError::JobNotFound(key.clone()))?;
        if registration.state == EngineState::Active {
            return Ok(());
        }

        registration.state = EngineState::Active;
        if registration.remaining_firings() == Some(0) {
            return Ok(());
        }

        // A job paused before its first firing keeps its initial offset.
        let delay = if registration.fired == 0 {
            None
        } else {
            registration.schedule.interval()
        };
        if let Err(e) = self.inner.arm(key, registration, delay).await {
            registration.state = EngineState::Paused;
            return Err(SchedulerError::JobResuming {
                key: key.clone(),
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    async fn unregister(&self, key: &JobKey) -> Result<(), SchedulerError> {
        let mut registration = self
            .inner
            .registry
            .lock()
            .await
            .remove(key)
            .ok_or_else(|| SchedulerError::JobNotFound(key.clone()))?;

        if let Err(e) = self.inner.disarm(&mut registration).await {
            warn!(job = %key, error = %e, "Scheduler job outlived its registration");
        }
        Ok(())
    }

    async fn registered(&self, group: &str) -> Vec<RegisteredJob> {
        let registry = self.inner.registry.lock().await;
        let mut jobs: Vec<RegisteredJob> = registry
            .iter()
            .filter(|(key, _)| key.group == group)
            .map(|(key, registration)| registration.snapshot(key))
            .collect();
        jobs.sort_by(|a, b| a.key.cmp(&b.key));
        jobs
    }

    async fn state(&self, key: &JobKey) -> Option<RegisteredJob> {
        self.inner
            .registry
            .lock()
            .await
            .get(key)
            .map(|registration| registration.snapshot(key))
    }

    async fn fire_now(&self, key: &JobKey) -> Result<FireOutcome, SchedulerError> {
        let fire_number = {
            let mut registry = self.inner.registry.lock().await;
            let registration = registry
                .get_mut(key)
                .ok_or_else(|| SchedulerError::JobNotFound(key.clone()))?;
            if !registration.can_fire() {
                return Ok(FireOutcome::Skipped);
            }
            registration.record_firing();
            registration.fired
        };

        Ok(self
            .inner
            .dispatcher
            .on_fire(key.clone(), None, fire_number)
            .await)
    }
}
