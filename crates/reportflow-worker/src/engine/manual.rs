//! Engine that fires only when told to.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::dispatch::{FireDispatcher, FireOutcome};
use crate::error::SchedulerError;

use super::TimingEngine;
use super::key::JobKey;
use super::registry::{EngineState, RegisteredJob, Registration};
use super::schedule::Schedule;

/// Keeps registrations like any engine but never fires on its own;
/// [`TimingEngine::fire_now`] is the only way in. Firing limits and pause
/// state are honored exactly as the clock-driven engine honors them.
#[derive(Debug)]
pub struct ManualEngine {
    dispatcher: Arc<FireDispatcher>,
    registry: Mutex<HashMap<JobKey, Registration>>,
}

impl ManualEngine {
    /// Create a manual engine.
    pub fn new(dispatcher: Arc<FireDispatcher>) -> Self {
        Self {
            dispatcher,
            registry: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl TimingEngine for ManualEngine {
    fn name(&self) -> &'static str {
        "manual"
    }

    async fn start(&self) -> Result<(), SchedulerError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SchedulerError> {
        Ok(())
    }

    async fn register(&self, key: JobKey, schedule: Schedule) -> Result<(), SchedulerError> {
        let mut registry = self.registry.lock().await;
        if registry.contains_key(&key) {
            return Err(SchedulerError::JobAlreadyExists(key));
        }

        let mut registration = Registration::new(schedule);
        if let Schedule::Fixed { start_after, .. } = &registration.schedule {
            registration.next_due = chrono::Duration::from_std(*start_after)
                .ok()
                .map(|d| Utc::now() + d);
        }
        debug!(job = %key, "Registered with manual engine");
        registry.insert(key, registration);
        Ok(())
    }

    async fn pause(&self, key: &JobKey) -> Result<(), SchedulerError> {
        let mut registry = self.registry.lock().await;
        let registration = registry
            .get_mut(key)
            .ok_or_else(|| SchedulerError::JobNotFound(key.clone()))?;
        registration.state = EngineState::Paused;
        Ok(())
    }

    async fn resume(&self, key: &JobKey) -> Result<(), SchedulerError> {
        let mut registry = self.registry.lock().await;
        let registration = registry
            .get_mut(key)
            .ok_or_else(|| SchedulerError::JobNotFound(key.clone()))?;
        registration.state = EngineState::Active;
        Ok(())
    }

    async fn unregister(&self, key: &JobKey) -> Result<(), SchedulerError> {
        self.registry
            .lock()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| SchedulerError::JobNotFound(key.clone()))
    }

    async fn registered(&self, group: &str) -> Vec<RegisteredJob> {
        let registry = self.registry.lock().await;
        let mut jobs: Vec<RegisteredJob> = registry
            .iter()
            .filter(|(key, _)| key.group == group)
            .map(|(key, registration)| registration.snapshot(key))
            .collect();
        jobs.sort_by(|a, b| a.key.cmp(&b.key));
        jobs
    }

    async fn state(&self, key: &JobKey) -> Option<RegisteredJob> {
        self.registry
            .lock()
            .await
            .get(key)
            .map(|registration| registration.snapshot(key))
    }

    async fn fire_now(&self, key: &JobKey) -> Result<FireOutcome, SchedulerError> {
        // The registry lock must be released before dispatch: job bodies may
        // unregister their own key.
        let fire_number = {
            let mut registry = self.registry.lock().await;
            let registration = registry
                .get_mut(key)
                .ok_or_else(|| SchedulerError::JobNotFound(key.clone()))?;
            if !registration.can_fire() {
                return Ok(FireOutcome::Skipped);
            }
            registration.record_firing();
            registration.fired
        };

        Ok(self.dispatcher.on_fire(key.clone(), None, fire_number).await)
    }
}
