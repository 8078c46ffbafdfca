//! Registration bookkeeping shared by the engines.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::key::JobKey;
use super::schedule::Schedule;

/// Whether a registered job is currently armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineState {
    /// Will fire when due.
    Active,
    /// Registered but suspended.
    Paused,
}

/// Snapshot of one registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredJob {
    /// Registration key.
    pub key: JobKey,
    /// Registered schedule.
    pub schedule: Schedule,
    /// Current state.
    pub state: EngineState,
    /// Firings the engine has delivered so far.
    pub fired: u64,
    /// Next expected firing, when known.
    pub next_fire_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub(crate) struct Registration {
    pub(crate) schedule: Schedule,
    pub(crate) state: EngineState,
    pub(crate) fired: u64,
    /// Engine-side job currently armed for this registration.
    pub(crate) armed: Option<Uuid>,
    /// When the armed fixed-schedule firing is due.
    pub(crate) next_due: Option<DateTime<Utc>>,
}

impl Registration {
    pub(crate) fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            state: EngineState::Active,
            fired: 0,
            armed: None,
            next_due: None,
        }
    }

    /// Firings left, `None` when unbounded.
    pub(crate) fn remaining_firings(&self) -> Option<u64> {
        self.schedule
            .total_firings()
            .map(|total| total.saturating_sub(self.fired))
    }

    pub(crate) fn can_fire(&self) -> bool {
        self.state == EngineState::Active && self.remaining_firings() != Some(0)
    }

    /// Count a delivered firing; returns whether another one is allowed.
    pub(crate) fn record_firing(&mut self) -> bool {
        self.fired += 1;
        self.remaining_firings() != Some(0)
    }

    pub(crate) fn snapshot(&self, key: &JobKey) -> RegisteredJob {
        let next_fire_at = match (&self.schedule, self.state) {
            (_, EngineState::Paused) => None,
            (Schedule::Cron { .. }, EngineState::Active) => {
                self.schedule.next_cron_fire_after(Utc::now())
            }
            (Schedule::Fixed { .. }, EngineState::Active) => self.next_due,
        };
        RegisteredJob {
            key: key.clone(),
            schedule: self.schedule.clone(),
            state: self.state,
            fired: self.fired,
            next_fire_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::schedule::Repeat;

    #[test]
    fn test_bounded_registration_runs_out() {
        let mut reg = Registration::new(Schedule::Fixed {
            start_after: Duration::ZERO,
            interval: Duration::from_millis(10),
            repeat: Repeat::Times(1),
        });
        assert!(reg.can_fire());
        assert!(reg.record_firing());
        assert!(!reg.record_firing());
        assert!(!reg.can_fire());
        assert_eq!(reg.remaining_firings(), Some(0));
    }

    #[test]
    fn test_paused_registration_cannot_fire() {
        let mut reg = Registration::new(Schedule::Fixed {
            start_after: Duration::ZERO,
            interval: Duration::from_millis(10),
            repeat: Repeat::Forever,
        });
        reg.state = EngineState::Paused;
        assert!(!reg.can_fire());
        assert_eq!(reg.snapshot(&JobKey::new("a", "g")).next_fire_at, None);
    }
}
