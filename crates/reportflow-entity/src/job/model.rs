//! Scheduled job entity model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reportflow_core::types::{JobId, SubscriberId};

use super::log::NewJobLog;
use super::payload::{JobKind, ReportPayload};
use super::status::{JobLogStatus, JobStatus};

/// How often and when a job fires, as requested by the subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpec {
    /// Number of firings for a fixed, bounded schedule.
    pub total_fire_count: i32,
    /// Repeat the fixed schedule indefinitely.
    pub run_forever: bool,
    /// Milliseconds between fixed-schedule firings.
    pub repeat_interval_ms: i64,
    /// Milliseconds before the first firing.
    pub initial_offset_ms: i64,
    /// Cron expression; when present it alone governs recurrence.
    pub cron: Option<String>,
}

/// A scheduled report job together with its mutable counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobInformation {
    /// Job identifier, also the job's name in the timing engine.
    pub id: JobId,
    /// Owning subscriber.
    pub subscriber_id: SubscriberId,
    /// Job family discriminator.
    pub job_type: JobKind,
    /// Human-readable name.
    pub name: String,
    /// Requested number of firings (fixed, bounded schedules only).
    pub total_fire_count: i32,
    /// Firings left. Only the fire-count listener moves this.
    pub remaining_fire_count: i32,
    /// Repeat forever at `repeat_interval_ms`.
    pub run_forever: bool,
    /// Milliseconds between fixed-schedule firings.
    pub repeat_interval_ms: i64,
    /// Milliseconds before the first firing.
    pub initial_offset_ms: i64,
    /// Cron expression, `None` for fixed schedules.
    pub cron: Option<String>,
    /// Lifecycle status.
    pub status: JobStatus,
    /// Soft-delete flag.
    pub active: bool,
    /// Family-specific settings.
    #[sqlx(json)]
    pub payload: ReportPayload,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

impl JobInformation {
    /// Build a new job in `CREATED` status with a full fire count.
    ///
    /// A blank cron expression is treated as absent.
    pub fn new(
        subscriber_id: SubscriberId,
        name: impl Into<String>,
        trigger: TriggerSpec,
        payload: ReportPayload,
    ) -> Self {
        let now = Utc::now();
        let cron = trigger
            .cron
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Self {
            id: JobId::new(),
            subscriber_id,
            job_type: payload.kind(),
            name: name.into(),
            total_fire_count: trigger.total_fire_count,
            remaining_fire_count: trigger.total_fire_count.max(0),
            run_forever: trigger.run_forever,
            repeat_interval_ms: trigger.repeat_interval_ms,
            initial_offset_ms: trigger.initial_offset_ms,
            cron,
            status: JobStatus::Created,
            active: true,
            payload,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recurrence is governed by a cron expression.
    pub fn is_cron_based(&self) -> bool {
        self.cron.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    /// Firings are bounded by `remaining_fire_count`.
    ///
    /// True only for fixed schedules that do not run forever; cron jobs and
    /// forever jobs never consume their count.
    pub fn is_fire_count_based(&self) -> bool {
        !self.run_forever && !self.is_cron_based()
    }

    /// A fire-count job with nothing left to fire.
    pub fn is_exhausted(&self) -> bool {
        self.is_fire_count_based() && self.remaining_fire_count <= 0
    }

    /// Number of firings already consumed by a fire-count job.
    pub fn fired_count(&self) -> i32 {
        (self.total_fire_count - self.remaining_fire_count).max(0)
    }

    /// Engine group for this job's family.
    pub fn group(&self) -> &'static str {
        self.job_type.group()
    }

    /// The job's schedule fields, as originally requested.
    pub fn trigger(&self) -> TriggerSpec {
        TriggerSpec {
            total_fire_count: self.total_fire_count,
            run_forever: self.run_forever,
            repeat_interval_ms: self.repeat_interval_ms,
            initial_offset_ms: self.initial_offset_ms,
            cron: self.cron.clone(),
        }
    }

    /// Start a monitoring entry that belongs to this job.
    ///
    /// This is the only way to construct a [`NewJobLog`]; it fixes the
    /// entry's back-reference to `self.id`.
    pub fn log_entry(&self, status: JobLogStatus, message: impl Into<String>) -> NewJobLog {
        NewJobLog::new(self.id, status, message.into(), HashMap::new())
    }
}
