//! Concrete schedules understood by the timing engines.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// How many times a fixed schedule repeats after its first firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Repeat {
    /// Never stops.
    Forever,
    /// This many additional firings, so `Times(2)` fires three times.
    Times(u32),
}

/// When a registered job fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Schedule {
    /// Cron recurrence; six fields with seconds.
    Cron {
        /// Normalized expression.
        expression: String,
    },
    /// First firing after `start_after`, then every `interval`.
    Fixed {
        /// Delay before the first firing.
        start_after: Duration,
        /// Gap between firings.
        interval: Duration,
        /// Repeat policy.
        repeat: Repeat,
    },
}

impl Schedule {
    /// A cron schedule, validated and normalized.
    pub fn cron(expression: &str) -> Result<Self, SchedulerError> {
        let expression = normalize_cron_expression(expression);
        parse_cron(&expression)?;
        Ok(Self::Cron { expression })
    }

    /// Total firings the schedule allows, `None` if unbounded.
    pub fn total_firings(&self) -> Option<u64> {
        match self {
            Self::Fixed {
                repeat: Repeat::Times(n),
                ..
            } => Some(u64::from(*n) + 1),
            _ => None,
        }
    }

    /// Gap between fixed-schedule firings.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Self::Fixed { interval, .. } => Some(*interval),
            Self::Cron { .. } => None,
        }
    }

    /// Next cron occurrence strictly after `after`. Always `None` for fixed
    /// schedules, whose next firing depends on when the previous one ran.
    pub fn next_cron_fire_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Cron { expression } => parse_cron(expression)
                .ok()
                .and_then(|s| s.after(&after).next()),
            Self::Fixed { .. } => None,
        }
    }
}

/// Accept classic five-field expressions by pinning seconds to zero.
pub fn normalize_cron_expression(expression: &str) -> String {
    let trimmed = expression.split_whitespace().collect::<Vec<_>>().join(" ");
    if trimmed.split(' ').count() == 5 {
        format!("0 {trimmed}")
    } else {
        trimmed
    }
}

/// Parse a (normalized) cron expression.
pub fn parse_cron(expression: &str) -> Result<cron::Schedule, SchedulerError> {
    cron::Schedule::from_str(expression)
        .map_err(|e| SchedulerError::InvalidSchedule(format!("invalid cron expression '{expression}': {e}")))
}
