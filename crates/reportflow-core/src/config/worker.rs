//! Timing engine and job execution configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing engine implementation driving the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// In-process tokio-cron-scheduler engine.
    #[default]
    Cron,
    /// Engine that only fires when told to, for externally driven firing.
    Manual,
}

/// Scheduler worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Engine implementation.
    #[serde(default)]
    pub engine: EngineKind,
    /// Upper bound for a single report execution; `0` disables the bound.
    #[serde(default = "default_execution_timeout")]
    pub execution_timeout_seconds: u64,
    /// Re-register persisted jobs with the engine at startup.
    #[serde(default = "default_true")]
    pub recover_on_startup: bool,
}

impl WorkerConfig {
    /// Execution timeout as a [`Duration`], `None` when disabled.
    pub fn execution_timeout(&self) -> Option<Duration> {
        (self.execution_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.execution_timeout_seconds))
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            execution_timeout_seconds: default_execution_timeout(),
            recover_on_startup: default_true(),
        }
    }
}

fn default_execution_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}
