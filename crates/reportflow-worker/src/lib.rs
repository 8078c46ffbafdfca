//! Scheduling engine for ReportFlow.
//!
//! This crate provides:
//! - The [`TimingEngine`] contract with a tokio-cron-scheduler backed engine
//!   and a manual engine driven by explicit `fire_now` calls
//! - The [`FireDispatcher`] every firing goes through, and its listeners
//! - [`JobSchedulerService`], turning stored jobs into engine registrations
//! - [`ReportJobService`], the per-family lifecycle and firing body

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod jobs;
pub mod listener;
pub mod scheduler;

pub use dispatch::{FireContext, FireDispatcher, FireOutcome, JobBody, TriggerListener};
pub use engine::{CronEngine, JobKey, ManualEngine, TimingEngine, build_engine};
pub use error::SchedulerError;
pub use jobs::{RecoveryReport, ReportJobService};
pub use listener::FireCountListener;
pub use scheduler::{JobSchedulerService, ScheduledJobView};
