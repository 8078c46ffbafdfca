//! # reportflow-service
//!
//! Service layer for ReportFlow: job information, the monitoring log,
//! report execution and delivery notification.
//!
//! Every service receives its dependencies as `Arc`s when constructed.

pub mod job;
pub mod monitoring;
pub mod notification;
pub mod report;

pub use job::JobInformationService;
pub use monitoring::MonitoringService;
pub use notification::{Notifier, TracingNotifier};
pub use report::{JobExecutorService, JsonReportRenderer, ReportRenderer};
