//! Scheduled report job entities.

pub mod execution;
pub mod log;
pub mod model;
pub mod payload;
pub mod status;

pub use execution::{ExecutionStatus, JobExecutionDetails};
pub use log::{JobLog, NewJobLog};
pub use model::{JobInformation, TriggerSpec};
pub use payload::{JobKind, ReportPayload, ReportPeriod};
pub use status::{JobLogStatus, JobStatus};
