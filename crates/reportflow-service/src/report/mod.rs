//! Report generation.

pub mod executor;
pub mod renderer;

pub use executor::{JobExecutionError, JobExecutorService};
pub use renderer::{JsonReportRenderer, RenderedReport, ReportRenderer};
