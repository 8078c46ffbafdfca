//! Request and response DTOs.

pub mod request;
pub mod response;

pub use request::CreateReportJobRequest;
pub use response::{ApiResponse, HealthResponse};
