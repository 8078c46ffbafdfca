//! Convenience result type alias for ReportFlow.

use crate::error::AppError;

/// A specialized `Result` type for ReportFlow operations.
pub type AppResult<T> = Result<T, AppError>;
