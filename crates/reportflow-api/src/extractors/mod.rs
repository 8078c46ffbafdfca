//! Custom Axum extractors.

pub mod family;
pub mod json;
pub mod path;

pub use family::JobFamily;
pub use json::ValidatedJson;
pub use path::parse_job_id;
