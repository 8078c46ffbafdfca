//! PostgreSQL repository implementations of the job stores.

pub mod job_information;
pub mod job_log;

pub use job_information::JobInformationRepository;
pub use job_log::JobLogRepository;
