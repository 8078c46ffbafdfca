//! In-process store implementations backed by `dashmap`.
//!
//! Nothing here survives a restart. Used for local runs and tests.

pub mod job_information;
pub mod job_log;

pub use job_information::MemoryJobInformationStore;
pub use job_log::MemoryJobLogStore;
