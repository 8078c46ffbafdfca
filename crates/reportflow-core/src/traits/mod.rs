//! Collaborator traits defined in `reportflow-core` and implemented by
//! other crates.

pub mod storage;

pub use storage::StorageProvider;
