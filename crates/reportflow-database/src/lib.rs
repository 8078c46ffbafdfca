//! # reportflow-database
//!
//! Job persistence for ReportFlow: the [`store`] contracts, PostgreSQL
//! repositories, in-memory stores, connection pooling and migrations.

pub mod backend;
pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use backend::Stores;
pub use connection::DatabasePool;
pub use store::{JobInformationStore, JobLogStore};
