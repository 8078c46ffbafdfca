//! Monitoring log.

pub mod service;

pub use service::MonitoringService;
