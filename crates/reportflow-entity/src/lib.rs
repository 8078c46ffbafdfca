//! # reportflow-entity
//!
//! Domain entity models for ReportFlow. Every struct in this crate
//! represents a database table row or a domain value object. Row types
//! derive `sqlx::FromRow`.

pub mod job;
