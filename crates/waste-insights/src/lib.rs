//! Insight engine for the neighborhood waste-collection dashboard.
//!
//! The [`insights`] module holds the pure classification engine. The other
//! modules cover what the dashboard service needs around it: loading
//! exports, headline summary figures, configuration, logging and errors.

pub mod config;
pub mod error;
pub mod insights;
pub mod records;
pub mod summary;
pub mod telemetry;
