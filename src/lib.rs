//! Daily energy balancer for groups of solar umbrella nodes.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod devices;
pub mod economics;
pub mod error;
/// CSV and JSON export of run results.
pub mod io;
pub mod scenario;
/// Balancing engine, redistribution and run summary.
pub mod sim;
