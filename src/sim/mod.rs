/// Single-node battery balancing.
pub mod balance;
pub mod engine;
pub mod kpi;
/// Proportional peer redistribution of surplus energy.
pub mod redistribution;
pub mod types;
