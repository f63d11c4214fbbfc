//! Per-node energy sources and loads that feed the daily balance.

/// Stationary battery storage model.
pub mod battery;
/// EV arrival sampling and hourly charging profile.
pub mod ev_charger;
pub mod load;
/// Solar umbrella catalog and generation model.
pub mod umbrella;

pub use battery::BatterySpec;
pub use ev_charger::{ChargingWindow, EvFleet, EvProfile};
pub use load::SelfConsumption;
pub use umbrella::{Environment, UmbrellaArray, UmbrellaType};
