//! Core simulation types: node inputs, balance outcomes, and peer positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::devices::BatterySpec;
use crate::devices::ev_charger::HOURS_PER_DAY;
use crate::error::{EnergyError, ensure_non_negative};

/// One umbrella cluster for a single daily snapshot.
///
/// `generation` and `demand` are produced upstream (see
/// [`crate::scenario`]); the core only balances them against the battery.
///
/// # Examples
///
/// ```
/// use umbrella_grid::devices::BatterySpec;
/// use umbrella_grid::sim::types::Node;
///
/// let node = Node::new("terraza-1", 12.0, 9.5, BatterySpec::default());
/// assert_eq!(node.battery.initial_stored_kwh(), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique id within one run.
    pub id: String,
    /// Energy produced in the period (kWh, >= 0).
    pub generation: f64,
    /// Self-consumption plus EV charging (kWh, >= 0).
    pub demand: f64,
    /// Battery parameters and starting state of charge.
    pub battery: BatterySpec,
    /// Optional breakdown of `demand` into site loads and EV charging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_split: Option<DemandSplit>,
}

impl Node {
    pub fn new(id: impl Into<String>, generation: f64, demand: f64, battery: BatterySpec) -> Self {
        Self {
            id: id.into(),
            generation,
            demand,
            battery,
            demand_split: None,
        }
    }

    /// Attaches a demand breakdown.
    pub fn with_demand_split(mut self, split: DemandSplit) -> Self {
        self.demand_split = Some(split);
        self
    }

    /// Returns a copy whose battery starts at `stored_kwh`.
    pub fn with_stored_energy(mut self, stored_kwh: f64) -> Self {
        self.battery.stored_kwh = Some(stored_kwh);
        self
    }

    /// Validates energy inputs and battery parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` on the first violated constraint.
    pub fn validate(&self) -> Result<(), EnergyError> {
        ensure_non_negative("generation", self.generation)?;
        ensure_non_negative("demand", self.demand)?;
        if let Some(split) = &self.demand_split {
            split.validate(self.demand)?;
        }
        self.battery.validate()
    }
}

/// Demand of one node split into site loads and EV charging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSplit {
    /// Cooling, lighting and operations (kWh).
    pub self_consumption_kwh: f64,
    /// EV charging (kWh).
    pub ev_kwh: f64,
    /// EV charging per hour of the day (kWh).
    pub ev_hourly_kwh: [f64; HOURS_PER_DAY],
}

impl DemandSplit {
    /// Checks signs and that both parts add up to `demand`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a negative part or a mismatched sum.
    pub fn validate(&self, demand: f64) -> Result<(), EnergyError> {
        ensure_non_negative("self_consumption", self.self_consumption_kwh)?;
        ensure_non_negative("ev_demand", self.ev_kwh)?;
        for &kwh in &self.ev_hourly_kwh {
            ensure_non_negative("ev_hourly", kwh)?;
        }
        let total = self.self_consumption_kwh + self.ev_kwh;
        if (total - demand).abs() > 1e-6 * demand.max(1.0) {
            return Err(EnergyError::invalid(
                "demand",
                format!("must equal self_consumption + ev_demand ({total}), got {demand}"),
            ));
        }
        Ok(())
    }
}

/// Result of balancing one node against its battery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceOutcome {
    /// `generation - demand` (kWh).
    pub net_energy: f64,
    /// Energy left after charging (kWh, >= 0).
    pub surplus: f64,
    /// Shortfall left after discharging (kWh, >= 0).
    pub deficit: f64,
    /// End-of-period state of charge (kWh).
    pub stored_energy_new: f64,
}

/// Surplus/deficit of one node as seen by the redistribution pass.
///
/// At most one of `surplus` and `deficit` is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerPosition {
    pub id: String,
    pub surplus: f64,
    pub deficit: f64,
}

impl PeerPosition {
    pub fn new(id: impl Into<String>, surplus: f64, deficit: f64) -> Self {
        Self {
            id: id.into(),
            surplus,
            deficit,
        }
    }

    /// Position of a node with spare energy.
    pub fn surplus(id: impl Into<String>, kwh: f64) -> Self {
        Self::new(id, kwh, 0.0)
    }

    /// Position of a node short of energy.
    pub fn deficit(id: impl Into<String>, kwh: f64) -> Self {
        Self::new(id, 0.0, kwh)
    }

    /// Checks signs, finiteness and mutual exclusivity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if either value is negative or non-finite,
    /// or if both are positive.
    pub fn validate(&self) -> Result<(), EnergyError> {
        ensure_non_negative("surplus", self.surplus)?;
        ensure_non_negative("deficit", self.deficit)?;
        if self.surplus > 0.0 && self.deficit > 0.0 {
            return Err(EnergyError::invalid(
                "surplus",
                format!(
                    "surplus ({}) and deficit ({}) cannot both be positive",
                    self.surplus, self.deficit
                ),
            ));
        }
        Ok(())
    }
}

/// Energy moved from one node to another in a redistribution pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub kwh: f64,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {:.3} kWh", self.from, self.to, self.kwh)
    }
}

/// Complete per-node record of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResult {
    pub id: String,
    /// Generation (kWh).
    pub generation: f64,
    /// Demand (kWh).
    pub demand: f64,
    /// Site loads part of `demand`; all of it when no split was given (kWh).
    pub self_consumption: f64,
    /// EV charging part of `demand` (kWh).
    pub ev_demand: f64,
    /// Hourly EV charging, when the node carried a split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ev_hourly_kwh: Option<[f64; HOURS_PER_DAY]>,
    /// Battery capacity (kWh).
    pub battery_capacity: f64,
    /// State of charge at the start of the period (kWh).
    pub battery_soc_start: f64,
    /// State of charge at the end of the period (kWh).
    pub battery_soc_end: f64,
    /// `generation - demand` (kWh).
    pub net_energy: f64,
    /// Surplus after the battery, before redistribution (kWh).
    pub surplus: f64,
    /// Deficit after the battery, before redistribution (kWh).
    pub deficit: f64,
    /// Energy received from peers (kWh).
    pub received: f64,
    /// Energy given to peers (kWh).
    pub given: f64,
    /// Surplus left after redistribution, i.e. curtailed (kWh).
    pub residual_surplus: f64,
    /// Deficit left after redistribution, i.e. unserved (kWh).
    pub residual_deficit: f64,
}

impl fmt::Display for NodeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<14} | gen={:>7.2} dem={:>7.2} (self={:.2} ev={:.2}) net={:>7.2} kWh | \
             SoC {:>6.2} -> {:>6.2} / {:.1} kWh | \
             surplus={:.2} deficit={:.2} | recv={:.2} give={:.2} | \
             residual(surplus={:.2}, deficit={:.2})",
            self.id,
            self.generation,
            self.demand,
            self.self_consumption,
            self.ev_demand,
            self.net_energy,
            self.battery_soc_start,
            self.battery_soc_end,
            self.battery_capacity,
            self.surplus,
            self.deficit,
            self.received,
            self.given,
            self.residual_surplus,
            self.residual_deficit,
        )
    }
}
