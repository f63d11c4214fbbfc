use serde::{Deserialize, Serialize};

use crate::error::{EnergyError, ensure_efficiency, ensure_non_negative, ensure_positive};

/// Battery parameters attached to one umbrella node.
///
/// `BatterySpec` is a value type: it never holds the live state of charge
/// between runs. The starting charge is `stored_kwh` (or half of the
/// capacity when unset) and the balancer returns the updated value.
///
/// A capacity of zero models a node without storage. Rates still gate how
/// much of a surplus or deficit interacts with the battery in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySpec {
    /// Maximum stored energy in kWh (0 = no battery).
    pub capacity_kwh: f64,

    /// Starting state of charge in kWh. `None` means half of capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_kwh: Option<f64>,

    /// Fraction of charging energy that ends up stored, in `(0, 1]`.
    pub charge_efficiency: f64,

    /// Fraction of drawn energy that reaches the load, in `(0, 1]`.
    pub discharge_efficiency: f64,

    /// Charge power limit in kW.
    pub max_charge_kw: f64,

    /// Discharge power limit in kW.
    pub max_discharge_kw: f64,
}

/// Result of pushing surplus energy into the battery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeStep {
    /// Surplus taken by the charger (before efficiency losses).
    pub charge_power: f64,
    /// State of charge after charging.
    pub stored_kwh: f64,
}

/// Result of drawing energy from the battery to cover a deficit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DischargeStep {
    /// Energy delivered to the load.
    pub discharge_power: f64,
    /// State of charge after discharging.
    pub stored_kwh: f64,
}

impl Default for BatterySpec {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            stored_kwh: None,
            charge_efficiency: 0.9,
            discharge_efficiency: 0.9,
            max_charge_kw: 5.0,
            max_discharge_kw: 5.0,
        }
    }
}

impl BatterySpec {
    /// Creates a battery spec with the starting charge left at its default.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Capacity in kWh (0 for no storage)
    /// * `charge_efficiency` - Charging efficiency in (0, 1]
    /// * `discharge_efficiency` - Discharging efficiency in (0, 1]
    /// * `max_charge_kw` - Charge rate limit in kW
    /// * `max_discharge_kw` - Discharge rate limit in kW
    pub fn new(
        capacity_kwh: f64,
        charge_efficiency: f64,
        discharge_efficiency: f64,
        max_charge_kw: f64,
        max_discharge_kw: f64,
    ) -> Self {
        Self {
            capacity_kwh,
            stored_kwh: None,
            charge_efficiency,
            discharge_efficiency,
            max_charge_kw,
            max_discharge_kw,
        }
    }

    /// Returns a copy with an explicit starting state of charge.
    pub fn with_stored_kwh(mut self, stored_kwh: f64) -> Self {
        self.stored_kwh = Some(stored_kwh);
        self
    }

    /// Starting state of charge in kWh.
    pub fn initial_stored_kwh(&self) -> f64 {
        self.stored_kwh.unwrap_or(self.capacity_kwh * 0.5)
    }

    /// Checks every parameter and the starting charge.
    ///
    /// # Errors
    ///
    /// Returns `EnergyError::InvalidParameter` on the first violated constraint.
    pub fn validate(&self) -> Result<(), EnergyError> {
        ensure_non_negative("battery_capacity", self.capacity_kwh)?;
        ensure_efficiency("charge_efficiency", self.charge_efficiency)?;
        ensure_efficiency("discharge_efficiency", self.discharge_efficiency)?;
        ensure_positive("max_charge_rate", self.max_charge_kw)?;
        ensure_positive("max_discharge_rate", self.max_discharge_kw)?;

        let stored = self.initial_stored_kwh();
        ensure_non_negative("stored_energy", stored)?;
        if stored > self.capacity_kwh {
            return Err(EnergyError::invalid(
                "stored_energy",
                format!(
                    "must be <= battery_capacity ({}), got {stored}",
                    self.capacity_kwh
                ),
            ));
        }
        Ok(())
    }

    /// Charges from a surplus, limited by the charge rate and capacity.
    ///
    /// Only the rate decides how much surplus the charger takes; capacity
    /// just caps the resulting state of charge.
    pub fn charge(&self, stored_kwh: f64, surplus_kwh: f64) -> ChargeStep {
        let charge_power = surplus_kwh.min(self.max_charge_kw);
        let charge_energy = charge_power * self.charge_efficiency;
        ChargeStep {
            charge_power,
            stored_kwh: (stored_kwh + charge_energy).min(self.capacity_kwh),
        }
    }

    /// Discharges to cover a deficit, limited by rate and stored energy.
    ///
    /// Drawing `discharge_power` costs `discharge_power / discharge_efficiency`
    /// from storage; the state of charge never drops below zero.
    pub fn discharge(&self, stored_kwh: f64, needed_kwh: f64) -> DischargeStep {
        let discharge_power = needed_kwh.min(self.max_discharge_kw).min(stored_kwh);
        let discharge_energy = discharge_power / self.discharge_efficiency;
        DischargeStep {
            discharge_power,
            stored_kwh: (stored_kwh - discharge_energy).max(0.0),
        }
    }

    /// Usable energy after discharge losses, in kWh.
    pub fn usable_kwh(&self) -> f64 {
        self.capacity_kwh * self.discharge_efficiency
    }
}
