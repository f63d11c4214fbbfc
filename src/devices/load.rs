use crate::error::{EnergyError, ensure_non_negative};

/// Daily self-consumption of one umbrella (cooling, lighting, operations).
///
/// All values are kWh per umbrella per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfConsumption {
    pub cooling_kwh: f64,
    pub lighting_kwh: f64,
    pub operations_kwh: f64,
}

impl Default for SelfConsumption {
    fn default() -> Self {
        Self {
            cooling_kwh: 2.5,
            lighting_kwh: 0.5,
            operations_kwh: 0.3,
        }
    }
}

impl SelfConsumption {
    /// Consumption of a single umbrella in kWh/day.
    pub fn per_umbrella_kwh(&self) -> f64 {
        self.cooling_kwh + self.lighting_kwh + self.operations_kwh
    }

    /// Consumption of `count` umbrellas in kWh/day.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if any component is negative or non-finite.
    pub fn daily_kwh(&self, count: u32) -> Result<f64, EnergyError> {
        ensure_non_negative("cooling_kwh", self.cooling_kwh)?;
        ensure_non_negative("lighting_kwh", self.lighting_kwh)?;
        ensure_non_negative("operations_kwh", self.operations_kwh)?;
        Ok(self.per_umbrella_kwh() * f64::from(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_per_umbrella() {
        let load = SelfConsumption::default();
        assert!((load.per_umbrella_kwh() - 3.3).abs() < 1e-9);
    }

    #[test]
    fn scales_with_count() {
        let load = SelfConsumption::default();
        assert!((load.daily_kwh(4).unwrap() - 13.2).abs() < 1e-9);
        assert_eq!(load.daily_kwh(0).unwrap(), 0.0);
    }

    #[test]
    fn negative_component_rejected() {
        let load = SelfConsumption {
            cooling_kwh: -1.0,
            ..SelfConsumption::default()
        };
        assert!(load.daily_kwh(1).is_err());
    }
}
