use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EnergyError, ensure_non_negative, ensure_positive};

/// Catalog of solar umbrella models and their installed PV capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UmbrellaType {
    /// Compact fixed canopy.
    #[serde(rename = "3x3-fixed")]
    Fixed3x3,
    /// Standard fixed canopy (~14.5 kWh/day at 5 peak sun hours).
    #[serde(rename = "4x4-fixed")]
    Fixed4x4,
    /// Large fixed canopy.
    #[serde(rename = "5x5-fixed")]
    Fixed5x5,
    /// Simple fold, sidewalk friendly.
    FoldableSimple,
    /// Complex fold, better wind and rain handling.
    FoldableComplex,
}

impl UmbrellaType {
    /// All catalog entries in display order.
    pub const ALL: [UmbrellaType; 5] = [
        Self::Fixed3x3,
        Self::Fixed4x4,
        Self::Fixed5x5,
        Self::FoldableSimple,
        Self::FoldableComplex,
    ];

    /// Installed PV capacity of one umbrella in kW.
    pub fn capacity_kw(self) -> f64 {
        match self {
            Self::Fixed3x3 => 1.8,
            Self::Fixed4x4 => 2.9,
            Self::Fixed5x5 => 4.0,
            Self::FoldableSimple => 3.0,
            Self::FoldableComplex => 3.4,
        }
    }

    /// Config key for this model (matches the serde name).
    pub fn key(self) -> &'static str {
        match self {
            Self::Fixed3x3 => "3x3-fixed",
            Self::Fixed4x4 => "4x4-fixed",
            Self::Fixed5x5 => "5x5-fixed",
            Self::FoldableSimple => "foldable-simple",
            Self::FoldableComplex => "foldable-complex",
        }
    }
}

impl fmt::Display for UmbrellaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Fixed3x3 => "3x3 Fixed",
            Self::Fixed4x4 => "4x4 Fixed",
            Self::Fixed5x5 => "5x5 Fixed",
            Self::FoldableSimple => "Foldable (Simple)",
            Self::FoldableComplex => "Foldable (Complex)",
        };
        f.write_str(label)
    }
}

/// Environmental derating applied to nameplate generation.
///
/// Each factor multiplies the daily yield; `1.0` means no effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    /// Seasonal irradiance adjustment.
    pub season: f64,
    /// Cloud and weather losses.
    pub weather: f64,
    /// Temperature-related panel efficiency.
    pub temperature: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            season: 1.0,
            weather: 0.9,
            temperature: 0.95,
        }
    }
}

impl Environment {
    /// Combined derating factor.
    pub fn factor(&self) -> f64 {
        self.season * self.weather * self.temperature
    }
}

/// A group of identical umbrellas installed at one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UmbrellaArray {
    pub umbrella: UmbrellaType,
    pub count: u32,
    pub environment: Environment,
}

impl UmbrellaArray {
    pub fn new(umbrella: UmbrellaType, count: u32, environment: Environment) -> Self {
        Self {
            umbrella,
            count,
            environment,
        }
    }

    /// Installed capacity of the whole array in kW.
    pub fn capacity_kw(&self) -> f64 {
        self.umbrella.capacity_kw() * f64::from(self.count)
    }

    /// Daily generation in kWh for the given peak sun hours.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `peak_sun_hours` or any environment
    /// factor is negative or non-finite.
    pub fn daily_generation_kwh(&self, peak_sun_hours: f64) -> Result<f64, EnergyError> {
        ensure_non_negative("peak_sun_hours", peak_sun_hours)?;
        ensure_non_negative("season_factor", self.environment.season)?;
        ensure_non_negative("weather_factor", self.environment.weather)?;
        ensure_non_negative("temperature_factor", self.environment.temperature)?;
        Ok(self.capacity_kw() * peak_sun_hours * self.environment.factor())
    }
}

/// Daily generation of a flat panel surface from its geometry.
///
/// Sizes a single canopy for the economics report's panel block.
///
/// # Errors
///
/// Returns `InvalidParameter` if any dimension or factor is negative.
pub fn panel_daily_output_kwh(
    width_m: f64,
    length_m: f64,
    coverage_efficiency: f64,
    panel_efficiency: f64,
    irradiance_kwh_m2: f64,
    system_losses: f64,
) -> Result<f64, EnergyError> {
    ensure_positive("width_m", width_m)?;
    ensure_positive("length_m", length_m)?;
    ensure_non_negative("coverage_efficiency", coverage_efficiency)?;
    ensure_non_negative("panel_efficiency", panel_efficiency)?;
    ensure_non_negative("irradiance", irradiance_kwh_m2)?;
    ensure_non_negative("system_losses", system_losses)?;

    let effective_area = width_m * length_m * coverage_efficiency;
    Ok(effective_area * panel_efficiency * irradiance_kwh_m2 * system_losses)
}
