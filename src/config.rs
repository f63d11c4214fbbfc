//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::devices::{ChargingWindow, UmbrellaType};
use crate::error::EnergyError;

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Period-level parameters shared by all nodes.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// EV arrival and departure windows.
    #[serde(default)]
    pub ev_window: EvWindowConfig,
    /// Prices, emission factor and financing.
    #[serde(default)]
    pub economics: EconomicsConfig,
    /// Umbrella nodes (terrazas) in the group.
    #[serde(default = "default_nodes")]
    pub nodes: Vec<NodeConfig>,
}

/// Period-level parameters shared by all nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Peak sun hours for the day (kWh per installed kW).
    pub peak_sun_hours: f64,
    /// Seed for EV arrival sampling.
    pub seed: u64,
    /// Charger power limit per EV (kW).
    pub max_ev_charge_kw: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            peak_sun_hours: 5.0,
            seed: 42,
            max_ev_charge_kw: 7.0,
        }
    }
}

/// EV arrival and departure windows (hours, inclusive).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvWindowConfig {
    pub arrival_start: usize,
    pub arrival_end: usize,
    pub departure_start: usize,
    pub departure_end: usize,
}

impl From<&EvWindowConfig> for ChargingWindow {
    fn from(w: &EvWindowConfig) -> Self {
        Self {
            arrival_start: w.arrival_start,
            arrival_end: w.arrival_end,
            departure_start: w.departure_start,
            departure_end: w.departure_end,
        }
    }
}

impl Default for EvWindowConfig {
    fn default() -> Self {
        Self {
            arrival_start: 8,
            arrival_end: 10,
            departure_start: 17,
            departure_end: 20,
        }
    }
}

/// Prices, emission factor and financing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicsConfig {
    /// Grid electricity price per kWh.
    pub price_per_kwh: f64,
    /// Grid emission factor (kg CO2 per kWh).
    pub co2_kg_per_kwh: f64,
    /// Loan principal.
    pub loan_amount: f64,
    /// Annual interest rate in percent.
    pub interest_rate_pct: f64,
    /// Loan term in years.
    pub loan_years: u32,
    /// Yearly EV charging revenue.
    pub ev_charging_revenue: f64,
    /// Yearly energy sales revenue.
    pub energy_sales_revenue: f64,
    /// Days the batteries should carry the site without sun.
    pub days_autonomy: f64,
    /// Optional single-canopy sizing from panel geometry.
    pub panel: Option<PanelConfig>,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            price_per_kwh: 0.25,
            co2_kg_per_kwh: 0.3,
            loan_amount: 7000.0,
            interest_rate_pct: 5.0,
            loan_years: 10,
            ev_charging_revenue: 1000.0,
            energy_sales_revenue: 2000.0,
            days_autonomy: 2.0,
            panel: None,
        }
    }
}

/// Panel geometry of a canopy sized from its dimensions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    pub width_m: f64,
    pub length_m: f64,
    /// Share of the canopy covered by cells (0.0–1.0).
    pub coverage_efficiency: f64,
    /// Cell efficiency (0.0–1.0).
    pub panel_efficiency: f64,
    /// Daily irradiance (kWh/m²).
    pub irradiance_kwh_m2: f64,
    /// Inverter and wiring losses factor (0.0–1.0).
    pub system_losses: f64,
    /// Number of identical canopies.
    pub units: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width_m: 4.0,
            length_m: 4.0,
            coverage_efficiency: 0.85,
            panel_efficiency: 0.20,
            irradiance_kwh_m2: 5.0,
            system_losses: 0.85,
            units: 1,
        }
    }
}

/// One umbrella node.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Unique node id.
    pub id: String,
    /// Umbrella model installed at this node.
    pub umbrella: UmbrellaType,
    /// Number of umbrellas.
    pub umbrellas: u32,
    /// Seasonal derating factor.
    pub season_factor: f64,
    /// Weather derating factor.
    pub weather_factor: f64,
    /// Temperature efficiency factor.
    pub temperature_factor: f64,
    /// Cooling consumption per umbrella (kWh/day).
    pub cooling_kwh: f64,
    /// Lighting consumption per umbrella (kWh/day).
    pub lighting_kwh: f64,
    /// Operations consumption per umbrella (kWh/day).
    pub operations_kwh: f64,
    /// EVs charging at each umbrella.
    pub evs_per_umbrella: u32,
    /// Average daily energy per EV (kWh).
    pub avg_kwh_per_ev: f64,
    /// Battery parameters.
    pub battery: BatteryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            umbrella: UmbrellaType::Fixed4x4,
            umbrellas: 1,
            season_factor: 1.0,
            weather_factor: 0.9,
            temperature_factor: 0.95,
            cooling_kwh: 2.5,
            lighting_kwh: 0.5,
            operations_kwh: 0.3,
            evs_per_umbrella: 1,
            avg_kwh_per_ev: 8.0,
            battery: BatteryConfig::default(),
        }
    }
}

impl NodeConfig {
    fn named(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

/// Battery storage parameters of one node.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Total energy capacity (kWh, 0 = no battery).
    pub capacity_kwh: f64,
    /// Starting state of charge (kWh). Defaults to half of capacity.
    pub initial_kwh: Option<f64>,
    /// Charge efficiency (0.0–1.0].
    pub charge_efficiency: f64,
    /// Discharge efficiency (0.0–1.0].
    pub discharge_efficiency: f64,
    /// Maximum charging power (kW).
    pub max_charge_kw: f64,
    /// Maximum discharging power (kW).
    pub max_discharge_kw: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            initial_kwh: None,
            charge_efficiency: 0.9,
            discharge_efficiency: 0.9,
            max_charge_kw: 5.0,
            max_discharge_kw: 5.0,
        }
    }
}

fn default_nodes() -> Vec<NodeConfig> {
    vec![
        NodeConfig {
            umbrella: UmbrellaType::Fixed5x5,
            umbrellas: 2,
            ..NodeConfig::named("terraza-1")
        },
        NodeConfig {
            umbrella: UmbrellaType::Fixed3x3,
            umbrellas: 2,
            evs_per_umbrella: 2,
            ..NodeConfig::named("terraza-2")
        },
        NodeConfig {
            umbrella: UmbrellaType::FoldableComplex,
            evs_per_umbrella: 0,
            ..NodeConfig::named("terraza-3")
        },
    ]
}

/// Configuration error with field path and constraint description.
#[derive(Debug, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"nodes[1].battery.capacity_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: three terrazas, one of them EV-heavy.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            ev_window: EvWindowConfig::default(),
            economics: EconomicsConfig::default(),
            nodes: default_nodes(),
        }
    }

    /// Returns the sunny-plaza preset: long sun, large canopies, few EVs.
    pub fn sunny_plaza() -> Self {
        Self {
            simulation: SimulationConfig {
                peak_sun_hours: 7.0,
                ..SimulationConfig::default()
            },
            nodes: vec![
                NodeConfig {
                    umbrella: UmbrellaType::Fixed5x5,
                    umbrellas: 4,
                    season_factor: 1.2,
                    evs_per_umbrella: 0,
                    ..NodeConfig::named("plaza-north")
                },
                NodeConfig {
                    umbrella: UmbrellaType::Fixed5x5,
                    umbrellas: 3,
                    season_factor: 1.2,
                    ..NodeConfig::named("plaza-south")
                },
                NodeConfig {
                    umbrella: UmbrellaType::FoldableSimple,
                    umbrellas: 2,
                    evs_per_umbrella: 2,
                    avg_kwh_per_ev: 12.0,
                    ..NodeConfig::named("cafe-corner")
                },
            ],
            ..Self::baseline()
        }
    }

    /// Returns the EV-rush preset: short winter sun, many EVs, small batteries.
    pub fn ev_rush() -> Self {
        let small_battery = BatteryConfig {
            capacity_kwh: 5.0,
            max_charge_kw: 2.5,
            max_discharge_kw: 2.5,
            ..BatteryConfig::default()
        };
        Self {
            simulation: SimulationConfig {
                peak_sun_hours: 3.0,
                seed: 7,
                max_ev_charge_kw: 11.0,
            },
            nodes: vec![
                NodeConfig {
                    umbrella: UmbrellaType::Fixed4x4,
                    umbrellas: 3,
                    season_factor: 0.7,
                    evs_per_umbrella: 2,
                    avg_kwh_per_ev: 14.0,
                    battery: small_battery.clone(),
                    ..NodeConfig::named("mobility-hub")
                },
                NodeConfig {
                    umbrella: UmbrellaType::Fixed5x5,
                    umbrellas: 4,
                    season_factor: 0.7,
                    evs_per_umbrella: 0,
                    battery: small_battery.clone(),
                    ..NodeConfig::named("energy-backbone")
                },
                NodeConfig {
                    umbrella: UmbrellaType::FoldableSimple,
                    umbrellas: 2,
                    season_factor: 0.7,
                    evs_per_umbrella: 3,
                    avg_kwh_per_ev: 10.0,
                    battery: small_battery,
                    ..NodeConfig::named("ev-oasis")
                },
            ],
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "sunny_plaza", "ev_rush"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "sunny_plaza" => Ok(Self::sunny_plaza()),
            "ev_rush" => Ok(Self::ev_rush()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if !s.peak_sun_hours.is_finite() || s.peak_sun_hours < 0.0 {
            errors.push(ConfigError::new("simulation.peak_sun_hours", "must be >= 0"));
        }
        if !s.max_ev_charge_kw.is_finite() || s.max_ev_charge_kw <= 0.0 {
            errors.push(ConfigError::new("simulation.max_ev_charge_kw", "must be > 0"));
        }

        if let Err(EnergyError::InvalidParameter { field, message }) =
            ChargingWindow::from(&self.ev_window).validate()
        {
            errors.push(ConfigError::new(format!("ev_window.{field}"), message));
        }

        let e = &self.economics;
        for (name, value) in [
            ("price_per_kwh", e.price_per_kwh),
            ("co2_kg_per_kwh", e.co2_kg_per_kwh),
            ("loan_amount", e.loan_amount),
            ("interest_rate_pct", e.interest_rate_pct),
            ("ev_charging_revenue", e.ev_charging_revenue),
            ("energy_sales_revenue", e.energy_sales_revenue),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(format!("economics.{name}"), "must be >= 0"));
            }
        }
        if e.loan_years == 0 {
            errors.push(ConfigError::new("economics.loan_years", "must be > 0"));
        }
        if !e.days_autonomy.is_finite() || e.days_autonomy <= 0.0 {
            errors.push(ConfigError::new("economics.days_autonomy", "must be > 0"));
        }
        if let Some(panel) = &e.panel {
            validate_panel(panel, "economics.panel", &mut errors);
        }

        if self.nodes.is_empty() {
            errors.push(ConfigError::new("nodes", "at least one node is required"));
        }

        let mut seen = HashSet::new();
        for (i, node) in self.nodes.iter().enumerate() {
            let path = format!("nodes[{i}]");
            if node.id.trim().is_empty() {
                errors.push(ConfigError::new(format!("{path}.id"), "must not be empty"));
            } else if !seen.insert(node.id.as_str()) {
                errors.push(ConfigError::new(
                    format!("{path}.id"),
                    format!("duplicate node id \"{}\"", node.id),
                ));
            }
            if node.umbrellas == 0 {
                errors.push(ConfigError::new(format!("{path}.umbrellas"), "must be > 0"));
            }
            for (name, value) in [
                ("season_factor", node.season_factor),
                ("weather_factor", node.weather_factor),
                ("temperature_factor", node.temperature_factor),
                ("cooling_kwh", node.cooling_kwh),
                ("lighting_kwh", node.lighting_kwh),
                ("operations_kwh", node.operations_kwh),
                ("avg_kwh_per_ev", node.avg_kwh_per_ev),
            ] {
                if !value.is_finite() || value < 0.0 {
                    errors.push(ConfigError::new(format!("{path}.{name}"), "must be >= 0"));
                }
            }
            validate_battery(&node.battery, &format!("{path}.battery"), &mut errors);
        }

        errors
    }
}

fn validate_panel(p: &PanelConfig, path: &str, errors: &mut Vec<ConfigError>) {
    for (name, value) in [("width_m", p.width_m), ("length_m", p.length_m)] {
        if !value.is_finite() || value <= 0.0 {
            errors.push(ConfigError::new(format!("{path}.{name}"), "must be > 0"));
        }
    }
    for (name, value) in [
        ("coverage_efficiency", p.coverage_efficiency),
        ("panel_efficiency", p.panel_efficiency),
        ("system_losses", p.system_losses),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::new(format!("{path}.{name}"), "must be in [0, 1]"));
        }
    }
    if !p.irradiance_kwh_m2.is_finite() || p.irradiance_kwh_m2 < 0.0 {
        errors.push(ConfigError::new(format!("{path}.irradiance_kwh_m2"), "must be >= 0"));
    }
    if p.units == 0 {
        errors.push(ConfigError::new(format!("{path}.units"), "must be > 0"));
    }
}

fn validate_battery(b: &BatteryConfig, path: &str, errors: &mut Vec<ConfigError>) {
    if !b.capacity_kwh.is_finite() || b.capacity_kwh < 0.0 {
        errors.push(ConfigError::new(format!("{path}.capacity_kwh"), "must be >= 0"));
    }
    if let Some(initial) = b.initial_kwh {
        if !(0.0..=b.capacity_kwh).contains(&initial) {
            errors.push(ConfigError::new(
                format!("{path}.initial_kwh"),
                "must be in [0, capacity_kwh]",
            ));
        }
    }
    for (name, value) in [
        ("charge_efficiency", b.charge_efficiency),
        ("discharge_efficiency", b.discharge_efficiency),
    ] {
        if !(value > 0.0 && value <= 1.0) {
            errors.push(ConfigError::new(format!("{path}.{name}"), "must be in (0, 1]"));
        }
    }
    for (name, value) in [
        ("max_charge_kw", b.max_charge_kw),
        ("max_discharge_kw", b.max_discharge_kw),
    ] {
        if !value.is_finite() || value <= 0.0 {
            errors.push(ConfigError::new(format!("{path}.{name}"), "must be > 0"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
        assert_eq!(cfg.nodes.len(), 3);
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
peak_sun_hours = 6.0
seed = 99
max_ev_charge_kw = 11.0

[ev_window]
arrival_start = 7
arrival_end = 9
departure_start = 16
departure_end = 19

[economics]
price_per_kwh = 0.30

[[nodes]]
id = "north"
umbrella = "5x5-fixed"
umbrellas = 3
evs_per_umbrella = 0

[nodes.battery]
capacity_kwh = 20.0
initial_kwh = 4.0

[[nodes]]
id = "south"
umbrella = "foldable-simple"
avg_kwh_per_ev = 12.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        let cfg = cfg.as_ref();
        assert_eq!(cfg.map(|c| c.simulation.seed), Some(99));
        assert_eq!(cfg.map(|c| c.nodes.len()), Some(2));
        assert_eq!(cfg.map(|c| c.nodes[0].umbrella), Some(UmbrellaType::Fixed5x5));
        assert_eq!(cfg.and_then(|c| c.nodes[0].battery.initial_kwh), Some(4.0));
        // unspecified battery keeps defaults
        assert_eq!(cfg.map(|c| c.nodes[1].battery.capacity_kwh), Some(10.0));
        assert_eq!(cfg.map(|c| c.validate().len()), Some(0));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
peak_sun_hours = 5.0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_umbrella_type_rejected() {
        let toml = r#"
[[nodes]]
id = "x"
umbrella = "giant"
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_default_nodes() {
        let toml = r#"
[simulation]
seed = 5
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(5));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.peak_sun_hours), Some(5.0));
        assert_eq!(cfg.as_ref().map(|c| c.nodes.len()), Some(3));
    }

    #[test]
    fn validation_catches_duplicate_ids() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.nodes[1].id = cfg.nodes[0].id.clone();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "nodes[1].id"));
    }

    #[test]
    fn validation_catches_zero_efficiency() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.nodes[2].battery.discharge_efficiency = 0.0;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "nodes[2].battery.discharge_efficiency")
        );
    }

    #[test]
    fn validation_catches_initial_above_capacity() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.nodes[0].battery.initial_kwh = Some(50.0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "nodes[0].battery.initial_kwh"));
    }

    #[test]
    fn validation_catches_inverted_arrival_window() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.ev_window.arrival_start = 12;
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].field, "ev_window.arrival_start");
    }

    #[test]
    fn validation_catches_departure_past_midnight() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.ev_window.departure_end = 30;
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].field, "ev_window.departure_end");
    }

    #[test]
    fn validation_catches_non_finite_economics() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.economics.price_per_kwh = f64::NAN;
        cfg.economics.co2_kg_per_kwh = -0.1;
        cfg.economics.interest_rate_pct = f64::INFINITY;
        cfg.economics.energy_sales_revenue = f64::NAN;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                "economics.price_per_kwh",
                "economics.co2_kg_per_kwh",
                "economics.interest_rate_pct",
                "economics.energy_sales_revenue",
            ]
        );
    }

    #[test]
    fn nan_price_in_toml_rejected() {
        let toml = r#"
[economics]
price_per_kwh = nan
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert!(
            cfg.validate()
                .iter()
                .any(|e| e.field == "economics.price_per_kwh")
        );
    }

    #[test]
    fn panel_block_parses_with_defaults() {
        let toml = r#"
[economics]
days_autonomy = 3.0

[economics.panel]
width_m = 5.0
units = 2
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.economics.days_autonomy, 3.0);
        let panel = cfg.economics.panel.as_ref().unwrap();
        assert_eq!(panel.width_m, 5.0);
        assert_eq!(panel.length_m, 4.0);
        assert_eq!(panel.units, 2);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_catches_bad_panel_and_autonomy() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.economics.days_autonomy = 0.0;
        cfg.economics.panel = Some(PanelConfig {
            coverage_efficiency: 1.5,
            units: 0,
            ..PanelConfig::default()
        });
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                "economics.days_autonomy",
                "economics.panel.coverage_efficiency",
                "economics.panel.units",
            ]
        );
    }

    #[test]
    fn validation_catches_empty_nodes() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.nodes.clear();
        assert!(cfg.validate().iter().any(|e| e.field == "nodes"));
    }

    #[test]
    fn sunny_plaza_has_more_sun() {
        let base = ScenarioConfig::baseline();
        let sunny = ScenarioConfig::sunny_plaza();
        assert!(sunny.simulation.peak_sun_hours > base.simulation.peak_sun_hours);
    }
}
