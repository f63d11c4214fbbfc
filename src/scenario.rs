//! Turns a [`ScenarioConfig`] into balancer nodes.
//!
//! Generation comes from the umbrella catalog, demand from self-consumption
//! plus a sampled EV charging profile. EV sampling draws from one `StdRng`
//! seeded with `simulation.seed`, node by node in configuration order, so a
//! scenario always produces the same nodes for the same seed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;

use crate::config::{BatteryConfig, EconomicsConfig, NodeConfig, PanelConfig, ScenarioConfig};
use crate::devices::umbrella::panel_daily_output_kwh;
use crate::devices::{
    BatterySpec, ChargingWindow, Environment, EvFleet, SelfConsumption, UmbrellaArray,
    UmbrellaType,
};
use crate::economics::{BatteryBackup, EconomicsInput, battery_backup};
use crate::error::EnergyError;
use crate::sim::engine::Engine;
use crate::sim::types::{DemandSplit, Node};

/// Derived inputs of one node, kept next to the node for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeProfile {
    pub node: Node,
    pub umbrella: UmbrellaType,
    pub umbrellas: u32,
    /// Installed capacity (kW).
    pub capacity_kw: f64,
}

impl NodeProfile {
    /// Self-consumption and EV parts of the node's demand.
    pub fn split(&self) -> Option<&DemandSplit> {
        self.node.demand_split.as_ref()
    }
}

/// A fully derived scenario ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub profiles: Vec<NodeProfile>,
    pub economics: EconomicsInput,
}

impl TryFrom<&EconomicsConfig> for EconomicsInput {
    type Error = EnergyError;

    fn try_from(e: &EconomicsConfig) -> Result<Self, Self::Error> {
        let panel_daily_kwh = e.panel.as_ref().map(panel_block_kwh).transpose()?;
        Ok(Self {
            price_per_kwh: e.price_per_kwh,
            co2_kg_per_kwh: e.co2_kg_per_kwh,
            loan_amount: e.loan_amount,
            interest_rate_pct: e.interest_rate_pct,
            loan_years: e.loan_years,
            ev_charging_revenue: e.ev_charging_revenue,
            energy_sales_revenue: e.energy_sales_revenue,
            days_autonomy: e.days_autonomy,
            panel_daily_kwh,
        })
    }
}

fn panel_block_kwh(p: &PanelConfig) -> Result<f64, EnergyError> {
    let per_unit = panel_daily_output_kwh(
        p.width_m,
        p.length_m,
        p.coverage_efficiency,
        p.panel_efficiency,
        p.irradiance_kwh_m2,
        p.system_losses,
    )?;
    Ok(per_unit * f64::from(p.units))
}

impl From<&BatteryConfig> for BatterySpec {
    fn from(b: &BatteryConfig) -> Self {
        let spec = BatterySpec::new(
            b.capacity_kwh,
            b.charge_efficiency,
            b.discharge_efficiency,
            b.max_charge_kw,
            b.max_discharge_kw,
        );
        match b.initial_kwh {
            Some(kwh) => spec.with_stored_kwh(kwh),
            None => spec,
        }
    }
}

impl Scenario {
    /// Derives generation and demand for every configured node.
    ///
    /// # Errors
    ///
    /// Returns the first node's `InvalidParameter` failure, wrapped with
    /// that node's id, or an unwrapped one for a bad panel block.
    pub fn build(cfg: &ScenarioConfig) -> Result<Self, EnergyError> {
        let mut rng = StdRng::seed_from_u64(cfg.simulation.seed);
        let window = ChargingWindow::from(&cfg.ev_window);

        let profiles = cfg
            .nodes
            .iter()
            .map(|n| {
                build_profile(n, cfg, window, &mut rng).map_err(|e| e.for_node(&n.id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            profiles,
            economics: EconomicsInput::try_from(&cfg.economics)?,
        })
    }

    /// Balancer inputs, in configuration order.
    pub fn nodes(&self) -> Vec<Node> {
        self.profiles.iter().map(|p| p.node.clone()).collect()
    }

    /// Engine over this scenario's nodes.
    pub fn engine(&self) -> Engine {
        Engine::new(self.nodes())
    }

    /// Autonomy of all batteries together against total daily demand,
    /// checked against the configured `days_autonomy`.
    pub fn battery_backup(&self) -> BatteryBackup {
        let usable: f64 = self.profiles.iter().map(|p| p.node.battery.usable_kwh()).sum();
        let demand: f64 = self.profiles.iter().map(|p| p.node.demand).sum();
        battery_backup(demand, usable, 1.0, self.economics.days_autonomy)
    }
}

fn build_profile(
    n: &NodeConfig,
    cfg: &ScenarioConfig,
    window: ChargingWindow,
    rng: &mut StdRng,
) -> Result<NodeProfile, EnergyError> {
    let environment = Environment {
        season: n.season_factor,
        weather: n.weather_factor,
        temperature: n.temperature_factor,
    };
    let array = UmbrellaArray::new(n.umbrella, n.umbrellas, environment);
    let generation = array.daily_generation_kwh(cfg.simulation.peak_sun_hours)?;

    let load = SelfConsumption {
        cooling_kwh: n.cooling_kwh,
        lighting_kwh: n.lighting_kwh,
        operations_kwh: n.operations_kwh,
    };
    let self_consumption_kwh = load.daily_kwh(n.umbrellas)?;

    let fleet = EvFleet::new(
        n.evs_per_umbrella,
        n.avg_kwh_per_ev,
        cfg.simulation.max_ev_charge_kw,
    )
    .with_window(window);
    let (profile, ev_demand_kwh) = fleet.daily_demand_kwh(n.umbrellas, rng)?;
    let scale = f64::from(n.umbrellas);
    let ev_hourly_kwh = profile.hourly_kwh.map(|kwh| kwh * scale);

    let node = Node::new(
        n.id.clone(),
        generation,
        self_consumption_kwh + ev_demand_kwh,
        BatterySpec::from(&n.battery),
    )
    .with_demand_split(DemandSplit {
        self_consumption_kwh,
        ev_kwh: ev_demand_kwh,
        ev_hourly_kwh,
    });
    node.validate()?;

    debug!(
        node = %node.id,
        generation_kwh = generation,
        self_kwh = self_consumption_kwh,
        ev_kwh = ev_demand_kwh,
        "node derived"
    );

    Ok(NodeProfile {
        node,
        umbrella: n.umbrella,
        umbrellas: n.umbrellas,
        capacity_kw: array.capacity_kw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn baseline_builds_three_nodes() {
        let scenario = Scenario::build(&ScenarioConfig::baseline()).unwrap();
        let ids: Vec<&str> = scenario.profiles.iter().map(|p| p.node.id.as_str()).collect();
        assert_eq!(ids, ["terraza-1", "terraza-2", "terraza-3"]);
    }

    #[test]
    fn generation_follows_catalog() {
        let scenario = Scenario::build(&ScenarioConfig::baseline()).unwrap();
        // 2 x 4.0 kW * 5 h * (1.0 * 0.9 * 0.95)
        let t1 = &scenario.profiles[0];
        assert!((t1.node.generation - 34.2).abs() < EPS);
        assert!((t1.capacity_kw - 8.0).abs() < EPS);
        // 2 x 3.3 kWh self-consumption
        assert!((t1.split().unwrap().self_consumption_kwh - 6.6).abs() < EPS);
    }

    #[test]
    fn ev_demand_is_avg_energy_when_uncapped() {
        // 8 kWh over >= 7 hours never hits the 7 kW cap
        let scenario = Scenario::build(&ScenarioConfig::baseline()).unwrap();
        let t2 = &scenario.profiles[1];
        let split = t2.split().unwrap();
        assert!((split.ev_kwh - 32.0).abs() < 1e-6);
        let hourly: f64 = split.ev_hourly_kwh.iter().sum();
        assert!((hourly - split.ev_kwh).abs() < 1e-6);
        assert!((t2.node.demand - (6.6 + 32.0)).abs() < 1e-6);
    }

    #[test]
    fn node_without_evs_has_flat_profile() {
        let scenario = Scenario::build(&ScenarioConfig::baseline()).unwrap();
        let split = scenario.profiles[2].split().unwrap();
        assert_eq!(split.ev_kwh, 0.0);
        assert!(split.ev_hourly_kwh.iter().all(|&k| k == 0.0));
    }

    #[test]
    fn same_seed_same_nodes() {
        let cfg = ScenarioConfig::ev_rush();
        let a = Scenario::build(&cfg).unwrap();
        let b = Scenario::build(&cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn battery_initial_kwh_is_carried() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.nodes[0].battery.initial_kwh = Some(1.5);
        let scenario = Scenario::build(&cfg).unwrap();
        assert_eq!(scenario.profiles[0].node.battery.initial_stored_kwh(), 1.5);
        assert_eq!(scenario.profiles[1].node.battery.initial_stored_kwh(), 5.0);
    }

    #[test]
    fn invalid_node_error_names_node() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.nodes[1].weather_factor = -0.5;
        let err = Scenario::build(&cfg).unwrap_err();
        assert!(matches!(&err, EnergyError::Node { id, .. } if id == "terraza-2"));
        assert_eq!(err.field(), Some("weather_factor"));
    }

    #[test]
    fn baseline_runs_end_to_end() {
        let scenario = Scenario::build(&ScenarioConfig::baseline()).unwrap();
        let report = scenario.engine().run().unwrap();
        assert_eq!(report.nodes.len(), 3);
        assert!(report.summary.transferred_kwh > 0.0);
    }

    #[test]
    fn backup_uses_all_batteries() {
        let scenario = Scenario::build(&ScenarioConfig::baseline()).unwrap();
        let backup = scenario.battery_backup();
        // three 10 kWh batteries at 0.9 discharge efficiency
        assert!((backup.usable_kwh - 27.0).abs() < EPS);
        assert!(!backup.meets_autonomy);
    }

    #[test]
    fn backup_checks_configured_autonomy() {
        // 27 kWh usable against 64.5 kWh/day covers about 0.42 days
        let mut cfg = ScenarioConfig::baseline();
        cfg.economics.days_autonomy = 0.2;
        let scenario = Scenario::build(&cfg).unwrap();
        assert_eq!(scenario.economics.days_autonomy, 0.2);
        assert!(scenario.battery_backup().meets_autonomy);
    }

    #[test]
    fn split_flows_into_report() {
        let scenario = Scenario::build(&ScenarioConfig::baseline()).unwrap();
        let report = scenario.engine().run().unwrap();
        let t2 = &report.nodes[1];
        assert!((t2.self_consumption + t2.ev_demand - t2.demand).abs() < 1e-9);
        assert!((t2.ev_demand - 32.0).abs() < 1e-6);
        assert!(t2.ev_hourly_kwh.is_some());
        assert!((report.summary.total_ev_demand_kwh - 48.0).abs() < 1e-6);
        assert!((report.summary.total_self_consumption_kwh - 16.5).abs() < 1e-9);
    }

    #[test]
    fn panel_block_sizes_economics() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.economics.panel = Some(PanelConfig {
            units: 2,
            ..PanelConfig::default()
        });
        let scenario = Scenario::build(&cfg).unwrap();
        // 4 x 4 m * 0.85 * 0.20 * 5.0 * 0.85 = 11.56 kWh per canopy
        let daily = scenario.economics.panel_daily_kwh.unwrap();
        assert!((daily - 23.12).abs() < 1e-9);
    }

    #[test]
    fn bad_panel_block_rejected() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.economics.panel = Some(PanelConfig {
            width_m: 0.0,
            ..PanelConfig::default()
        });
        let err = Scenario::build(&cfg).unwrap_err();
        assert_eq!(err.field(), Some("width_m"));
    }
}
