//! Post-hoc microgrid totals computed from per-node results.

use std::fmt;

use serde::Serialize;

use super::types::NodeResult;

/// Aggregate indicators of one run.
///
/// Computed post-hoc from `[NodeResult]` so reported totals always match
/// the per-node table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MicrogridSummary {
    /// Number of nodes in the group.
    pub node_count: usize,
    /// Total generation (kWh).
    pub total_generation_kwh: f64,
    /// Total demand (kWh).
    pub total_demand_kwh: f64,
    /// Site loads part of total demand (kWh).
    pub total_self_consumption_kwh: f64,
    /// EV charging part of total demand (kWh).
    pub total_ev_demand_kwh: f64,
    /// Surplus after local batteries, before redistribution (kWh).
    pub total_surplus_kwh: f64,
    /// Deficit after local batteries, before redistribution (kWh).
    pub total_deficit_kwh: f64,
    /// Energy moved between peers (kWh).
    pub transferred_kwh: f64,
    /// Deficit still uncovered after redistribution (kWh).
    pub unserved_deficit_kwh: f64,
    /// Surplus nobody could absorb (kWh).
    pub curtailed_surplus_kwh: f64,
    /// Mean end-of-day state of charge (kWh).
    pub avg_battery_soc_end_kwh: f64,
    /// Share of demand met without unserved energy (%).
    pub self_sufficiency_pct: f64,
}

impl MicrogridSummary {
    /// Computes all totals from the node records of a run.
    ///
    /// # Arguments
    ///
    /// * `results` - Per-node results of the run
    /// * `transferred_kwh` - Energy moved by the redistribution pass
    pub fn from_results(results: &[NodeResult], transferred_kwh: f64) -> Self {
        let mut generation = 0.0;
        let mut demand = 0.0;
        let mut self_consumption = 0.0;
        let mut ev_demand = 0.0;
        let mut surplus = 0.0;
        let mut deficit = 0.0;
        let mut unserved = 0.0;
        let mut curtailed = 0.0;
        let mut soc_sum = 0.0;

        for r in results {
            generation += r.generation;
            demand += r.demand;
            self_consumption += r.self_consumption;
            ev_demand += r.ev_demand;
            surplus += r.surplus;
            deficit += r.deficit;
            unserved += r.residual_deficit;
            curtailed += r.residual_surplus;
            soc_sum += r.battery_soc_end;
        }

        let avg_soc = if results.is_empty() {
            0.0
        } else {
            soc_sum / results.len() as f64
        };

        let self_sufficiency_pct = if demand > 0.0 {
            100.0 * ((demand - unserved) / demand).clamp(0.0, 1.0)
        } else {
            100.0
        };

        Self {
            node_count: results.len(),
            total_generation_kwh: generation,
            total_demand_kwh: demand,
            total_self_consumption_kwh: self_consumption,
            total_ev_demand_kwh: ev_demand,
            total_surplus_kwh: surplus,
            total_deficit_kwh: deficit,
            transferred_kwh,
            unserved_deficit_kwh: unserved,
            curtailed_surplus_kwh: curtailed,
            avg_battery_soc_end_kwh: avg_soc,
            self_sufficiency_pct,
        }
    }
}

impl fmt::Display for MicrogridSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Microgrid Summary ---")?;
        writeln!(f, "Nodes:                 {}", self.node_count)?;
        writeln!(f, "Total generation:      {:.2} kWh/day", self.total_generation_kwh)?;
        writeln!(f, "Total demand:          {:.2} kWh/day", self.total_demand_kwh)?;
        writeln!(f, "Total self-consumption: {:.2} kWh/day", self.total_self_consumption_kwh)?;
        writeln!(f, "Total EV demand:       {:.2} kWh/day", self.total_ev_demand_kwh)?;
        writeln!(f, "Total surplus:         {:.2} kWh/day", self.total_surplus_kwh)?;
        writeln!(f, "Total deficit:         {:.2} kWh/day", self.total_deficit_kwh)?;
        writeln!(f, "Peer transfers:        {:.2} kWh/day", self.transferred_kwh)?;
        writeln!(f, "Unserved deficit:      {:.2} kWh/day", self.unserved_deficit_kwh)?;
        writeln!(f, "Curtailed surplus:     {:.2} kWh/day", self.curtailed_surplus_kwh)?;
        writeln!(f, "Average battery SoC:   {:.2} kWh", self.avg_battery_soc_end_kwh)?;
        write!(f, "Self-sufficiency:      {:.1}%", self.self_sufficiency_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(id: &str, surplus: f64, deficit: f64, residual_deficit: f64) -> NodeResult {
        NodeResult {
            id: id.to_string(),
            generation: 10.0,
            demand: 8.0,
            self_consumption: 3.0,
            ev_demand: 5.0,
            ev_hourly_kwh: None,
            battery_capacity: 10.0,
            battery_soc_start: 5.0,
            battery_soc_end: 6.0,
            net_energy: 2.0,
            surplus,
            deficit,
            received: deficit - residual_deficit,
            given: 0.0,
            residual_surplus: surplus,
            residual_deficit,
        }
    }

    #[test]
    fn totals_add_up() {
        let results = vec![
            make_result("a", 3.0, 0.0, 0.0),
            make_result("b", 0.0, 4.0, 1.0),
        ];
        let s = MicrogridSummary::from_results(&results, 3.0);
        assert_eq!(s.node_count, 2);
        assert_eq!(s.total_generation_kwh, 20.0);
        assert_eq!(s.total_demand_kwh, 16.0);
        assert_eq!(s.total_self_consumption_kwh, 6.0);
        assert_eq!(s.total_ev_demand_kwh, 10.0);
        assert_eq!(s.total_surplus_kwh, 3.0);
        assert_eq!(s.total_deficit_kwh, 4.0);
        assert_eq!(s.unserved_deficit_kwh, 1.0);
        assert_eq!(s.avg_battery_soc_end_kwh, 6.0);
        assert!((s.self_sufficiency_pct - 93.75).abs() < 1e-9);
    }

    #[test]
    fn empty_results() {
        let s = MicrogridSummary::from_results(&[], 0.0);
        assert_eq!(s.node_count, 0);
        assert_eq!(s.avg_battery_soc_end_kwh, 0.0);
        assert_eq!(s.self_sufficiency_pct, 100.0);
    }

    #[test]
    fn display_has_summary_lines() {
        let s = MicrogridSummary::from_results(&[make_result("a", 1.0, 0.0, 0.0)], 0.0);
        let text = s.to_string();
        assert!(text.contains("Total generation:"));
        assert!(text.contains("Self-sufficiency:"));
        assert!(text.contains("Total self-consumption: 3.00 kWh/day"));
        assert!(text.contains("Total EV demand:       5.00 kWh/day"));
    }
}
