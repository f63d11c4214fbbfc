//! Simulation engine: balances every node, then redistributes between peers.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{EnergyError, ensure_finite_total};

use super::balance::balance_node;
use super::kpi::MicrogridSummary;
use super::redistribution::{flow_map, redistribute};
use super::types::{BalanceOutcome, Node, NodeResult, PeerPosition, Transfer};

/// Full output of one daily-snapshot run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Per-node records, in input order.
    pub nodes: Vec<NodeResult>,
    /// Energy flows between peers.
    pub transfers: Vec<Transfer>,
    /// Aggregate totals.
    pub summary: MicrogridSummary,
}

impl RunReport {
    /// Flows keyed by `(source id, destination id)`.
    pub fn flows(&self) -> BTreeMap<(String, String), f64> {
        flow_map(&self.transfers)
    }

    /// Returns `nodes` with each battery starting at this run's end-of-day
    /// state of charge. Nodes absent from the report are left unchanged.
    pub fn carry_forward(&self, nodes: &[Node]) -> Vec<Node> {
        let soc: BTreeMap<&str, f64> = self
            .nodes
            .iter()
            .map(|r| (r.id.as_str(), r.battery_soc_end))
            .collect();
        nodes
            .iter()
            .map(|n| match soc.get(n.id.as_str()) {
                Some(&kwh) => n.clone().with_stored_energy(kwh),
                None => n.clone(),
            })
            .collect()
    }
}

/// Simulation engine owning the node group of one run.
///
/// Each call to [`Engine::run`] is an independent pure computation; the
/// engine keeps no state between runs.
#[derive(Debug, Clone)]
pub struct Engine {
    nodes: Vec<Node>,
}

impl Engine {
    /// Creates an engine for the given node group.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Nodes in this group, in input order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn check_unique_ids(&self) -> Result<(), EnergyError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(EnergyError::DuplicateNode {
                    id: node.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Balances every node against its own battery.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid node; the error carries that node's id.
    pub fn balance_all(&self) -> Result<Vec<BalanceOutcome>, EnergyError> {
        self.nodes
            .iter()
            .map(|n| balance_node(n).map_err(|e| e.for_node(&n.id)))
            .collect()
    }

    fn check_group_totals(&self) -> Result<(), EnergyError> {
        let generation: f64 = self.nodes.iter().map(|n| n.generation).sum();
        let demand: f64 = self.nodes.iter().map(|n| n.demand).sum();
        let capacity: f64 = self.nodes.iter().map(|n| n.battery.capacity_kwh).sum();
        ensure_finite_total("generation", generation)?;
        ensure_finite_total("demand", demand)?;
        ensure_finite_total("battery_capacity", capacity)
    }

    /// Runs the balancer on every node, then one redistribution pass.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNode` if two nodes share an id, the first node's
    /// `InvalidParameter` failure, or `InvalidParameter` if a group total
    /// overflows.
    pub fn run(&self) -> Result<RunReport, EnergyError> {
        self.check_unique_ids()?;
        let outcomes = self.balance_all()?;
        self.check_group_totals()?;

        let positions: Vec<PeerPosition> = self
            .nodes
            .iter()
            .zip(&outcomes)
            .map(|(n, o)| PeerPosition::new(n.id.clone(), o.surplus, o.deficit))
            .collect();
        let redistribution = redistribute(&positions)?;

        let results: Vec<NodeResult> = self
            .nodes
            .iter()
            .zip(&outcomes)
            .zip(&redistribution.positions)
            .map(|((node, outcome), residual)| {
                let (self_consumption, ev_demand, ev_hourly_kwh) = match &node.demand_split {
                    Some(split) => (
                        split.self_consumption_kwh,
                        split.ev_kwh,
                        Some(split.ev_hourly_kwh),
                    ),
                    None => (node.demand, 0.0, None),
                };
                let result = NodeResult {
                    id: node.id.clone(),
                    generation: node.generation,
                    demand: node.demand,
                    self_consumption,
                    ev_demand,
                    ev_hourly_kwh,
                    battery_capacity: node.battery.capacity_kwh,
                    battery_soc_start: node.battery.initial_stored_kwh(),
                    battery_soc_end: outcome.stored_energy_new,
                    net_energy: outcome.net_energy,
                    surplus: outcome.surplus,
                    deficit: outcome.deficit,
                    received: outcome.deficit - residual.deficit,
                    given: outcome.surplus - residual.surplus,
                    residual_surplus: residual.surplus,
                    residual_deficit: residual.deficit,
                };
                debug!(
                    node = %result.id,
                    net_kwh = result.net_energy,
                    surplus = result.surplus,
                    deficit = result.deficit,
                    soc_end = result.battery_soc_end,
                    "node balanced"
                );
                result
            })
            .collect();

        let summary = MicrogridSummary::from_results(&results, redistribution.transferred);
        info!(
            nodes = results.len(),
            generation_kwh = summary.total_generation_kwh,
            demand_kwh = summary.total_demand_kwh,
            transferred_kwh = summary.transferred_kwh,
            "run complete"
        );
        if summary.unserved_deficit_kwh > 0.0 {
            warn!(
                unserved_kwh = summary.unserved_deficit_kwh,
                "peer surplus could not cover every deficit"
            );
        }

        Ok(RunReport {
            nodes: results,
            transfers: redistribution.transfers,
            summary,
        })
    }
}
