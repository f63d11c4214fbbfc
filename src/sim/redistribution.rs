//! Peer-to-peer redistribution of surplus energy to deficit nodes.
//!
//! A single proportional-share pass: each deficit node receives its share
//! of total deficit applied to total surplus, and each surplus node gives up
//! its share of total surplus applied to total deficit. Both reductions read
//! the same totals snapshot, so the result does not depend on node order.
//! When the pools differ, whatever is left over is reported as unserved
//! deficit or curtailed surplus.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{EnergyError, ensure_finite_total};

use super::types::{PeerPosition, Transfer};

/// Outcome of one redistribution pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Redistribution {
    /// Residual positions, in input order.
    pub positions: Vec<PeerPosition>,
    /// Per-edge flows from surplus to deficit nodes.
    pub transfers: Vec<Transfer>,
    /// Sum of surplus before the pass (kWh).
    pub total_surplus: f64,
    /// Sum of deficit before the pass (kWh).
    pub total_deficit: f64,
    /// Energy moved between nodes (kWh).
    pub transferred: f64,
}

impl Redistribution {
    fn passthrough(positions: &[PeerPosition], total_surplus: f64, total_deficit: f64) -> Self {
        Self {
            positions: positions.to_vec(),
            transfers: Vec::new(),
            total_surplus,
            total_deficit,
            transferred: 0.0,
        }
    }

    /// Flows keyed by `(source id, destination id)`.
    pub fn flows(&self) -> BTreeMap<(String, String), f64> {
        flow_map(&self.transfers)
    }

    /// Surplus left after the pass (curtailed energy).
    pub fn residual_surplus(&self) -> f64 {
        self.positions.iter().map(|p| p.surplus).sum()
    }

    /// Deficit left after the pass (unserved energy).
    pub fn residual_deficit(&self) -> f64 {
        self.positions.iter().map(|p| p.deficit).sum()
    }
}

/// Sums transfers per `(source id, destination id)` edge.
pub fn flow_map(transfers: &[Transfer]) -> BTreeMap<(String, String), f64> {
    let mut map = BTreeMap::new();
    for t in transfers {
        *map.entry((t.from.clone(), t.to.clone())).or_insert(0.0) += t.kwh;
    }
    map
}

/// Redistributes surplus to deficit nodes proportionally to need.
///
/// Nodes with neither surplus nor deficit pass through untouched. If either
/// pool is empty the input is returned unchanged with no transfers, which
/// also covers single-node groups.
///
/// # Errors
///
/// Returns `InvalidParameter` (wrapped with the node id) if a position has
/// a negative or non-finite value, or both surplus and deficit positive.
/// Returns a bare `InvalidParameter` if either group total overflows.
///
/// # Examples
///
/// ```
/// use umbrella_grid::sim::redistribution::redistribute;
/// use umbrella_grid::sim::types::PeerPosition;
///
/// let out = redistribute(&[
///     PeerPosition::surplus("s", 10.0),
///     PeerPosition::deficit("d", 20.0),
/// ])
/// .unwrap();
/// assert_eq!(out.positions[1].deficit, 10.0);
/// assert_eq!(out.transferred, 10.0);
/// ```
pub fn redistribute(positions: &[PeerPosition]) -> Result<Redistribution, EnergyError> {
    for p in positions {
        p.validate().map_err(|e| e.for_node(&p.id))?;
    }

    let total_surplus: f64 = positions.iter().map(|p| p.surplus).sum();
    let total_deficit: f64 = positions.iter().map(|p| p.deficit).sum();
    ensure_finite_total("surplus", total_surplus)?;
    ensure_finite_total("deficit", total_deficit)?;

    if total_surplus <= 0.0 || total_deficit <= 0.0 {
        debug!(
            total_surplus,
            total_deficit, "no redistribution: one pool is empty"
        );
        return Ok(Redistribution::passthrough(
            positions,
            total_surplus,
            total_deficit,
        ));
    }

    let residuals: Vec<PeerPosition> = positions
        .iter()
        .map(|p| {
            let surplus = if p.surplus > 0.0 {
                let share = p.surplus / total_surplus;
                (p.surplus - share * total_deficit).max(0.0)
            } else {
                p.surplus
            };
            let deficit = if p.deficit > 0.0 {
                let share = p.deficit / total_deficit;
                (p.deficit - share * total_surplus).max(0.0)
            } else {
                p.deficit
            };
            PeerPosition::new(p.id.clone(), surplus, deficit)
        })
        .collect();

    let given: Vec<(usize, f64)> = positions
        .iter()
        .zip(&residuals)
        .enumerate()
        .filter_map(|(i, (p, r))| {
            let g = p.surplus - r.surplus;
            (g > 0.0).then_some((i, g))
        })
        .collect();
    let absorbed: Vec<(usize, f64)> = positions
        .iter()
        .zip(&residuals)
        .enumerate()
        .filter_map(|(i, (p, r))| {
            let a = p.deficit - r.deficit;
            (a > 0.0).then_some((i, a))
        })
        .collect();

    let transferred: f64 = absorbed.iter().map(|(_, a)| a).sum();

    let mut transfers = Vec::with_capacity(given.len() * absorbed.len());
    if transferred > 0.0 {
        for &(si, g) in &given {
            for &(di, a) in &absorbed {
                transfers.push(Transfer {
                    from: positions[si].id.clone(),
                    to: positions[di].id.clone(),
                    kwh: g * a / transferred,
                });
            }
        }
    }

    debug!(
        total_surplus,
        total_deficit,
        transferred,
        edges = transfers.len(),
        "redistributed surplus"
    );

    Ok(Redistribution {
        positions: residuals,
        transfers,
        total_surplus,
        total_deficit,
        transferred,
    })
}
