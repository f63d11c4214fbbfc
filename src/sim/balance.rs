//! Per-node energy balance against local battery storage.

use tracing::trace;

use crate::error::EnergyError;

use super::types::{BalanceOutcome, Node};

/// Balances one node's generation and demand against its battery.
///
/// - Surplus (`net > 0`): the charger takes up to `max_charge_kw` of it;
///   whatever the rate limit leaves over is reported as surplus, even when
///   the battery still has headroom.
/// - Deficit (`net <= 0`): the battery delivers up to
///   `min(needed, max_discharge_kw, stored)`; the rest is reported as
///   deficit.
///
/// The node itself is not modified; persist `stored_energy_new` to carry the
/// state of charge into the next period.
///
/// # Errors
///
/// Returns `InvalidParameter` before computing anything if any input is
/// negative, non-finite, or out of range (including zero efficiencies).
///
/// # Examples
///
/// ```
/// use umbrella_grid::devices::BatterySpec;
/// use umbrella_grid::sim::balance::balance_node;
/// use umbrella_grid::sim::types::Node;
///
/// let battery = BatterySpec::new(5.0, 0.9, 0.9, 3.0, 3.0).with_stored_kwh(2.0);
/// let out = balance_node(&Node::new("a", 10.0, 4.0, battery)).unwrap();
/// assert_eq!(out.surplus, 3.0);
/// assert_eq!(out.deficit, 0.0);
/// ```
pub fn balance_node(node: &Node) -> Result<BalanceOutcome, EnergyError> {
    node.validate()?;

    let battery = &node.battery;
    let stored = battery.initial_stored_kwh();
    let net_energy = node.generation - node.demand;

    let outcome = if net_energy > 0.0 {
        let step = battery.charge(stored, net_energy);
        BalanceOutcome {
            net_energy,
            surplus: (net_energy - step.charge_power).max(0.0),
            deficit: 0.0,
            stored_energy_new: step.stored_kwh,
        }
    } else {
        let needed = node.demand - node.generation;
        let step = battery.discharge(stored, needed);
        BalanceOutcome {
            net_energy,
            surplus: 0.0,
            deficit: (needed - step.discharge_power).max(0.0),
            stored_energy_new: step.stored_kwh,
        }
    };

    trace!(
        node = %node.id,
        net_kwh = outcome.net_energy,
        soc_start = stored,
        soc_end = outcome.stored_energy_new,
        "balanced node"
    );

    Ok(outcome)
}
