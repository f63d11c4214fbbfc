//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use umbrella_grid::devices::BatterySpec;
use umbrella_grid::sim::types::Node;

/// Tolerance for kWh comparisons.
pub const EPS: f64 = 1e-9;

/// Lossless battery (capacity 5 kWh, 1 kW rates) starting at `stored` kWh.
pub fn ideal_battery(stored: f64) -> BatterySpec {
    BatterySpec::new(5.0, 1.0, 1.0, 1.0, 1.0).with_stored_kwh(stored)
}

/// Mixed group of surplus, deficit and neutral nodes.
pub fn mixed_group() -> Vec<Node> {
    vec![
        Node::new("sunny", 10.0, 2.0, ideal_battery(2.0)),
        Node::new("busy", 1.0, 6.0, ideal_battery(0.0)),
        Node::new("even", 3.0, 3.0, ideal_battery(1.0)),
        Node::new("bright", 7.0, 1.0, ideal_battery(4.5)),
        Node::new("dark", 0.0, 9.0, ideal_battery(0.5)),
    ]
}
