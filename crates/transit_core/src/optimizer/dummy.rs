use std::collections::HashMap;

use crate::oracle::TravelTimeOracle;

use super::{OptimizerOutput, OptimizerSnapshot, RouteOptimizer};

/// Returns every minibus's existing route plan unchanged and assigns
/// nothing. Used by tests that want to drive the engine without the
/// greedy insertion algorithm in the loop.
pub struct DummyOptimizer;

impl RouteOptimizer for DummyOptimizer {
    fn optimize(
        &self,
        snapshot: &OptimizerSnapshot,
        _oracle: &dyn TravelTimeOracle,
    ) -> OptimizerOutput {
        OptimizerOutput {
            route_plans: snapshot
                .minibuses
                .iter()
                .map(|mb| (mb.minibus, mb.route_plan.clone()))
                .collect(),
            assignments: HashMap::new(),
        }
    }
}
