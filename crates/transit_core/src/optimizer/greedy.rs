//! Greedy-insertion optimizer: processes pending requests in input order,
//! always inserting pickup and dropoff as two brand-new stops and trying
//! every ordered position pair, never reusing an existing stop.

use std::collections::HashMap;

use log::{debug, warn};

use crate::oracle::TravelTimeOracle;

use super::{cumulative_cost, merge_consecutive, validate_plan};
use super::{MergedStop, MinibusSnapshot, OptimizerOutput, OptimizerSnapshot, RouteOptimizer};

pub struct GreedyInsertionOptimizer;

impl RouteOptimizer for GreedyInsertionOptimizer {
    fn optimize(
        &self,
        snapshot: &OptimizerSnapshot,
        oracle: &dyn TravelTimeOracle,
    ) -> OptimizerOutput {
        debug!(
            "greedy insertion: {} pending requests, {} minibuses",
            snapshot.pending.len(),
            snapshot.minibuses.len()
        );

        if snapshot.pending.is_empty() {
            let route_plans = snapshot
                .minibuses
                .iter()
                .map(|mb| (mb.minibus, mb.route_plan.clone()))
                .collect();
            return OptimizerOutput {
                route_plans,
                assignments: HashMap::new(),
            };
        }

        let mut working: Vec<WorkingVehicle> = snapshot
            .minibuses
            .iter()
            .map(WorkingVehicle::from_snapshot)
            .collect();
        let mut assignments = HashMap::new();

        for request in &snapshot.pending {
            let mut best: Option<(usize, Vec<MergedStop>, u64)> = None;

            for (idx, vehicle) in working.iter().enumerate() {
                if let Some((candidate, cost)) = try_insert_passenger(
                    &vehicle.route,
                    vehicle.capacity,
                    vehicle.initial_occupancy,
                    request,
                    snapshot.current_time,
                    oracle,
                ) {
                    let better = match &best {
                        None => true,
                        Some((_, _, best_cost)) => cost < *best_cost,
                    };
                    if better {
                        best = Some((idx, candidate, cost));
                    }
                }
            }

            match best {
                Some((idx, candidate, cost)) => {
                    working[idx].route = candidate;
                    assignments.insert(request.passenger, working[idx].minibus);
                    debug!(
                        "assigned passenger to minibus index {idx}, cumulative cost {cost}s"
                    );
                }
                None => {
                    warn!("could not assign passenger to any minibus this cycle");
                }
            }
        }

        let route_plans = working
            .into_iter()
            .map(|v| (v.minibus, merge_consecutive(&v.route)))
            .collect();

        OptimizerOutput {
            route_plans,
            assignments,
        }
    }
}

struct WorkingVehicle {
    minibus: bevy_ecs::prelude::Entity,
    capacity: usize,
    initial_occupancy: usize,
    route: Vec<MergedStop>,
}

impl WorkingVehicle {
    fn from_snapshot(snapshot: &MinibusSnapshot) -> Self {
        Self {
            minibus: snapshot.minibus,
            capacity: snapshot.capacity,
            initial_occupancy: snapshot.current_occupancy,
            route: snapshot.route_plan.clone(),
        }
    }
}

/// Try every `(pickup_pos, dropoff_pos)` insertion pair and keep the
/// cheapest feasible candidate. `route` is the vehicle's accumulated
/// working route — unmerged across requests within one optimization cycle,
/// matching the reference implementation's "merge only at output" rule.
fn try_insert_passenger(
    route: &[MergedStop],
    capacity: usize,
    initial_occupancy: usize,
    request: &super::PendingRequest,
    current_time: u64,
    oracle: &dyn TravelTimeOracle,
) -> Option<(Vec<MergedStop>, u64)> {
    let mut best: Option<(Vec<MergedStop>, u64)> = None;

    for pickup_pos in 0..=route.len() {
        for dropoff_pos in (pickup_pos + 1)..=(route.len() + 1) {
            let mut candidate = route.to_vec();
            candidate.insert(
                pickup_pos,
                MergedStop::pickup_only(request.origin, request.origin_index, request.passenger),
            );
            candidate.insert(
                dropoff_pos,
                MergedStop::dropoff_only(
                    request.destination,
                    request.destination_index,
                    request.passenger,
                ),
            );

            let merged = merge_consecutive(&candidate);
            if validate_plan(&merged, capacity, initial_occupancy).is_err() {
                continue;
            }

            let cost = match cumulative_cost(&candidate, current_time, oracle) {
                Ok(c) => c,
                Err(_) => continue,
            };

            let better = match &best {
                None => true,
                Some((_, best_cost)) => cost < *best_cost,
            };
            if better {
                best = Some((candidate, cost));
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::DummyOracle;
    use bevy_ecs::prelude::World;

    #[test]
    fn empty_pending_returns_existing_plans_unchanged() {
        let mut world = World::new();
        let station = world.spawn_empty().id();
        let minibus = world.spawn_empty().id();

        let snapshot = OptimizerSnapshot {
            current_time: 0,
            pending: vec![],
            minibuses: vec![MinibusSnapshot {
                minibus,
                capacity: 4,
                current_location: station,
                current_location_index: 0,
                current_occupancy: 0,
                route_plan: vec![],
            }],
        };

        let oracle = DummyOracle { per_hop_secs: 5 };
        let output = GreedyInsertionOptimizer.optimize(&snapshot, &oracle);
        assert!(output.assignments.is_empty());
        assert!(output.route_plans.get(&minibus).unwrap().is_empty());
    }

    #[test]
    fn single_request_assigns_to_sole_feasible_minibus() {
        let mut world = World::new();
        let origin = world.spawn_empty().id();
        let dest = world.spawn_empty().id();
        let passenger = world.spawn_empty().id();
        let minibus = world.spawn_empty().id();

        let snapshot = OptimizerSnapshot {
            current_time: 0,
            pending: vec![super::super::PendingRequest {
                passenger,
                origin,
                origin_index: 0,
                destination: dest,
                destination_index: 3,
            }],
            minibuses: vec![MinibusSnapshot {
                minibus,
                capacity: 4,
                current_location: origin,
                current_location_index: 0,
                current_occupancy: 0,
                route_plan: vec![],
            }],
        };

        let oracle = DummyOracle { per_hop_secs: 10 };
        let output = GreedyInsertionOptimizer.optimize(&snapshot, &oracle);
        assert_eq!(output.assignments.get(&passenger), Some(&minibus));
        let plan = output.route_plans.get(&minibus).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].pickup, vec![passenger]);
        assert_eq!(plan[1].dropoff, vec![passenger]);
    }

    #[test]
    fn over_capacity_minibus_is_skipped() {
        let mut world = World::new();
        let origin = world.spawn_empty().id();
        let dest = world.spawn_empty().id();
        let passenger = world.spawn_empty().id();
        let full_minibus = world.spawn_empty().id();

        let snapshot = OptimizerSnapshot {
            current_time: 0,
            pending: vec![super::super::PendingRequest {
                passenger,
                origin,
                origin_index: 0,
                destination: dest,
                destination_index: 1,
            }],
            minibuses: vec![MinibusSnapshot {
                minibus: full_minibus,
                capacity: 1,
                current_location: origin,
                current_location_index: 0,
                current_occupancy: 1,
                route_plan: vec![],
            }],
        };

        let oracle = DummyOracle { per_hop_secs: 10 };
        let output = GreedyInsertionOptimizer.optimize(&snapshot, &oracle);
        assert!(output.assignments.is_empty());
    }
}
