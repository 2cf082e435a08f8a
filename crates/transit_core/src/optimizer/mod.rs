//! Greedy-insertion dynamic routing optimizer.
//!
//! Mirrors the capability-set shape the teacher uses for its matching
//! algorithms: a small trait, a boxed resource wrapping the chosen
//! implementation, and free functions that snapshot/apply engine state
//! around the boxed call so the optimizer itself only ever sees
//! by-value data.

mod cost;
mod dummy;
mod greedy;
mod wire;

pub use cost::cumulative_cost;
pub use dummy::DummyOptimizer;
pub use greedy::GreedyInsertionOptimizer;
pub use wire::{plan_to_wire, wire_to_plan, ActionWire, RouteStopWire};

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::errors::TransitError;
use crate::oracle::TravelTimeOracle;

/// A compound routing stop: one station visited once, with every passenger
/// dropped off and picked up there folded together. `transit_core` uses the
/// same shape for the optimizer's working representation and for
/// `Minibus::route_plan` — the distinction the spec draws between "internal
/// route representation" and "route plan" is one of when merging has
/// happened, not of type.
#[derive(Debug, Clone)]
pub struct MergedStop {
    pub station: Entity,
    pub station_index: usize,
    pub pickup: Vec<Entity>,
    pub dropoff: Vec<Entity>,
}

impl MergedStop {
    pub fn pickup_only(station: Entity, station_index: usize, passenger: Entity) -> Self {
        Self {
            station,
            station_index,
            pickup: vec![passenger],
            dropoff: Vec::new(),
        }
    }

    pub fn dropoff_only(station: Entity, station_index: usize, passenger: Entity) -> Self {
        Self {
            station,
            station_index,
            pickup: Vec::new(),
            dropoff: vec![passenger],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub passenger: Entity,
    pub origin: Entity,
    pub origin_index: usize,
    pub destination: Entity,
    pub destination_index: usize,
}

#[derive(Debug, Clone)]
pub struct MinibusSnapshot {
    pub minibus: Entity,
    pub capacity: usize,
    pub current_location: Entity,
    pub current_location_index: usize,
    pub current_occupancy: usize,
    pub route_plan: Vec<MergedStop>,
}

#[derive(Debug, Clone)]
pub struct OptimizerSnapshot {
    pub current_time: u64,
    pub pending: Vec<PendingRequest>,
    pub minibuses: Vec<MinibusSnapshot>,
}

/// Per-minibus route plans, plus the passenger -> minibus assignments made
/// this cycle (so the engine knows which passengers to call
/// `assign_to_vehicle` on).
#[derive(Debug, Default)]
pub struct OptimizerOutput {
    pub route_plans: HashMap<Entity, Vec<MergedStop>>,
    pub assignments: HashMap<Entity, Entity>,
}

pub trait RouteOptimizer: Send + Sync {
    fn optimize(
        &self,
        snapshot: &OptimizerSnapshot,
        oracle: &dyn TravelTimeOracle,
    ) -> OptimizerOutput;
}

#[derive(Resource)]
pub struct OptimizerResource(pub Box<dyn RouteOptimizer>);

/// Checks that `stops`, when executed dropoff-before-pickup at every merged
/// stop starting from `initial_occupancy`, never makes occupancy negative
/// or exceeds `capacity`. Assumes `stops` is already merged (consecutive
/// same-station stops folded together) — callers merge first.
pub fn validate_plan(
    stops: &[MergedStop],
    capacity: usize,
    initial_occupancy: usize,
) -> Result<(), TransitError> {
    let mut occupancy = initial_occupancy as i64;
    for stop in stops {
        occupancy -= stop.dropoff.len() as i64;
        occupancy += stop.pickup.len() as i64;
        if occupancy < 0 || occupancy > capacity as i64 {
            return Err(TransitError::CapacityViolation(format!(
                "occupancy {occupancy} at station index {} exceeds [0, {capacity}]",
                stop.station_index
            )));
        }
    }
    Ok(())
}

/// Merge consecutive stops at the same station, keeping dropoff-before-
/// pickup order within the merged stop. Shared by the optimizer's
/// feasibility check and by the engine before it walks a plan.
pub fn merge_consecutive(stops: &[MergedStop]) -> Vec<MergedStop> {
    let mut merged: Vec<MergedStop> = Vec::new();
    for stop in stops {
        if let Some(last) = merged.last_mut() {
            if last.station == stop.station {
                last.pickup.extend(stop.pickup.iter().copied());
                last.dropoff.extend(stop.dropoff.iter().copied());
                continue;
            }
        }
        merged.push(stop.clone());
    }
    merged
}
