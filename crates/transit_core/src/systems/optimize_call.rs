use bevy_ecs::prelude::{Entity, Query, Res, ResMut};
use log::{info, warn};

use crate::clock::{CurrentEvent, EventKind, EventQueue, EventSubject};
use crate::network::Station;
use crate::optimizer::{
    merge_consecutive, validate_plan, MinibusSnapshot, OptimizerResource, OptimizerSnapshot,
    PendingRequest,
};
use crate::oracle::OracleResource;
use crate::passenger::{Passenger, PassengerState};
use crate::scenario::Config;
use crate::vehicle::Minibus;

/// Snapshots pending requests and minibus state, invokes the optimizer,
/// then applies the resulting route plans back onto `Minibus` components.
/// The optimizer itself never touches the `World` — it only sees by-value
/// snapshot data, matching the "engine is the sole writer" rule.
#[allow(clippy::too_many_arguments)]
pub fn optimize_call_system(
    event: Res<CurrentEvent>,
    mut queue: ResMut<EventQueue>,
    config: Res<Config>,
    oracle: Res<OracleResource>,
    optimizer: Res<OptimizerResource>,
    mut passengers: Query<(Entity, &mut Passenger)>,
    mut stations: Query<&mut Station>,
    mut minibuses: Query<(Entity, &mut Minibus)>,
) {
    if event.0.kind != EventKind::OptimizeCall {
        return;
    }
    let now = queue.now();

    // Single pass: apply lazy timeouts (same check as the FIFO-pop path in
    // bus_arrival_system) and collect everyone still eligible as pending.
    let mut pending = Vec::new();
    for (passenger_entity, mut passenger) in passengers.iter_mut() {
        if passenger.state != PassengerState::Waiting {
            continue;
        }
        if passenger.check_timeout(now) {
            let origin = passenger.origin;
            if passenger.abandon(now).is_ok() {
                if let Ok(mut station) = stations.get_mut(origin) {
                    station.remove_waiting(passenger_entity);
                }
            }
            continue;
        }
        if passenger.assigned_vehicle.is_some() {
            continue;
        }
        let origin_index = stations.get(passenger.origin).map(|s| s.index).unwrap_or(0);
        let destination_index = stations
            .get(passenger.destination)
            .map(|s| s.index)
            .unwrap_or(0);
        pending.push(PendingRequest {
            passenger: passenger_entity,
            origin: passenger.origin,
            origin_index,
            destination: passenger.destination,
            destination_index,
        });
    }

    let minibus_snapshots: Vec<MinibusSnapshot> = minibuses
        .iter()
        .map(|(entity, minibus)| {
            let current_location_index =
                stations.get(minibus.current_location).map(|s| s.index).unwrap_or(0);
            MinibusSnapshot {
                minibus: entity,
                capacity: minibus.capacity,
                current_location: minibus.current_location,
                current_location_index,
                current_occupancy: minibus.occupancy(),
                route_plan: minibus.route_plan.clone(),
            }
        })
        .collect();

    let snapshot = OptimizerSnapshot {
        current_time: now,
        pending,
        minibuses: minibus_snapshots,
    };

    info!(
        "optimize call at t={now}: {} pending, {} minibuses",
        snapshot.pending.len(),
        snapshot.minibuses.len()
    );

    let output = optimizer.0.optimize(&snapshot, oracle.0.as_ref());

    for (minibus_entity, new_plan) in output.route_plans {
        let Ok((_, mut minibus)) = minibuses.get_mut(minibus_entity) else {
            continue;
        };
        let merged = merge_consecutive(&new_plan);
        if let Err(err) = validate_plan(&merged, minibus.capacity, minibus.occupancy()) {
            debug_assert!(err.is_recoverable(), "validate_plan only raises capacity violations");
            warn!(
                "optimizer plan for minibus {} rejected, keeping prior plan: {err}",
                minibus.id
            );
            continue;
        }
        let had_pending_arrival = minibus.has_pending_arrival;
        minibus.route_plan = merged;

        if !minibus.route_plan.is_empty() && !had_pending_arrival {
            if let Some(first_stop) = minibus.route_plan.first() {
                let current_index =
                    stations.get(minibus.current_location).map(|s| s.index).unwrap_or(0);
                let leg = oracle
                    .0
                    .get(current_index, first_stop.station_index, now)
                    .unwrap_or(0);
                let _ = queue.schedule_at(
                    now + leg,
                    EventKind::MinibusArrival,
                    Some(EventSubject::Minibus(minibus_entity)),
                );
                minibus.has_pending_arrival = true;
            }
        }
    }

    for (passenger_entity, minibus_entity) in output.assignments {
        if let Ok((_, mut passenger)) = passengers.get_mut(passenger_entity) {
            let _ = passenger.assign_to_vehicle(minibus_entity, now);
        }
    }

    let _ = queue.schedule_at(now + config.optimize_interval_secs, EventKind::OptimizeCall, None);
}
