//! Constructs a `World` from a `Config` plus loaded input data. No file I/O
//! happens here — `transit_cli` reads files and hands in already-parsed
//! specs, mirroring how the teacher's `build_scenario` takes a fully-formed
//! `ScenarioParams` rather than touching disk itself.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, World};
use log::warn;

use crate::clock::{EventKind, EventQueue, EventSubject};
use crate::demand::PassengerAppearance;
use crate::network::{Station, StationRegistry};
use crate::optimizer::{
    merge_consecutive, validate_plan, wire_to_plan, DummyOptimizer, GreedyInsertionOptimizer,
    OptimizerResource, RouteOptimizer, RouteStopWire,
};
use crate::oracle::{OracleResource, TravelTimeOracle};
use crate::passenger::Passenger;
use crate::scenario::params::{Config, OptimizerType};
use crate::telemetry::SimTelemetry;
use crate::vehicle::{Bus, Minibus};

pub struct StationSpec {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

pub struct BusSpec {
    pub id: String,
    pub capacity: usize,
    /// `(station index, scheduled arrival time in seconds)`.
    pub schedule: Vec<(usize, u64)>,
}

pub struct MinibusSpec {
    pub id: String,
    pub capacity: usize,
    pub start_station_index: usize,
}

#[derive(Default)]
pub struct ScenarioInput {
    pub stations: Vec<StationSpec>,
    pub buses: Vec<BusSpec>,
    pub minibuses: Vec<MinibusSpec>,
    pub demand: Vec<PassengerAppearance>,
    /// Initial route plans in the external wire format (spec.md §6's
    /// `{ minibusId: [stop, ...] }`), keyed by `MinibusSpec::id`. Resolved
    /// and capacity-validated against an empty starting occupancy; a
    /// rejected override leaves that minibus idle rather than failing the
    /// whole scenario build.
    pub route_plan_overrides: HashMap<String, Vec<RouteStopWire>>,
}

/// Spawns every entity from `input`, inserts the engine resources, and
/// schedules the initial `BUS_ARRIVAL`, `PASSENGER_APPEAR`, and
/// `OPTIMIZE_CALL` events. Returns an error only if a spec references an
/// out-of-range station index.
pub fn build_scenario(
    world: &mut World,
    config: Config,
    oracle: Box<dyn TravelTimeOracle>,
    input: ScenarioInput,
) -> Result<(), crate::errors::TransitError> {
    let mut station_by_id: HashMap<String, (Entity, usize)> = HashMap::with_capacity(input.stations.len());
    let station_entities: Vec<Entity> = input
        .stations
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let entity = world
                .spawn(Station::new(
                    spec.station_id.clone(),
                    spec.name.clone(),
                    spec.lat,
                    spec.lon,
                    index,
                ))
                .id();
            station_by_id.insert(spec.station_id.clone(), (entity, index));
            entity
        })
        .collect();
    let registry = StationRegistry::new(station_entities.clone());

    let optimizer: Box<dyn RouteOptimizer> = match config.optimizer_type {
        OptimizerType::GreedyInsertion => Box::new(GreedyInsertionOptimizer),
        OptimizerType::Dummy => Box::new(DummyOptimizer),
    };

    let mut queue = EventQueue::default();

    for bus_spec in &input.buses {
        let schedule = resolve_schedule(&station_entities, &bus_spec.schedule)?;
        let first_arrival = schedule.first().map(|(_, t)| *t);
        let bus_entity = world
            .spawn(Bus::new(bus_spec.id.clone(), bus_spec.capacity, schedule))
            .id();
        if let Some(t) = first_arrival {
            queue.schedule_at(t, EventKind::BusArrival, Some(EventSubject::Bus(bus_entity)))?;
        }
    }

    let mut minibus_by_id: HashMap<String, (Entity, usize)> = HashMap::with_capacity(input.minibuses.len());
    for minibus_spec in &input.minibuses {
        let start = *station_entities
            .get(minibus_spec.start_station_index)
            .ok_or_else(|| {
                crate::errors::TransitError::UnknownStation(format!(
                    "minibus {} starts at out-of-range index {}",
                    minibus_spec.id, minibus_spec.start_station_index
                ))
            })?;
        let entity = world
            .spawn(Minibus::new(minibus_spec.id.clone(), minibus_spec.capacity, start))
            .id();
        minibus_by_id.insert(minibus_spec.id.clone(), (entity, minibus_spec.start_station_index));
    }

    let mut passenger_by_id: HashMap<String, Entity> = HashMap::with_capacity(input.demand.len());
    for (i, appearance) in input.demand.iter().enumerate() {
        let origin = *station_entities.get(appearance.origin).ok_or_else(|| {
            crate::errors::TransitError::UnknownStation(format!(
                "passenger appearance {i} has out-of-range origin {}",
                appearance.origin
            ))
        })?;
        let destination = *station_entities.get(appearance.destination).ok_or_else(|| {
            crate::errors::TransitError::UnknownStation(format!(
                "passenger appearance {i} has out-of-range destination {}",
                appearance.destination
            ))
        })?;
        let passenger_entity = world
            .spawn(Passenger::new(
                format!("P{i}"),
                origin,
                destination,
                appearance.appear_time,
                appearance.max_wait_time,
            ))
            .id();
        passenger_by_id.insert(format!("P{i}"), passenger_entity);
        queue.schedule_at(
            appearance.appear_time,
            EventKind::PassengerAppear,
            Some(EventSubject::Passenger(passenger_entity)),
        )?;
        queue.schedule_at(
            appearance.appear_time + appearance.max_wait_time,
            EventKind::PassengerTimeout,
            Some(EventSubject::Passenger(passenger_entity)),
        )?;
    }

    queue.schedule_at(config.optimize_interval_secs, EventKind::OptimizeCall, None)?;

    apply_route_plan_overrides(
        world,
        &input.route_plan_overrides,
        &minibus_by_id,
        &station_by_id,
        &passenger_by_id,
        oracle.as_ref(),
        &mut queue,
    );

    world.insert_resource(registry);
    world.insert_resource(OracleResource(oracle));
    world.insert_resource(OptimizerResource(optimizer));
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(queue);
    world.insert_resource(config);

    Ok(())
}

/// Resolves each `{minibusId: [stop, ...]}` override through the id lookup
/// tables, capacity-validates it against an empty starting occupancy, and
/// assigns it to that minibus's route plan. Schedules the initial
/// `MINIBUS_ARRIVAL` for any minibus left with a non-empty plan, mirroring
/// how `optimize_call_system` schedules one after applying an optimizer
/// plan. A rejected override (unknown id, unknown station/passenger, or a
/// capacity violation) leaves the minibus idle and logs a warning rather
/// than failing the whole scenario build.
fn apply_route_plan_overrides(
    world: &mut World,
    overrides: &HashMap<String, Vec<RouteStopWire>>,
    minibus_by_id: &HashMap<String, (Entity, usize)>,
    station_by_id: &HashMap<String, (Entity, usize)>,
    passenger_by_id: &HashMap<String, Entity>,
    oracle: &dyn TravelTimeOracle,
    queue: &mut EventQueue,
) {
    for (minibus_id, wire_stops) in overrides {
        let Some(&(entity, start_index)) = minibus_by_id.get(minibus_id) else {
            warn!("route plan override references unknown minibus id {minibus_id}");
            continue;
        };

        let plan = match wire_to_plan(wire_stops, station_by_id, passenger_by_id) {
            Ok(plan) => merge_consecutive(&plan),
            Err(err) => {
                warn!("route plan override for minibus {minibus_id} rejected: {err}");
                continue;
            }
        };

        let Some(mut minibus) = world.get_mut::<Minibus>(entity) else {
            continue;
        };
        if let Err(err) = validate_plan(&plan, minibus.capacity, 0) {
            warn!("route plan override for minibus {minibus_id} rejected: {err}");
            continue;
        }

        let Some(first_stop) = plan.first().cloned() else {
            continue;
        };
        minibus.route_plan = plan;
        let leg = oracle.get(start_index, first_stop.station_index, 0).unwrap_or(0);
        let _ = queue.schedule_at(leg, EventKind::MinibusArrival, Some(EventSubject::Minibus(entity)));
        minibus.has_pending_arrival = true;
    }
}

fn resolve_schedule(
    station_entities: &[Entity],
    schedule: &[(usize, u64)],
) -> Result<Vec<(Entity, u64)>, crate::errors::TransitError> {
    schedule
        .iter()
        .map(|(index, time)| {
            station_entities
                .get(*index)
                .map(|e| (*e, *time))
                .ok_or_else(|| {
                    crate::errors::TransitError::UnknownStation(format!(
                        "bus schedule references out-of-range station index {index}"
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::ActionWire;
    use crate::oracle::DummyOracle;

    fn station(id: &str) -> StationSpec {
        StationSpec {
            station_id: id.into(),
            name: id.into(),
            lat: 0.0,
            lon: 0.0,
        }
    }

    #[test]
    fn valid_route_plan_override_is_applied_and_schedules_an_arrival() {
        let mut world = World::new();
        let mut overrides = HashMap::new();
        overrides.insert(
            "M0".to_string(),
            vec![RouteStopWire {
                station_id: "B".into(),
                action: ActionWire::Pickup,
                passenger_ids: vec!["P0".into()],
            }],
        );

        build_scenario(
            &mut world,
            Config::default(),
            Box::new(DummyOracle { per_hop_secs: 60 }),
            ScenarioInput {
                stations: vec![station("A"), station("B")],
                minibuses: vec![MinibusSpec {
                    id: "M0".into(),
                    capacity: 4,
                    start_station_index: 0,
                }],
                demand: vec![PassengerAppearance {
                    origin: 0,
                    destination: 1,
                    appear_time: 0,
                    max_wait_time: 900,
                }],
                route_plan_overrides: overrides,
                ..ScenarioInput::default()
            },
        )
        .unwrap();

        let mut minibuses = world.query::<&Minibus>();
        let minibus = minibuses.iter(&world).next().unwrap();
        assert_eq!(minibus.route_plan.len(), 1);
        assert!(minibus.has_pending_arrival);

        let queue = world.resource::<EventQueue>();
        assert!(queue.next_event_time().is_some());
    }

    #[test]
    fn overcapacity_route_plan_override_is_rejected_and_minibus_stays_idle() {
        let mut world = World::new();
        let mut overrides = HashMap::new();
        overrides.insert(
            "M0".to_string(),
            vec![
                RouteStopWire {
                    station_id: "A".into(),
                    action: ActionWire::Pickup,
                    passenger_ids: vec!["P0".into()],
                },
                RouteStopWire {
                    station_id: "A".into(),
                    action: ActionWire::Pickup,
                    passenger_ids: vec!["P1".into()],
                },
            ],
        );

        build_scenario(
            &mut world,
            Config::default(),
            Box::new(DummyOracle { per_hop_secs: 60 }),
            ScenarioInput {
                stations: vec![station("A"), station("B")],
                minibuses: vec![MinibusSpec {
                    id: "M0".into(),
                    capacity: 1,
                    start_station_index: 0,
                }],
                demand: vec![
                    PassengerAppearance {
                        origin: 0,
                        destination: 1,
                        appear_time: 0,
                        max_wait_time: 900,
                    },
                    PassengerAppearance {
                        origin: 0,
                        destination: 1,
                        appear_time: 0,
                        max_wait_time: 900,
                    },
                ],
                route_plan_overrides: overrides,
                ..ScenarioInput::default()
            },
        )
        .unwrap();

        let mut minibuses = world.query::<&Minibus>();
        let minibus = minibuses.iter(&world).next().unwrap();
        assert!(minibus.route_plan.is_empty());
        assert!(!minibus.has_pending_arrival);
    }
}
