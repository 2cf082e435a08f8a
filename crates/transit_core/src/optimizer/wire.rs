//! The optimizer route-plan wire format: `{ minibusId: [ { station_id,
//! action, passenger_ids }, ... ] }`, keyed by string ids rather than
//! `Entity`s so it can cross a file or process boundary. Used to seed a
//! minibus's initial route plan from scenario input; `transit_cli`
//! deserializes the outer `{minibusId: [...]}` map, `transit_core` resolves
//! ids to entities and validates.

use std::collections::HashMap;

use bevy_ecs::prelude::Entity;
use serde::{Deserialize, Serialize};

use crate::errors::TransitError;
use crate::network::Station;

use super::MergedStop;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionWire {
    Pickup,
    Dropoff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStopWire {
    pub station_id: String,
    pub action: ActionWire,
    pub passenger_ids: Vec<String>,
}

/// Expand a merged plan into the wire's one-action-per-stop shape: a stop
/// with both a dropoff and a pickup becomes two consecutive entries,
/// dropoff first, per spec.md §4.5's same-station merge rule.
pub fn plan_to_wire(
    plan: &[MergedStop],
    stations: &bevy_ecs::prelude::World,
    passenger_id_of: impl Fn(Entity) -> Option<String>,
) -> Result<Vec<RouteStopWire>, TransitError> {
    let mut wire = Vec::new();
    for stop in plan {
        let station = stations.get::<Station>(stop.station).ok_or_else(|| {
            TransitError::UnknownStation(format!("{:?}", stop.station))
        })?;
        if !stop.dropoff.is_empty() {
            wire.push(RouteStopWire {
                station_id: station.station_id.clone(),
                action: ActionWire::Dropoff,
                passenger_ids: ids_for(&stop.dropoff, &passenger_id_of)?,
            });
        }
        if !stop.pickup.is_empty() {
            wire.push(RouteStopWire {
                station_id: station.station_id.clone(),
                action: ActionWire::Pickup,
                passenger_ids: ids_for(&stop.pickup, &passenger_id_of)?,
            });
        }
    }
    Ok(wire)
}

fn ids_for(
    passengers: &[Entity],
    passenger_id_of: &impl Fn(Entity) -> Option<String>,
) -> Result<Vec<String>, TransitError> {
    passengers
        .iter()
        .map(|&e| passenger_id_of(e).ok_or_else(|| TransitError::UnknownPassenger(format!("{e:?}"))))
        .collect()
}

/// Resolve a wire-format plan into `MergedStop`s ready for
/// [`super::validate_plan`]. Every `station_id`/passenger id must resolve
/// through the supplied lookup tables; unresolved ids fail closed with
/// `UnknownStation`/`UnknownPassenger` rather than silently dropping stops.
pub fn wire_to_plan(
    wire: &[RouteStopWire],
    station_by_id: &HashMap<String, (Entity, usize)>,
    passenger_by_id: &HashMap<String, Entity>,
) -> Result<Vec<MergedStop>, TransitError> {
    wire.iter()
        .map(|stop| {
            let (station, station_index) = station_by_id
                .get(&stop.station_id)
                .copied()
                .ok_or_else(|| TransitError::UnknownStation(stop.station_id.clone()))?;
            let passengers = stop
                .passenger_ids
                .iter()
                .map(|id| {
                    passenger_by_id
                        .get(id)
                        .copied()
                        .ok_or_else(|| TransitError::UnknownPassenger(id.clone()))
                })
                .collect::<Result<Vec<Entity>, TransitError>>()?;
            Ok(match stop.action {
                ActionWire::Pickup => MergedStop {
                    station,
                    station_index,
                    pickup: passengers,
                    dropoff: Vec::new(),
                },
                ActionWire::Dropoff => MergedStop {
                    station,
                    station_index,
                    pickup: Vec::new(),
                    dropoff: passengers,
                },
            })
        })
        .collect()
}
