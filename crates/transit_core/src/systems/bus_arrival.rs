use bevy_ecs::prelude::{Query, Res, ResMut};
use log::debug;

use crate::clock::{CurrentEvent, EventKind, EventQueue, EventSubject};
use crate::network::Station;
use crate::passenger::Passenger;
use crate::vehicle::Bus;

/// Buses never deviate from schedule: boarding and drop-off both happen
/// against a fixed stop sequence, and the next `BUS_ARRIVAL` is scheduled
/// at the timetabled time regardless of how this stop went.
pub fn bus_arrival_system(
    event: Res<CurrentEvent>,
    mut queue: ResMut<EventQueue>,
    mut buses: Query<&mut Bus>,
    mut stations: Query<&mut Station>,
    mut passengers: Query<&mut Passenger>,
) {
    if event.0.kind != EventKind::BusArrival {
        return;
    }
    let Some(EventSubject::Bus(bus_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut bus) = buses.get_mut(bus_entity) else {
        return;
    };
    let now = queue.now();
    let stop_index = bus.next_stop_index;
    let Some(&(station_entity, _)) = bus.schedule.get(stop_index) else {
        return;
    };

    let arriving: Vec<_> = bus
        .onboard
        .iter()
        .copied()
        .filter(|p| {
            passengers
                .get(*p)
                .map(|pp| pp.destination == station_entity)
                .unwrap_or(false)
        })
        .collect();
    for passenger_entity in &arriving {
        bus.onboard.remove(passenger_entity);
        if let Ok(mut passenger) = passengers.get_mut(*passenger_entity) {
            let _ = passenger.arrive(now);
        }
    }

    if let Ok(mut station) = stations.get_mut(station_entity) {
        let candidates: Vec<_> = station.waiting_passengers().collect();
        for candidate in candidates {
            let Ok(mut passenger) = passengers.get_mut(candidate) else {
                continue;
            };
            if passenger.check_timeout(now) {
                station.remove_waiting(candidate);
                let _ = passenger.abandon(now);
                continue;
            }
            if bus.remaining_capacity() == 0 {
                continue;
            }
            if bus.serves_later(passenger.destination, stop_index) {
                station.remove_waiting(candidate);
                let _ = passenger.board(now);
                bus.onboard.insert(candidate);
            }
        }
    }

    bus.next_stop_index = stop_index + 1;
    if let Some(&(_, next_time)) = bus.schedule.get(bus.next_stop_index) {
        debug!("scheduling next bus arrival at t={next_time}");
        let _ = queue.schedule_at(next_time, EventKind::BusArrival, Some(EventSubject::Bus(bus_entity)));
    }
}
