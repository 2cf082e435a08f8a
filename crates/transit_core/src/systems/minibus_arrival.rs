use bevy_ecs::prelude::{Query, Res, ResMut};
use log::debug;

use crate::clock::{CurrentEvent, EventKind, EventQueue, EventSubject};
use crate::network::Station;
use crate::oracle::OracleResource;
use crate::passenger::Passenger;
use crate::vehicle::Minibus;

pub fn minibus_arrival_system(
    event: Res<CurrentEvent>,
    mut queue: ResMut<EventQueue>,
    oracle: Res<OracleResource>,
    mut minibuses: Query<&mut Minibus>,
    mut stations: Query<&mut Station>,
    mut passengers: Query<&mut Passenger>,
) {
    if event.0.kind != EventKind::MinibusArrival {
        return;
    }
    let Some(EventSubject::Minibus(minibus_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut minibus) = minibuses.get_mut(minibus_entity) else {
        return;
    };
    if minibus.route_plan.is_empty() {
        minibus.has_pending_arrival = false;
        return;
    }
    let now = queue.now();
    let stop = minibus.route_plan.remove(0);

    for passenger_entity in &stop.dropoff {
        minibus.onboard.remove(passenger_entity);
        if let Ok(mut passenger) = passengers.get_mut(*passenger_entity) {
            let _ = passenger.arrive(now);
        }
    }

    for passenger_entity in &stop.pickup {
        if let Ok(mut passenger) = passengers.get_mut(*passenger_entity) {
            if passenger.board(now).is_ok() {
                minibus.onboard.insert(*passenger_entity);
                if let Ok(mut station) = stations.get_mut(stop.station) {
                    station.remove_waiting(*passenger_entity);
                }
            }
        }
    }

    minibus.current_location = stop.station;

    match minibus.route_plan.first() {
        Some(next) => {
            let leg = oracle
                .0
                .get(stop.station_index, next.station_index, now)
                .unwrap_or(0);
            debug!("scheduling next minibus arrival in {leg}s");
            let _ = queue.schedule_at(
                now + leg,
                EventKind::MinibusArrival,
                Some(EventSubject::Minibus(minibus_entity)),
            );
            minibus.has_pending_arrival = true;
        }
        None => {
            minibus.has_pending_arrival = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Event;
    use crate::optimizer::MergedStop;
    use crate::oracle::DummyOracle;
    use bevy_ecs::prelude::{Schedule, World};

    #[test]
    fn executes_head_stop_and_schedules_next_arrival() {
        let mut world = World::new();
        let a = world.spawn(Station::new("A".into(), "A".into(), 0.0, 0.0, 0)).id();
        let b = world.spawn(Station::new("B".into(), "B".into(), 0.0, 0.0, 1)).id();
        let passenger = world.spawn(Passenger::new("P1".into(), a, b, 0, 900)).id();
        world.get_mut::<Station>(a).unwrap().push_waiting(passenger);

        let mut minibus = Minibus::new("M1".into(), 4, a);
        minibus.route_plan = vec![
            MergedStop::pickup_only(a, 0, passenger),
            MergedStop::dropoff_only(b, 1, passenger),
        ];
        let minibus_entity = world.spawn(minibus).id();

        world.insert_resource(OracleResource(Box::new(DummyOracle { per_hop_secs: 10 })));

        let mut queue = EventQueue::default();
        queue
            .schedule_at(
                0,
                EventKind::MinibusArrival,
                Some(EventSubject::Minibus(minibus_entity)),
            )
            .unwrap();
        let event = queue.pop_next().unwrap();
        world.insert_resource(queue);
        world.insert_resource(CurrentEvent(event));

        let mut schedule = Schedule::default();
        schedule.add_systems(minibus_arrival_system);
        schedule.run(&mut world);

        let minibus_ref = world.get::<Minibus>(minibus_entity).unwrap();
        assert!(minibus_ref.onboard.contains(&passenger));
        assert_eq!(minibus_ref.route_plan.len(), 1);
        assert!(minibus_ref.has_pending_arrival);

        let next_time = world.resource::<EventQueue>().next_event_time();
        assert_eq!(next_time, Some(10));
    }

    #[test]
    fn draining_the_last_stop_leaves_minibus_idle() {
        let mut world = World::new();
        let a = world.spawn(Station::new("A".into(), "A".into(), 0.0, 0.0, 0)).id();
        let mut passenger = Passenger::new("P1".into(), a, a, 0, 900);
        passenger.board(0).unwrap();
        let passenger_entity = world.spawn(passenger).id();

        let mut minibus = Minibus::new("M1".into(), 4, a);
        minibus.onboard.insert(passenger_entity);
        minibus.route_plan = vec![MergedStop::dropoff_only(a, 0, passenger_entity)];
        minibus.has_pending_arrival = true;
        let minibus_entity = world.spawn(minibus).id();

        world.insert_resource(OracleResource(Box::new(DummyOracle { per_hop_secs: 10 })));

        let mut queue = EventQueue::default();
        queue
            .schedule_at(
                50,
                EventKind::MinibusArrival,
                Some(EventSubject::Minibus(minibus_entity)),
            )
            .unwrap();
        let event = queue.pop_next().unwrap();
        world.insert_resource(queue);
        world.insert_resource(CurrentEvent(event));

        let mut schedule = Schedule::default();
        schedule.add_systems(minibus_arrival_system);
        schedule.run(&mut world);

        let minibus_ref = world.get::<Minibus>(minibus_entity).unwrap();
        assert!(minibus_ref.is_idle());
        assert!(!minibus_ref.has_pending_arrival);
    }
}
