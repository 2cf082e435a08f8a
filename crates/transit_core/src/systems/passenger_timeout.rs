use bevy_ecs::prelude::{Query, Res, ResMut};
use log::debug;

use crate::clock::{CurrentEvent, EventKind, EventQueue, EventSubject};
use crate::network::Station;
use crate::passenger::Passenger;

pub fn passenger_timeout_system(
    event: Res<CurrentEvent>,
    queue: ResMut<EventQueue>,
    mut passengers: Query<&mut Passenger>,
    mut stations: Query<&mut Station>,
) {
    if event.0.kind != EventKind::PassengerTimeout {
        return;
    }
    let Some(EventSubject::Passenger(passenger_entity)) = event.0.subject else {
        return;
    };
    let now = queue.now();
    let Ok(mut passenger) = passengers.get_mut(passenger_entity) else {
        return;
    };
    if !passenger.check_timeout(now) {
        return;
    }

    let origin = passenger.origin;
    if passenger.abandon(now).is_ok() {
        debug!("passenger timed out at t={now}");
        if let Ok(mut station) = stations.get_mut(origin) {
            station.remove_waiting(passenger_entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Event;
    use bevy_ecs::prelude::{Schedule, World};

    #[test]
    fn timed_out_waiting_passenger_is_abandoned_and_dequeued() {
        let mut world = World::new();
        let origin = world.spawn(Station::new("A".into(), "A".into(), 0.0, 0.0, 0)).id();
        let dest = world.spawn(Station::new("B".into(), "B".into(), 0.0, 0.0, 1)).id();
        let passenger = world
            .spawn(Passenger::new("P1".into(), origin, dest, 0, 100))
            .id();
        world.get_mut::<Station>(origin).unwrap().push_waiting(passenger);

        let mut queue = EventQueue::default();
        queue
            .schedule_at(
                200,
                EventKind::PassengerTimeout,
                Some(EventSubject::Passenger(passenger)),
            )
            .unwrap();
        let event = queue.pop_next().unwrap();
        world.insert_resource(queue);
        world.insert_resource(CurrentEvent(event));

        let mut schedule = Schedule::default();
        schedule.add_systems(passenger_timeout_system);
        schedule.run(&mut world);

        let station = world.get::<Station>(origin).unwrap();
        assert_eq!(station.num_waiting(), 0);
        let passenger_ref = world.get::<Passenger>(passenger).unwrap();
        assert_eq!(passenger_ref.state, crate::passenger::PassengerState::Abandoned);
    }

    #[test]
    fn already_boarded_passenger_is_left_alone() {
        let mut world = World::new();
        let origin = world.spawn(Station::new("A".into(), "A".into(), 0.0, 0.0, 0)).id();
        let dest = world.spawn(Station::new("B".into(), "B".into(), 0.0, 0.0, 1)).id();
        let mut passenger = Passenger::new("P1".into(), origin, dest, 0, 100);
        passenger.board(50).unwrap();
        let passenger = world.spawn(passenger).id();

        let mut queue = EventQueue::default();
        queue
            .schedule_at(
                200,
                EventKind::PassengerTimeout,
                Some(EventSubject::Passenger(passenger)),
            )
            .unwrap();
        let event = queue.pop_next().unwrap();
        world.insert_resource(queue);
        world.insert_resource(CurrentEvent(event));

        let mut schedule = Schedule::default();
        schedule.add_systems(passenger_timeout_system);
        schedule.run(&mut world);

        let passenger_ref = world.get::<Passenger>(passenger).unwrap();
        assert_eq!(passenger_ref.state, crate::passenger::PassengerState::Onboard);
    }
}
