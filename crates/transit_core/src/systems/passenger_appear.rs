use bevy_ecs::prelude::{Query, Res};

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::network::Station;
use crate::passenger::Passenger;

pub fn passenger_appear_system(
    event: Res<CurrentEvent>,
    mut stations: Query<&mut Station>,
    passengers: Query<&Passenger>,
) {
    if event.0.kind != EventKind::PassengerAppear {
        return;
    }
    let Some(EventSubject::Passenger(passenger_entity)) = event.0.subject else {
        return;
    };
    let Ok(passenger) = passengers.get(passenger_entity) else {
        return;
    };
    if let Ok(mut station) = stations.get_mut(passenger.origin) {
        station.push_waiting(passenger_entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Event;
    use bevy_ecs::prelude::{Schedule, World};

    #[test]
    fn appearance_enqueues_passenger_at_origin_station() {
        let mut world = World::new();
        let origin = world.spawn(Station::new("A".into(), "A".into(), 0.0, 0.0, 0)).id();
        let dest = world.spawn(Station::new("B".into(), "B".into(), 0.0, 0.0, 1)).id();
        let passenger = world
            .spawn(Passenger::new("P1".into(), origin, dest, 0, 300))
            .id();

        world.insert_resource(CurrentEvent(Event {
            time: 0,
            priority: EventKind::PassengerAppear.priority(),
            sequence: 0,
            kind: EventKind::PassengerAppear,
            subject: Some(EventSubject::Passenger(passenger)),
        }));

        let mut schedule = Schedule::default();
        schedule.add_systems(passenger_appear_system);
        schedule.run(&mut world);

        let station = world.get::<Station>(origin).unwrap();
        assert_eq!(station.num_waiting(), 1);
        assert_eq!(station.front_waiting(), Some(passenger));
    }
}
