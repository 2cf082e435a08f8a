//! Stations: the FIFO waiting-queue owners passengers appear into and
//! vehicles pick up from.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Component, Entity, Resource};

/// Maps matrix row/column indices to station entities. Built once at
/// scenario construction; consulted by demand generation and reporting,
/// which only know stations by index.
#[derive(Debug, Default, Resource)]
pub struct StationRegistry {
    by_index: Vec<Entity>,
}

impl StationRegistry {
    pub fn new(by_index: Vec<Entity>) -> Self {
        Self { by_index }
    }

    pub fn entity(&self, index: usize) -> Option<Entity> {
        self.by_index.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}

/// A stop in the network. Indices line up with the rows/columns of whatever
/// travel-time matrix the oracle was built from — `index` is the canonical
/// cross-reference used by `demand.rs` and the CLI's loaders, `station_id`
/// is the external (file-format) identifier.
#[derive(Debug, Component)]
pub struct Station {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub index: usize,
    waiting: VecDeque<Entity>,
}

impl Station {
    pub fn new(station_id: String, name: String, lat: f64, lon: f64, index: usize) -> Self {
        Self {
            station_id,
            name,
            lat,
            lon,
            index,
            waiting: VecDeque::new(),
        }
    }

    /// Enqueue a passenger at the back of the FIFO line.
    pub fn push_waiting(&mut self, passenger: Entity) {
        self.waiting.push_back(passenger);
    }

    /// Remove a specific passenger from the queue (used when a passenger is
    /// assigned to a vehicle out of FIFO order by the optimizer, or
    /// abandons while still waiting).
    pub fn remove_waiting(&mut self, passenger: Entity) -> bool {
        if let Some(pos) = self.waiting.iter().position(|&e| e == passenger) {
            self.waiting.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn front_waiting(&self) -> Option<Entity> {
        self.waiting.front().copied()
    }

    pub fn pop_front_waiting(&mut self) -> Option<Entity> {
        self.waiting.pop_front()
    }

    pub fn waiting_passengers(&self) -> impl Iterator<Item = Entity> + '_ {
        self.waiting.iter().copied()
    }

    pub fn num_waiting(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::World;

    #[test]
    fn fifo_order_is_preserved() {
        let mut world = World::new();
        let p1 = world.spawn_empty().id();
        let p2 = world.spawn_empty().id();
        let p3 = world.spawn_empty().id();

        let mut station = Station::new("S1".into(), "Main St".into(), 0.0, 0.0, 0);
        station.push_waiting(p1);
        station.push_waiting(p2);
        station.push_waiting(p3);

        assert_eq!(station.num_waiting(), 3);
        assert_eq!(station.pop_front_waiting(), Some(p1));
        assert_eq!(station.pop_front_waiting(), Some(p2));
        assert_eq!(station.pop_front_waiting(), Some(p3));
        assert!(station.pop_front_waiting().is_none());
    }

    #[test]
    fn remove_waiting_pulls_out_of_order() {
        let mut world = World::new();
        let p1 = world.spawn_empty().id();
        let p2 = world.spawn_empty().id();

        let mut station = Station::new("S1".into(), "Main St".into(), 0.0, 0.0, 0);
        station.push_waiting(p1);
        station.push_waiting(p2);

        assert!(station.remove_waiting(p1));
        assert!(!station.remove_waiting(p1));
        assert_eq!(station.front_waiting(), Some(p2));
    }
}
