//! Vehicle components: fixed-schedule `Bus` and dynamically-routed
//! `Minibus`, plus the route-plan types the optimizer produces and the
//! engine executes.

use std::collections::HashSet;

use bevy_ecs::prelude::{Component, Entity};

use crate::optimizer::MergedStop;

/// A fixed-route vehicle. Never deviates from its published schedule and
/// never abandons a partial trip regardless of occupancy or lateness.
#[derive(Debug, Component)]
pub struct Bus {
    pub id: String,
    pub capacity: usize,
    /// `(station, scheduled arrival time in seconds)`, strictly increasing
    /// by time, indexed by stop position.
    pub schedule: Vec<(Entity, u64)>,
    pub onboard: HashSet<Entity>,
    /// Index of the stop this bus is currently at (or en route to, before
    /// its first `BUS_ARRIVAL`). Advances by one on every arrival.
    pub next_stop_index: usize,
}

impl Bus {
    pub fn new(id: String, capacity: usize, schedule: Vec<(Entity, u64)>) -> Self {
        Self {
            id,
            capacity,
            schedule,
            onboard: HashSet::new(),
            next_stop_index: 0,
        }
    }

    pub fn occupancy(&self) -> usize {
        self.onboard.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.occupancy())
    }

    /// Whether `destination` lies strictly after `from_stop_index` on the
    /// remaining schedule, used to decide if a waiting passenger should
    /// board at this stop.
    pub fn serves_later(&self, destination: Entity, from_stop_index: usize) -> bool {
        self.schedule[from_stop_index + 1..]
            .iter()
            .any(|(station, _)| *station == destination)
    }
}

/// A dynamically-routed minibus: its route plan is wholly owned and
/// replaced by the optimizer, never patched in place.
#[derive(Debug, Component)]
pub struct Minibus {
    pub id: String,
    pub capacity: usize,
    pub current_location: Entity,
    pub onboard: HashSet<Entity>,
    pub route_plan: Vec<MergedStop>,
    /// True while a `MINIBUS_ARRIVAL` is already scheduled for this
    /// vehicle. Gates whether applying a new route plan needs to schedule
    /// a fresh arrival event or can leave the pending one untouched
    /// (the in-flight-commitment rule).
    pub has_pending_arrival: bool,
}

impl Minibus {
    pub fn new(id: String, capacity: usize, current_location: Entity) -> Self {
        Self {
            id,
            capacity,
            current_location,
            onboard: HashSet::new(),
            route_plan: Vec::new(),
            has_pending_arrival: false,
        }
    }

    pub fn occupancy(&self) -> usize {
        self.onboard.len()
    }

    pub fn is_idle(&self) -> bool {
        self.route_plan.is_empty()
    }
}
