//! Builds the per-event-kind schedule and drives the main loop: pop, dispatch,
//! repeat, matching the teacher's `simulation_schedule`/`run_next_event`
//! shape (condition functions gating which system runs for a given
//! `CurrentEvent`, plus free functions driving `World`/`Schedule` from the
//! outside rather than looping inside a system).

use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentEvent, EventQueue};
use crate::scenario::Config;
use crate::systems::{
    bus_arrival::bus_arrival_system, is_bus_arrival, is_minibus_arrival, is_optimize_call,
    is_passenger_appear, is_passenger_timeout, minibus_arrival::minibus_arrival_system,
    optimize_call::optimize_call_system, passenger_appear::passenger_appear_system,
    passenger_timeout::passenger_timeout_system,
};

pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        bus_arrival_system.run_if(is_bus_arrival),
        minibus_arrival_system.run_if(is_minibus_arrival),
        passenger_appear_system.run_if(is_passenger_appear),
        optimize_call_system.run_if(is_optimize_call),
        passenger_timeout_system.run_if(is_passenger_timeout),
    ));
    schedule
}

/// Pops the next event and runs the schedule against it. Returns `false`
/// (without mutating `now`) when the queue is empty or the next event's
/// time exceeds the configured end time — the caller is expected to stop
/// the loop and call `finalize` at that point.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let end_time = world.get_resource::<Config>().map(|c| c.end_time_secs);
    let next_ts = world
        .get_resource::<EventQueue>()
        .and_then(|q| q.next_event_time());
    if let (Some(end_time), Some(ts)) = (end_time, next_ts) {
        if ts > end_time {
            return false;
        }
    }

    let event = match world.resource_mut::<EventQueue>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs steps until the queue is empty or the end time is reached. Returns
/// the number of events dispatched.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}
