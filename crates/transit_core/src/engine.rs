//! Thin wrapper bundling a `World` and its `Schedule`, exposing the handful
//! of operations `transit_cli` needs across config loading, running, and
//! report writing. The teacher's `sim_core::runner` free functions operate
//! directly on `&mut World`; `transit_cli` needs one long-lived object to
//! hold onto instead, so `Engine` packages them.

use bevy_ecs::prelude::{Schedule, World};
use log::info;

use crate::clock::EventQueue;
use crate::passenger::Passenger;
use crate::runner;
use crate::telemetry::{PassengerRecord, SimTelemetry};

pub struct Engine {
    world: World,
    schedule: Schedule,
}

impl Engine {
    pub fn new(world: World) -> Self {
        Self {
            world,
            schedule: runner::simulation_schedule(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The event queue's current simulation time (0 if no events have run).
    pub fn current_time(&self) -> u64 {
        self.world
            .get_resource::<EventQueue>()
            .map(|q| q.now())
            .unwrap_or(0)
    }

    pub fn run_next_event(&mut self) -> bool {
        runner::run_next_event(&mut self.world, &mut self.schedule)
    }

    /// Runs until the queue is empty or the configured end time is
    /// exceeded, then finalizes. Returns the number of dispatched events.
    pub fn run_until_empty(&mut self) -> usize {
        let steps = runner::run_until_empty(&mut self.world, &mut self.schedule, usize::MAX);
        self.finalize();
        steps
    }

    /// Sweeps every non-terminal passenger to `ABANDONED` (reason:
    /// simulation ended) and records final history for every passenger
    /// into telemetry. Idempotent: calling it twice with no events run in
    /// between produces the same telemetry.
    pub fn finalize(&mut self) {
        let now = self
            .world
            .get_resource::<EventQueue>()
            .map(|q| q.now())
            .unwrap_or(0);

        let mut records = Vec::new();
        let mut query = self.world.query::<(bevy_ecs::prelude::Entity, &mut Passenger)>();
        let mut abandoned_count = 0usize;
        for (entity, mut passenger) in query.iter_mut(&mut self.world) {
            if !passenger.is_terminal() {
                if passenger.abandon(now).is_ok() {
                    abandoned_count += 1;
                }
            }
            records.push(PassengerRecord {
                passenger: entity,
                passenger_id: passenger.id.clone(),
                appear_time: passenger.appear_time,
                pickup_time: passenger.pickup_time,
                arrival_time: passenger.arrival_time,
                abandon_time: passenger.abandon_time,
            });
        }

        if abandoned_count > 0 {
            info!("finalize: abandoned {abandoned_count} in-flight passengers at t={now}");
        }

        if let Some(mut telemetry) = self.world.get_resource_mut::<SimTelemetry>() {
            telemetry.passengers = records;
        }
    }
}
