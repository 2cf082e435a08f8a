//! In-memory run history and summary statistics.
//!
//! Generalizes the teacher's `SimTelemetry`/`CompletedTripRecord` pair from
//! single-trip records to passenger and vehicle history logs, plus the
//! aggregate counters spec.md §7 asks for in the run summary.

use bevy_ecs::prelude::{Entity, Resource};

#[derive(Debug, Clone)]
pub struct PassengerRecord {
    pub passenger: Entity,
    pub passenger_id: String,
    pub appear_time: u64,
    pub pickup_time: Option<u64>,
    pub arrival_time: Option<u64>,
    pub abandon_time: Option<u64>,
}

impl PassengerRecord {
    /// `pickupTime - appearTime` if picked up, `abandonTime - appearTime` if
    /// abandoned, else `current_time - appearTime` for a passenger still
    /// waiting at `current_time`.
    pub fn wait_time(&self, current_time: u64) -> u64 {
        if let Some(pickup) = self.pickup_time {
            pickup.saturating_sub(self.appear_time)
        } else if let Some(abandon) = self.abandon_time {
            abandon.saturating_sub(self.appear_time)
        } else {
            current_time.saturating_sub(self.appear_time)
        }
    }

    pub fn travel_time(&self) -> Option<u64> {
        match (self.pickup_time, self.arrival_time) {
            (Some(p), Some(a)) => Some(a.saturating_sub(p)),
            _ => None,
        }
    }

    pub fn served(&self) -> bool {
        self.arrival_time.is_some()
    }

    pub fn abandoned(&self) -> bool {
        self.abandon_time.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VehicleRecord {
    pub vehicle_id: String,
    pub passengers_carried: u64,
    pub busy_seconds: u64,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub total_passengers: u64,
    pub served: u64,
    pub abandoned: u64,
    pub average_wait_secs: f64,
    pub average_travel_secs: f64,
}

#[derive(Debug, Default, Resource)]
pub struct SimTelemetry {
    pub passengers: Vec<PassengerRecord>,
    pub vehicles: Vec<VehicleRecord>,
}

impl SimTelemetry {
    pub fn record_passenger(&mut self, record: PassengerRecord) {
        self.passengers.push(record);
    }

    /// `current_time` is used only for passengers with neither `pickupTime`
    /// nor `abandonTime` recorded yet (still waiting); every terminal
    /// passenger's wait time is independent of it.
    pub fn summary(&self, current_time: u64) -> RunSummary {
        let total = self.passengers.len() as u64;
        let served_records: Vec<&PassengerRecord> =
            self.passengers.iter().filter(|p| p.served()).collect();
        let abandoned = self.passengers.iter().filter(|p| p.abandoned()).count() as u64;

        let wait_sum: u64 = self
            .passengers
            .iter()
            .map(|p| p.wait_time(current_time))
            .sum();
        let travel_sum: u64 = served_records.iter().filter_map(|p| p.travel_time()).sum();

        RunSummary {
            total_passengers: total,
            served: served_records.len() as u64,
            abandoned,
            average_wait_secs: if total > 0 {
                wait_sum as f64 / total as f64
            } else {
                0.0
            },
            average_travel_secs: if !served_records.is_empty() {
                travel_sum as f64 / served_records.len() as f64
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::World;

    #[test]
    fn summary_includes_abandoned_passengers_in_average_wait() {
        let mut world = World::new();
        let p1 = world.spawn_empty().id();
        let p2 = world.spawn_empty().id();

        let mut telemetry = SimTelemetry::default();
        telemetry.record_passenger(PassengerRecord {
            passenger: p1,
            passenger_id: "P1".into(),
            appear_time: 0,
            pickup_time: Some(10),
            arrival_time: Some(40),
            abandon_time: None,
        });
        telemetry.record_passenger(PassengerRecord {
            passenger: p2,
            passenger_id: "P2".into(),
            appear_time: 0,
            pickup_time: None,
            arrival_time: None,
            abandon_time: Some(500),
        });

        let summary = telemetry.summary(1_000);
        assert_eq!(summary.total_passengers, 2);
        assert_eq!(summary.served, 1);
        assert_eq!(summary.abandoned, 1);
        // (10 + 500) / 2 = 255: the abandoned passenger's wait now counts.
        assert!((summary.average_wait_secs - 255.0).abs() < f64::EPSILON);
        assert!((summary.average_travel_secs - 30.0).abs() < f64::EPSILON);
    }
}
