//! Simulation time: a second-resolution timeline driven by a global event queue.
//!
//! The timeline advances by popping the next scheduled event, ordered by
//! `(time, priority, sequence)` — lower priority numbers dispatch first at
//! the same timestamp, and `sequence` (a monotonic stamp assigned at
//! enqueue) breaks ties between same-`(time, priority)` events by insertion
//! order, per the spec's priority table.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::errors::TransitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BusArrival,
    MinibusArrival,
    PassengerAppear,
    OptimizeCall,
    PassengerTimeout,
}

impl EventKind {
    /// Lower values dispatch first among events scheduled for the same
    /// timestamp. Vehicle arrivals must precede passenger appearances at
    /// identical `t` so that a passenger appearing exactly when a vehicle
    /// arrives waits for the *next* vehicle, not the one currently departing.
    pub const fn priority(self) -> u8 {
        match self {
            Self::BusArrival => 0,
            Self::MinibusArrival => 1,
            Self::PassengerAppear => 2,
            Self::OptimizeCall => 3,
            Self::PassengerTimeout => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Passenger(Entity),
    Bus(Entity),
    Minibus(Entity),
}

/// A scheduled simulation event. `time` is in simulation seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub time: u64,
    pub priority: u8,
    pub sequence: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap over (time, priority, sequence): BinaryHeap is a max-heap,
        // so comparisons are reversed.
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// The engine's sole event queue. Owns all scheduled events; mutated only by
/// the engine (handlers routinely enqueue follow-ups during dispatch).
#[derive(Debug, Default, Resource)]
pub struct EventQueue {
    now: u64,
    next_sequence: u64,
    events: BinaryHeap<Event>,
}

impl EventQueue {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|e| e.time)
    }

    /// Schedule an event at an absolute simulation time. Fails with
    /// `InvalidTime` if `at < now()` (the queue's current time).
    pub fn schedule_at(
        &mut self,
        at: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Result<(), TransitError> {
        if at < self.now {
            return Err(TransitError::InvalidTime(format!(
                "cannot schedule {kind:?} at {at}, current time is {}",
                self.now
            )));
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.events.push(Event {
            time: at,
            priority: kind.priority(),
            sequence,
            kind,
            subject,
        });
        Ok(())
    }

    /// Schedule an event `delta` seconds from now.
    pub fn schedule_in(
        &mut self,
        delta: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Result<(), TransitError> {
        self.schedule_at(self.now.saturating_add(delta), kind, subject)
    }

    /// Pop the next event in `(time, priority, sequence)` order, advancing
    /// `now` to its timestamp.
    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.time;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_events_in_time_then_priority_order() {
        let mut q = EventQueue::default();
        q.schedule_at(20, EventKind::PassengerAppear, None).unwrap();
        q.schedule_at(5, EventKind::PassengerAppear, None).unwrap();
        q.schedule_at(20, EventKind::BusArrival, None).unwrap();
        q.schedule_at(10, EventKind::PassengerAppear, None).unwrap();

        let first = q.pop_next().unwrap();
        assert_eq!(first.time, 5);
        assert_eq!(q.now(), 5);

        let second = q.pop_next().unwrap();
        assert_eq!(second.time, 10);

        // Same timestamp (20): BusArrival (priority 0) before PassengerAppear (priority 2).
        let third = q.pop_next().unwrap();
        assert_eq!(third.time, 20);
        assert_eq!(third.kind, EventKind::BusArrival);
        let fourth = q.pop_next().unwrap();
        assert_eq!(fourth.kind, EventKind::PassengerAppear);

        assert!(q.pop_next().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn ties_at_same_time_and_priority_break_by_insertion_order() {
        let mut q = EventQueue::default();
        q.schedule_at(10, EventKind::PassengerAppear, None).unwrap();
        q.schedule_at(10, EventKind::PassengerAppear, None).unwrap();
        q.schedule_at(10, EventKind::PassengerAppear, None).unwrap();

        let seqs: Vec<u64> = (0..3).map(|_| q.pop_next().unwrap().sequence).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn rejects_scheduling_before_current_time() {
        let mut q = EventQueue::default();
        q.schedule_at(100, EventKind::PassengerAppear, None).unwrap();
        q.pop_next();
        assert_eq!(q.now(), 100);

        let err = q.schedule_at(50, EventKind::PassengerAppear, None).unwrap_err();
        assert!(matches!(err, TransitError::InvalidTime(_)));
    }
}
