//! Passenger state machine: `WAITING -> ASSIGNED -> ONBOARD -> ARRIVED`, with
//! `ABANDONED` reachable from `WAITING` or `ASSIGNED`.

use bevy_ecs::prelude::{Component, Entity};

use crate::errors::TransitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerState {
    Waiting,
    Assigned,
    Onboard,
    Arrived,
    Abandoned,
}

#[derive(Debug, Component)]
pub struct Passenger {
    pub id: String,
    pub origin: Entity,
    pub destination: Entity,
    pub appear_time: u64,
    pub max_wait_time: u64,
    pub state: PassengerState,
    pub assigned_vehicle: Option<Entity>,
    pub assign_time: Option<u64>,
    pub pickup_time: Option<u64>,
    pub arrival_time: Option<u64>,
    pub abandon_time: Option<u64>,
}

impl Passenger {
    pub fn new(
        id: String,
        origin: Entity,
        destination: Entity,
        appear_time: u64,
        max_wait_time: u64,
    ) -> Self {
        Self {
            id,
            origin,
            destination,
            appear_time,
            max_wait_time,
            state: PassengerState::Waiting,
            assigned_vehicle: None,
            assign_time: None,
            pickup_time: None,
            arrival_time: None,
            abandon_time: None,
        }
    }

    fn guard(
        &self,
        allowed: &[PassengerState],
        action: &str,
    ) -> Result<(), TransitError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TransitError::InvalidTransition {
                entity: self.id.clone(),
                detail: format!("cannot {action} from state {:?}", self.state),
            })
        }
    }

    pub fn assign_to_vehicle(&mut self, vehicle: Entity, t: u64) -> Result<(), TransitError> {
        self.guard(&[PassengerState::Waiting], "assignToVehicle")?;
        self.state = PassengerState::Assigned;
        self.assign_time = Some(t);
        self.assigned_vehicle = Some(vehicle);
        Ok(())
    }

    pub fn board(&mut self, t: u64) -> Result<(), TransitError> {
        self.guard(
            &[PassengerState::Waiting, PassengerState::Assigned],
            "board",
        )?;
        self.state = PassengerState::Onboard;
        self.pickup_time = Some(t);
        Ok(())
    }

    pub fn arrive(&mut self, t: u64) -> Result<(), TransitError> {
        self.guard(&[PassengerState::Onboard], "arrive")?;
        if let Some(pickup) = self.pickup_time {
            if t < pickup {
                return Err(TransitError::TimeRegression(format!(
                    "{}: arrive({t}) precedes pickup({pickup})",
                    self.id
                )));
            }
        }
        self.state = PassengerState::Arrived;
        self.arrival_time = Some(t);
        Ok(())
    }

    pub fn abandon(&mut self, t: u64) -> Result<(), TransitError> {
        self.guard(
            &[PassengerState::Waiting, PassengerState::Assigned],
            "abandon",
        )?;
        self.state = PassengerState::Abandoned;
        self.abandon_time = Some(t);
        Ok(())
    }

    /// Pure predicate: has this passenger exceeded its patience, given it's
    /// still waiting (or assigned but not yet picked up) at `current_time`?
    pub fn check_timeout(&self, current_time: u64) -> bool {
        matches!(self.state, PassengerState::Waiting | PassengerState::Assigned)
            && current_time.saturating_sub(self.appear_time) > self.max_wait_time
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, PassengerState::Arrived | PassengerState::Abandoned)
    }

    /// `pickupTime - appearTime` if picked up, `abandonTime - appearTime` if
    /// abandoned, else `current_time - appearTime` for a passenger still
    /// waiting.
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
}
