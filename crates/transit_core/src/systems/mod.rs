pub mod bus_arrival;
pub mod minibus_arrival;
pub mod optimize_call;
pub mod passenger_appear;
pub mod passenger_timeout;

use bevy_ecs::prelude::Res;

use crate::clock::{CurrentEvent, EventKind};

pub fn is_bus_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::BusArrival).unwrap_or(false)
}

pub fn is_minibus_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::MinibusArrival).unwrap_or(false)
}

pub fn is_passenger_appear(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::PassengerAppear).unwrap_or(false)
}

pub fn is_optimize_call(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::OptimizeCall).unwrap_or(false)
}

pub fn is_passenger_timeout(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::PassengerTimeout).unwrap_or(false)
}
