mod build;
mod params;

pub use build::{build_scenario, BusSpec, MinibusSpec, ScenarioInput, StationSpec};
pub use params::{Config, OptimizerType};
