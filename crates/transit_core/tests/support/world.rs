#![allow(dead_code)]

use bevy_ecs::prelude::World;

use transit_core::demand::{DeterministicDemandGenerator, DemandGenerator, PassengerAppearance};
use transit_core::oracle::{DummyOracle, TravelTimeOracle};
use transit_core::scenario::{
    build_scenario, BusSpec, Config, MinibusSpec, ScenarioInput, StationSpec,
};

/// Builds a linear network of `num_stations` stops spaced `per_hop_secs`
/// apart (station `i` to `i+1` costs `per_hop_secs`, further stations cost
/// proportionally more), mirroring the teacher's `TestWorldBuilder` shape:
/// a small struct of knobs with sane defaults, consumed by `build()`.
pub struct TestWorldBuilder {
    pub num_stations: usize,
    pub per_hop_secs: u64,
    pub minibus_capacity: usize,
    pub num_minibuses: usize,
    pub config: Config,
    pub demand: Vec<PassengerAppearance>,
    pub buses: Vec<BusSpec>,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self {
            num_stations: 4,
            per_hop_secs: 100,
            minibus_capacity: 4,
            num_minibuses: 1,
            config: Config {
                optimize_interval_secs: 50,
                max_waiting_time_secs: 900,
                ..Config::default()
            },
            demand: Vec::new(),
            buses: Vec::new(),
        }
    }
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_demand(mut self, demand: Vec<PassengerAppearance>) -> Self {
        self.demand = demand;
        self
    }

    pub fn with_buses(mut self, buses: Vec<BusSpec>) -> Self {
        self.buses = buses;
        self
    }

    pub fn with_minibuses(mut self, count: usize, capacity: usize) -> Self {
        self.num_minibuses = count;
        self.minibus_capacity = capacity;
        self
    }

    pub fn build(self) -> World {
        let stations = (0..self.num_stations)
            .map(|i| StationSpec {
                station_id: format!("S{i}"),
                name: format!("Station {i}"),
                lat: 0.0,
                lon: i as f64,
            })
            .collect();

        let minibuses = (0..self.num_minibuses)
            .map(|i| MinibusSpec {
                id: format!("M{i}"),
                capacity: self.minibus_capacity,
                start_station_index: 0,
            })
            .collect();

        let mut demand = self.demand;
        let mut generator = DeterministicDemandGenerator::new(std::mem::take(&mut demand));
        let demand = generator.generate(self.config.end_time_secs);

        let oracle: Box<dyn TravelTimeOracle> = Box::new(DummyOracle {
            per_hop_secs: self.per_hop_secs,
        });

        let mut world = World::new();
        build_scenario(
            &mut world,
            self.config,
            oracle,
            ScenarioInput {
                stations,
                buses: self.buses,
                minibuses,
                demand,
                ..ScenarioInput::default()
            },
        )
        .expect("scenario should build from valid test fixtures");
        world
    }
}
