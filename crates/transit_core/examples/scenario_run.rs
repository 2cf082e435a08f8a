//! Runs a small fixed scenario end to end and prints a summary.
//!
//! Run with: cargo run -p transit_core --example scenario_run

use bevy_ecs::prelude::World;

use transit_core::demand::{DeterministicDemandGenerator, DemandGenerator, PassengerAppearance};
use transit_core::engine::Engine;
use transit_core::oracle::DummyOracle;
use transit_core::oracle::TravelTimeOracle;
use transit_core::scenario::{build_scenario, BusSpec, Config, MinibusSpec, ScenarioInput, StationSpec};

fn main() {
    const NUM_STATIONS: usize = 6;
    const PER_HOP_SECS: u64 = 120;

    let stations: Vec<StationSpec> = (0..NUM_STATIONS)
        .map(|i| StationSpec {
            station_id: format!("S{i}"),
            name: format!("Station {i}"),
            lat: 0.0,
            lon: i as f64,
        })
        .collect();

    let buses = vec![BusSpec {
        id: "B0".into(),
        capacity: 40,
        schedule: vec![(0, 0), (2, 240), (4, 480)],
    }];

    let minibuses = vec![MinibusSpec {
        id: "M0".into(),
        capacity: 6,
        start_station_index: 1,
    }];

    let mut generator = DeterministicDemandGenerator::new(vec![
        PassengerAppearance {
            origin: 0,
            destination: 4,
            appear_time: 0,
            max_wait_time: 900,
        },
        PassengerAppearance {
            origin: 1,
            destination: 5,
            appear_time: 30,
            max_wait_time: 600,
        },
        PassengerAppearance {
            origin: 3,
            destination: 1,
            appear_time: 700,
            max_wait_time: 300,
        },
    ]);

    let config = Config {
        end_time_secs: 3600,
        optimize_interval_secs: 60,
        ..Config::default()
    };
    let demand = generator.generate(config.end_time_secs);

    let oracle: Box<dyn TravelTimeOracle> = Box::new(DummyOracle {
        per_hop_secs: PER_HOP_SECS,
    });

    let mut world = World::new();
    build_scenario(
        &mut world,
        config,
        oracle,
        ScenarioInput {
            stations,
            buses,
            minibuses,
            demand,
            ..ScenarioInput::default()
        },
    )
    .expect("scenario should build from valid fixed input");

    let mut engine = Engine::new(world);
    let steps = engine.run_until_empty();

    let current_time = engine.current_time();
    let telemetry = engine
        .world()
        .get_resource::<transit_core::telemetry::SimTelemetry>()
        .unwrap();
    let summary = telemetry.summary(current_time);

    println!("--- Scenario run ({NUM_STATIONS} stations, 1 bus, 1 minibus) ---");
    println!("Steps executed: {steps}");
    println!("Passengers: {}", summary.total_passengers);
    println!("  served:    {}", summary.served);
    println!("  abandoned: {}", summary.abandoned);
    println!("  avg wait:   {:.1}s", summary.average_wait_secs);
    println!("  avg travel: {:.1}s", summary.average_travel_secs);
}
