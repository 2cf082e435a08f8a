//! Entry point: load configuration and network data, build the scenario,
//! run it to completion, and write the passenger/vehicle reports. Mirrors
//! the original program's flow (parse args, build config, validate,
//! initialize, run, summarize) under `clap` + `log` instead of `argparse` +
//! the stdlib `logging` module.

mod cli;
mod config_io;
mod data_io;
mod report;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use transit_core::demand::{DemandGenerator, DeterministicDemandGenerator, OdMatrixDemandGenerator};
use transit_core::engine::Engine;
use transit_core::oracle::{CachedOracle, MatrixOracle, TravelTimeOracle};
use transit_core::scenario::{build_scenario, ScenarioInput};
use transit_core::TransitError;

use cli::Cli;
use config_io::PassengerGenerationMethod;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        std::env::set_var("RUST_LOG", level);
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("fatal error: {err}");
            eprintln!("fatal error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), TransitError> {
    info!("loading configuration from {}", cli.config.display());
    let config = config_io::load_config(&cli.config)?;
    let config = config_io::apply_overrides(config, &cli.overrides());
    config_io::validate(&config)?;

    info!("loading station network from {}", cli.stations.display());
    let stations = data_io::load_stations(&cli.stations)?;

    let matrix = data_io::load_travel_time_matrix(&cli.travel_time_matrix, &cli.travel_time_meta)?;
    let matrix_oracle = MatrixOracle::from_flat(
        matrix.data,
        matrix.num_stations,
        matrix.num_slots,
        matrix.slot_duration_secs,
    )?;
    let (_, engine_config) = config_io::into_engine_config(&config)?;
    let oracle: Box<dyn TravelTimeOracle> =
        Box::new(CachedOracle::new(matrix_oracle, engine_config.oracle_cache_capacity));

    let buses = match &cli.bus_schedule {
        Some(path) => data_io::load_bus_schedule(path, &stations.index_of, config.bus_capacity)?,
        None => Vec::new(),
    };

    let minibuses = data_io::build_minibus_specs(
        &config.minibus_initial_locations,
        &stations.index_of,
        config.minibus_capacity,
    )?;

    let demand = match config.passenger_generation_method {
        PassengerGenerationMethod::Test => {
            let path = cli.demand.as_ref().ok_or_else(|| {
                TransitError::ConfigError(
                    "passengerGenerationMethod 'test' requires --demand".into(),
                )
            })?;
            let mut generator = DeterministicDemandGenerator::new(data_io::load_deterministic_demand(
                path,
                &stations.index_of,
            )?);
            generator.generate(engine_config.end_time_secs)
        }
        PassengerGenerationMethod::OdMatrix => {
            let (od_path, od_meta_path) = match (&cli.od_matrix, &cli.od_matrix_meta) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(TransitError::ConfigError(
                        "passengerGenerationMethod 'od_matrix' requires --od-matrix and --od-matrix-meta"
                            .into(),
                    ))
                }
            };
            let od = data_io::load_od_matrix(od_path, od_meta_path, stations.specs.len())?;
            let mut generator = OdMatrixDemandGenerator::new(
                od.data,
                stations.specs.len(),
                od.num_slots,
                od.slot_duration_secs,
                config.passenger_max_wait_time,
                config.demand_seed,
            );
            generator.generate(engine_config.end_time_secs)
        }
    };

    info!(
        "building scenario: {} stations, {} buses, {} minibuses, {} passengers",
        stations.specs.len(),
        buses.len(),
        minibuses.len(),
        demand.len()
    );

    let mut world = bevy_ecs::prelude::World::new();
    build_scenario(
        &mut world,
        engine_config,
        oracle,
        ScenarioInput {
            stations: stations.specs,
            buses,
            minibuses,
            demand,
            route_plan_overrides: data_io::load_route_plan_overrides(
                cli.route_plan_overrides.as_deref(),
            )?,
        },
    )?;

    let mut engine = Engine::new(world);
    info!("running simulation...");
    let steps = engine.run_until_empty();
    info!("simulation finished after {steps} events");

    let current_time = engine.current_time();
    let output_dir = std::path::Path::new(&config.output_dir);
    let telemetry = engine
        .world()
        .get_resource::<transit_core::telemetry::SimTelemetry>()
        .expect("SimTelemetry resource is always inserted by build_scenario");
    let summary = report::write_reports(output_dir, telemetry, current_time)?;
    report::print_summary(&summary);

    Ok(())
}
