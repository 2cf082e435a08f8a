//! Command-line surface: one program, no subcommands, matching the shape of
//! the traffic simulation entry point this replaces rather than the
//! multi-command task-runner style of an internal dev tool.

use std::path::PathBuf;

use clap::Parser;

use crate::config_io::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "transit_cli",
    about = "Runs a mixed urban transit simulation from configuration and network data files"
)]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long)]
    pub config: PathBuf,

    /// Path to the station JSON file.
    #[arg(long)]
    pub stations: PathBuf,

    /// Path to the binary travel-time matrix.
    #[arg(long)]
    pub travel_time_matrix: PathBuf,

    /// Path to the travel-time matrix metadata JSON.
    #[arg(long)]
    pub travel_time_meta: PathBuf,

    /// Path to the bus schedule CSV. Omit for a minibus-only scenario.
    #[arg(long)]
    pub bus_schedule: Option<PathBuf>,

    /// Path to a JSON file of `{ "passengers": [ { origin, destination,
    /// appearTime, maxWaitTime } ] }` for `passengerGenerationMethod: test`.
    #[arg(long)]
    pub demand: Option<PathBuf>,

    /// Path to the binary OD-matrix, for `passengerGenerationMethod: od_matrix`.
    #[arg(long = "od-matrix")]
    pub od_matrix: Option<PathBuf>,

    /// Path to the OD-matrix metadata JSON.
    #[arg(long = "od-matrix-meta")]
    pub od_matrix_meta: Option<PathBuf>,

    /// Overrides `outputDir` from the config file.
    #[arg(long = "output-dir")]
    pub output_dir: Option<String>,

    /// Overrides `simulationStartTime` (HH:MM:SS).
    #[arg(long = "start-time")]
    pub start_time: Option<String>,

    /// Overrides `simulationEndTime` (HH:MM:SS).
    #[arg(long = "end-time")]
    pub end_time: Option<String>,

    /// Overrides `simulationDate` (YYYY-MM-DD).
    #[arg(long = "date")]
    pub date: Option<String>,

    /// Overrides the `RUST_LOG` level for this run.
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    /// Path to a JSON file of `{ minibusId: [ { station_id, action,
    /// passenger_ids }, ... ] }` seeding initial minibus route plans.
    #[arg(long = "route-plan-overrides")]
    pub route_plan_overrides: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            output_dir: self.output_dir.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            date: self.date.clone(),
        }
    }
}
