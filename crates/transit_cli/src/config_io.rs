//! Loads the JSON configuration file and applies command-line overrides,
//! mirroring the override-merge flow of the program this CLI replaces:
//! `build_config_dict` starts from the file, then patches in whatever the
//! caller passed on the command line.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use transit_core::scenario::{Config, OptimizerType};
use transit_core::TransitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerGenerationMethod {
    Test,
    OdMatrix,
}

/// The on-disk configuration shape from spec §6. Field names are `camelCase`
/// to match the wire format; internal callers use `Config` (transit_core's
/// runtime knobs), which this type converts into via [`RunConfig::into_engine_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub simulation_date: String,
    pub simulation_start_time: String,
    pub simulation_end_time: String,
    pub num_buses: usize,
    pub bus_capacity: usize,
    pub num_minibuses: usize,
    pub minibus_capacity: usize,
    pub minibus_initial_locations: Vec<String>,
    pub optimization_interval: u64,
    pub passenger_max_wait_time: u64,
    pub passenger_generation_method: PassengerGenerationMethod,
    pub optimizer_type: RunOptimizerType,
    pub output_dir: String,
    #[serde(default)]
    pub demand_seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOptimizerType {
    Dummy,
    GreedyInsertion,
}

impl From<RunOptimizerType> for OptimizerType {
    fn from(value: RunOptimizerType) -> Self {
        match value {
            RunOptimizerType::Dummy => OptimizerType::Dummy,
            RunOptimizerType::GreedyInsertion => OptimizerType::GreedyInsertion,
        }
    }
}

/// Command-line values that, when present, override the corresponding field
/// loaded from the config file.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub output_dir: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub date: Option<String>,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, TransitError> {
    let text = fs::read_to_string(&path).map_err(|e| {
        TransitError::DataLoadError {
            kind: transit_core::errors::DataLoadErrorKind::FileMissing,
            detail: format!("{}: {e}", path.as_ref().display()),
        }
    })?;
    serde_json::from_str(&text).map_err(|e| TransitError::DataLoadError {
        kind: transit_core::errors::DataLoadErrorKind::Schema,
        detail: format!("config file: {e}"),
    })
}

pub fn apply_overrides(mut config: RunConfig, overrides: &ConfigOverrides) -> RunConfig {
    if let Some(output_dir) = &overrides.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(start_time) = &overrides.start_time {
        config.simulation_start_time = start_time.clone();
    }
    if let Some(end_time) = &overrides.end_time {
        config.simulation_end_time = end_time.clone();
    }
    if let Some(date) = &overrides.date {
        config.simulation_date = date.clone();
    }
    config
}

/// Parses `HH:MM:SS` into seconds since midnight.
fn parse_hms(value: &str) -> Result<u64, TransitError> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return Err(TransitError::ConfigError(format!(
            "invalid time format (expected HH:MM:SS): {value}"
        )));
    }
    let mut secs = 0u64;
    for (unit, part) in [3600u64, 60, 1].iter().zip(parts.iter()) {
        let value: u64 = part.parse().map_err(|_| {
            TransitError::ConfigError(format!("invalid time component in {value}"))
        })?;
        secs += unit * value;
    }
    Ok(secs)
}

pub fn validate(config: &RunConfig) -> Result<(), TransitError> {
    let start = parse_hms(&config.simulation_start_time)?;
    let end = parse_hms(&config.simulation_end_time)?;
    if start >= end {
        return Err(TransitError::ConfigError(
            "simulationStartTime must be before simulationEndTime".into(),
        ));
    }
    if config.num_minibuses != config.minibus_initial_locations.len() {
        return Err(TransitError::ConfigError(format!(
            "numMinibuses ({}) does not match minibusInitialLocations length ({})",
            config.num_minibuses,
            config.minibus_initial_locations.len()
        )));
    }
    Ok(())
}

/// The simulated horizon in seconds, `[0, end - start)`, and the engine's
/// runtime configuration record.
pub fn into_engine_config(config: &RunConfig) -> Result<(u64, Config), TransitError> {
    let start = parse_hms(&config.simulation_start_time)?;
    let end = parse_hms(&config.simulation_end_time)?;
    let horizon = end - start;
    Ok((
        horizon,
        Config {
            end_time_secs: horizon,
            simulation_start_offset_secs: start,
            optimize_interval_secs: config.optimization_interval,
            max_waiting_time_secs: config.passenger_max_wait_time,
            max_detour_time_secs: Config::default().max_detour_time_secs,
            optimizer_type: config.optimizer_type.into(),
            oracle_cache_capacity: Config::default().oracle_cache_capacity,
            demand_seed: config.demand_seed,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunConfig {
        RunConfig {
            simulation_date: "2026-01-05".into(),
            simulation_start_time: "06:00:00".into(),
            simulation_end_time: "22:00:00".into(),
            num_buses: 2,
            bus_capacity: 40,
            num_minibuses: 1,
            minibus_capacity: 6,
            minibus_initial_locations: vec!["S0".into()],
            optimization_interval: 60,
            passenger_max_wait_time: 900,
            passenger_generation_method: PassengerGenerationMethod::Test,
            optimizer_type: RunOptimizerType::GreedyInsertion,
            output_dir: "out".into(),
            demand_seed: 7,
        }
    }

    #[test]
    fn overrides_patch_only_named_fields() {
        let base = sample();
        let patched = apply_overrides(
            base,
            &ConfigOverrides {
                output_dir: Some("other".into()),
                start_time: None,
                end_time: None,
                date: None,
            },
        );
        assert_eq!(patched.output_dir, "other");
        assert_eq!(patched.simulation_start_time, "06:00:00");
    }

    #[test]
    fn rejects_start_after_end() {
        let mut config = sample();
        config.simulation_start_time = "23:00:00".into();
        config.simulation_end_time = "06:00:00".into();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_minibus_count_mismatch() {
        let mut config = sample();
        config.num_minibuses = 2;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn computes_horizon_from_start_and_end() {
        let config = sample();
        let (horizon, engine_config) = into_engine_config(&config).unwrap();
        assert_eq!(horizon, 16 * 3600);
        assert_eq!(engine_config.end_time_secs, horizon);
        assert_eq!(engine_config.optimize_interval_secs, 60);
    }
}
