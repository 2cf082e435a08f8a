//! Configuration knobs, as a plain value type passed by value to
//! `build_scenario` — no global mutable state, mirroring the teacher's
//! `ScenarioParams`.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerType {
    Dummy,
    GreedyInsertion,
}

impl Default for OptimizerType {
    fn default() -> Self {
        Self::GreedyInsertion
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Resource)]
pub struct Config {
    /// Simulation end time, in seconds from the epoch offset.
    pub end_time_secs: u64,
    /// Offset the simulated clock starts at.
    pub simulation_start_offset_secs: u64,
    /// Interval between `OPTIMIZE_CALL` events, in seconds.
    pub optimize_interval_secs: u64,
    /// Maximum time a passenger waits before abandoning, in seconds.
    pub max_waiting_time_secs: u64,
    /// Cap on candidate detour time the optimizer tolerates before
    /// discarding a candidate as too slow, in seconds.
    pub max_detour_time_secs: u64,
    pub optimizer_type: OptimizerType,
    /// Travel-time oracle LRU cache capacity (entries).
    pub oracle_cache_capacity: usize,
    /// RNG seed for demand generation.
    pub demand_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            end_time_secs: 24 * 3600,
            simulation_start_offset_secs: 0,
            optimize_interval_secs: 60,
            max_waiting_time_secs: 900,
            max_detour_time_secs: 1800,
            optimizer_type: OptimizerType::default(),
            oracle_cache_capacity: 4096,
            demand_seed: 0,
        }
    }
}
