//! Cumulative, time-dependent route cost.

use crate::errors::TransitError;
use crate::oracle::TravelTimeOracle;

use super::MergedStop;

/// Walk `stops` in order starting at `start_time`, accumulating
/// `travelTime(s_k, s_{k+1}, arrivalAt_k)` and advancing `arrivalAt_{k+1}`
/// by that leg. A fixed `start_time` reused for every leg is explicitly
/// wrong here — travel times are time-dependent, so each leg must query
/// the oracle at the arrival time of the leg before it.
pub fn cumulative_cost(
    stops: &[MergedStop],
    start_time: u64,
    oracle: &dyn TravelTimeOracle,
) -> Result<u64, TransitError> {
    if stops.len() <= 1 {
        return Ok(0);
    }
    let mut total = 0u64;
    let mut arrival = start_time;
    for pair in stops.windows(2) {
        let leg = oracle.get(pair[0].station_index, pair[1].station_index, arrival)?;
        total += leg;
        arrival += leg;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::DummyOracle;
    use bevy_ecs::prelude::World;

    #[test]
    fn empty_and_singleton_routes_cost_nothing() {
        let oracle = DummyOracle { per_hop_secs: 10 };
        assert_eq!(cumulative_cost(&[], 0, &oracle).unwrap(), 0);

        let mut world = World::new();
        let e = world.spawn_empty().id();
        let stop = MergedStop::pickup_only(e, 0, e);
        assert_eq!(cumulative_cost(&[stop], 0, &oracle).unwrap(), 0);
    }

    #[test]
    fn cumulative_walk_sums_legs_in_order() {
        let oracle = DummyOracle { per_hop_secs: 10 };
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let c = world.spawn_empty().id();
        let p = world.spawn_empty().id();

        let stops = vec![
            MergedStop::pickup_only(a, 0, p),
            MergedStop::pickup_only(b, 2, p),
            MergedStop::dropoff_only(c, 5, p),
        ];
        // 0->2 costs 20, 2->5 costs 30, total 50.
        assert_eq!(cumulative_cost(&stops, 0, &oracle).unwrap(), 50);
    }
}
