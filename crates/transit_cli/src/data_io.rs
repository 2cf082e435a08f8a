//! Loads station, travel-time matrix, OD-matrix, and bus schedule files from
//! disk per spec §6's wire formats, then hands the parsed values to
//! `transit_core::scenario`. Travel-time and OD matrices are flat `f32`
//! arrays written little-endian, not `bincode` — the wire format is a raw
//! numeric blob, not a serialized Rust type, so `data_io` reads it directly
//! via chunked `f32::from_le_bytes` the way the teacher's precomputed-route
//! loader reads its own binary blob.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use transit_core::demand::PassengerAppearance;
use transit_core::errors::DataLoadErrorKind;
use transit_core::optimizer::RouteStopWire;
use transit_core::scenario::{BusSpec, MinibusSpec, StationSpec};
use transit_core::TransitError;

#[derive(Debug, Deserialize)]
struct StationFile {
    stations: Vec<StationEntry>,
}

#[derive(Debug, Deserialize)]
struct StationEntry {
    station_id: String,
    name: String,
    location: (f64, f64),
    index: usize,
}

/// Loaded stations in index order, plus a lookup from external station id to
/// matrix index for resolving bus schedules and minibus start locations.
pub struct StationTable {
    pub specs: Vec<StationSpec>,
    pub index_of: HashMap<String, usize>,
}

pub fn load_stations<P: AsRef<Path>>(path: P) -> Result<StationTable, TransitError> {
    let text = read_to_string(&path)?;
    let parsed: StationFile = serde_json::from_str(&text).map_err(schema_error)?;

    let n = parsed.stations.len();
    let mut specs: Vec<Option<StationSpec>> = (0..n).map(|_| None).collect();
    let mut index_of = HashMap::with_capacity(n);

    for entry in parsed.stations {
        if entry.index >= n {
            return Err(TransitError::DataLoadError {
                kind: DataLoadErrorKind::ShapeMismatch,
                detail: format!(
                    "station {} has index {} but only {n} stations were declared",
                    entry.station_id, entry.index
                ),
            });
        }
        if specs[entry.index].is_some() {
            return Err(TransitError::DataLoadError {
                kind: DataLoadErrorKind::ShapeMismatch,
                detail: format!("station index {} is used more than once", entry.index),
            });
        }
        index_of.insert(entry.station_id.clone(), entry.index);
        specs[entry.index] = Some(StationSpec {
            station_id: entry.station_id,
            name: entry.name,
            lat: entry.location.0,
            lon: entry.location.1,
        });
    }

    let specs: Option<Vec<StationSpec>> = specs.into_iter().collect();
    let specs = specs.ok_or_else(|| TransitError::DataLoadError {
        kind: DataLoadErrorKind::ShapeMismatch,
        detail: format!("station indices do not cover [0, {n}) exactly once"),
    })?;

    Ok(StationTable { specs, index_of })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatrixMetadata {
    /// Not consulted directly: station identity/ordering is already fixed by
    /// the station file; this is kept only to accept the documented wire
    /// format without rejecting unknown-but-valid metadata.
    #[serde(default)]
    #[allow(dead_code)]
    station_mapping: HashMap<String, usize>,
    #[serde(default)]
    time_slot_duration_seconds: u64,
    #[serde(default = "default_one")]
    n_time_slots: usize,
    matrix_shape: Vec<usize>,
}

fn default_one() -> usize {
    1
}

pub struct TravelTimeMatrix {
    pub data: Vec<f32>,
    pub num_stations: usize,
    pub num_slots: usize,
    pub slot_duration_secs: u64,
}

/// Reads the metadata JSON for shape, then the binary file as a flat
/// little-endian `f32` array matching that shape.
pub fn load_travel_time_matrix<P: AsRef<Path>>(
    binary_path: P,
    metadata_path: P,
) -> Result<TravelTimeMatrix, TransitError> {
    let meta_text = read_to_string(&metadata_path)?;
    let meta: MatrixMetadata = serde_json::from_str(&meta_text).map_err(schema_error)?;

    let num_stations = *meta.matrix_shape.first().ok_or_else(|| {
        TransitError::DataLoadError {
            kind: DataLoadErrorKind::Schema,
            detail: "matrixShape must be non-empty".into(),
        }
    })?;
    let num_slots = meta.n_time_slots.max(1);

    let bytes = fs::read(&binary_path).map_err(|e| TransitError::DataLoadError {
        kind: DataLoadErrorKind::FileMissing,
        detail: format!("{}: {e}", binary_path.as_ref().display()),
    })?;

    let expected_len = num_stations * num_stations * num_slots;
    let data = read_flat_f32(&bytes, expected_len)?;

    Ok(TravelTimeMatrix {
        data,
        num_stations,
        num_slots,
        slot_duration_secs: meta.time_slot_duration_seconds,
    })
}

fn read_flat_f32(bytes: &[u8], expected_len: usize) -> Result<Vec<f32>, TransitError> {
    if bytes.len() != expected_len * 4 {
        return Err(TransitError::DataLoadError {
            kind: DataLoadErrorKind::ShapeMismatch,
            detail: format!(
                "expected {expected_len} f32 entries ({} bytes), found {} bytes",
                expected_len * 4,
                bytes.len()
            ),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[derive(Debug, Deserialize)]
struct BusScheduleRow {
    bus_id: String,
    #[allow(dead_code)]
    route_name: String,
    stop_sequence: u32,
    station_id: String,
    arrival_time: String,
}

/// Groups rows by `bus_id`, sorts each group by `stop_sequence`, converts
/// `arrival_time` (`HH:MM:SS`) to seconds since midnight, and validates that
/// arrival times are strictly increasing within each bus.
pub fn load_bus_schedule<P: AsRef<Path>>(
    path: P,
    station_index: &HashMap<String, usize>,
    bus_capacity: usize,
) -> Result<Vec<BusSpec>, TransitError> {
    let mut reader = csv::Reader::from_path(&path).map_err(|e| TransitError::DataLoadError {
        kind: DataLoadErrorKind::FileMissing,
        detail: format!("{}: {e}", path.as_ref().display()),
    })?;

    let mut by_bus: HashMap<String, Vec<(u32, usize, u64)>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for row in reader.deserialize::<BusScheduleRow>() {
        let row = row.map_err(schema_error)?;
        let index = *station_index.get(&row.station_id).ok_or_else(|| {
            TransitError::UnknownStation(format!(
                "bus schedule references unknown station id {}",
                row.station_id
            ))
        })?;
        let arrival = parse_hms(&row.arrival_time)?;
        if !by_bus.contains_key(&row.bus_id) {
            order.push(row.bus_id.clone());
        }
        by_bus
            .entry(row.bus_id)
            .or_default()
            .push((row.stop_sequence, index, arrival));
    }

    let mut specs = Vec::with_capacity(order.len());
    for bus_id in order {
        let mut stops = by_bus.remove(&bus_id).unwrap_or_default();
        stops.sort_by_key(|(sequence, _, _)| *sequence);

        let mut last_time: Option<u64> = None;
        let mut schedule = Vec::with_capacity(stops.len());
        for (_, index, arrival) in stops {
            if let Some(last) = last_time {
                if arrival <= last {
                    return Err(TransitError::DataLoadError {
                        kind: DataLoadErrorKind::Schema,
                        detail: format!(
                            "bus {bus_id} arrival times are not strictly increasing at {arrival}s"
                        ),
                    });
                }
            }
            last_time = Some(arrival);
            schedule.push((index, arrival));
        }

        specs.push(BusSpec {
            id: bus_id,
            capacity: bus_capacity,
            schedule,
        });
    }

    Ok(specs)
}

pub fn build_minibus_specs(
    locations: &[String],
    station_index: &HashMap<String, usize>,
    capacity: usize,
) -> Result<Vec<MinibusSpec>, TransitError> {
    locations
        .iter()
        .enumerate()
        .map(|(i, station_id)| {
            station_index
                .get(station_id)
                .copied()
                .map(|start_station_index| MinibusSpec {
                    id: format!("M{i}"),
                    capacity,
                    start_station_index,
                })
                .ok_or_else(|| {
                    TransitError::UnknownStation(format!(
                        "minibus initial location references unknown station id {station_id}"
                    ))
                })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OdMetadata {
    #[serde(default)]
    #[allow(dead_code)]
    station_ids: Vec<String>,
    n_time_slots: usize,
    #[serde(default)]
    time_slot_duration_seconds: u64,
}

pub struct OdMatrix {
    pub data: Vec<f32>,
    pub num_slots: usize,
    pub slot_duration_secs: u64,
}

/// Reads the optional origin-destination demand-rate matrix: `(N, N, T)` of
/// expected passengers per slot, `N` taken from the station count since the
/// OD metadata names slots and station ids, not a matrix shape.
pub fn load_od_matrix<P: AsRef<Path>>(
    binary_path: P,
    metadata_path: P,
    num_stations: usize,
) -> Result<OdMatrix, TransitError> {
    let meta_text = read_to_string(&metadata_path)?;
    let meta: OdMetadata = serde_json::from_str(&meta_text).map_err(schema_error)?;

    let bytes = fs::read(&binary_path).map_err(|e| TransitError::DataLoadError {
        kind: DataLoadErrorKind::FileMissing,
        detail: format!("{}: {e}", binary_path.as_ref().display()),
    })?;
    let num_slots = meta.n_time_slots.max(1);
    let expected_len = num_stations * num_stations * num_slots;
    let data = read_flat_f32(&bytes, expected_len)?;

    Ok(OdMatrix {
        data,
        num_slots,
        slot_duration_secs: meta.time_slot_duration_seconds,
    })
}

#[derive(Debug, Deserialize)]
struct DemandFile {
    passengers: Vec<DemandEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DemandEntry {
    origin: String,
    destination: String,
    appear_time: u64,
    max_wait_time: u64,
}

/// Loads a fixed roster of passenger appearances for
/// `passengerGenerationMethod: test`, resolving station ids to indices.
pub fn load_deterministic_demand<P: AsRef<Path>>(
    path: P,
    station_index: &HashMap<String, usize>,
) -> Result<Vec<PassengerAppearance>, TransitError> {
    let text = read_to_string(&path)?;
    let parsed: DemandFile = serde_json::from_str(&text).map_err(schema_error)?;

    parsed
        .passengers
        .into_iter()
        .map(|entry| {
            let origin = *station_index.get(&entry.origin).ok_or_else(|| {
                TransitError::UnknownStation(format!(
                    "demand entry references unknown origin {}",
                    entry.origin
                ))
            })?;
            let destination = *station_index.get(&entry.destination).ok_or_else(|| {
                TransitError::UnknownStation(format!(
                    "demand entry references unknown destination {}",
                    entry.destination
                ))
            })?;
            Ok(PassengerAppearance {
                origin,
                destination,
                appear_time: entry.appear_time,
                max_wait_time: entry.max_wait_time,
            })
        })
        .collect()
}

/// Loads spec.md §6's optimizer route-plan wire format, `{ minibusId: [
/// { station_id, action, passenger_ids }, ... ] }`, keyed by the minibus ids
/// given in `MinibusSpec::id`. Returns an empty map when `path` is `None` —
/// route plan overrides are optional, most scenarios have none.
pub fn load_route_plan_overrides<P: AsRef<Path>>(
    path: Option<P>,
) -> Result<HashMap<String, Vec<RouteStopWire>>, TransitError> {
    let Some(path) = path else {
        return Ok(HashMap::new());
    };
    let text = read_to_string(&path)?;
    serde_json::from_str(&text).map_err(schema_error)
}

fn parse_hms(value: &str) -> Result<u64, TransitError> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return Err(TransitError::DataLoadError {
            kind: DataLoadErrorKind::Schema,
            detail: format!("invalid time format (expected HH:MM:SS): {value}"),
        });
    }
    let mut secs = 0u64;
    for (unit, part) in [3600u64, 60, 1].iter().zip(parts.iter()) {
        let value: u64 = part.parse().map_err(|_| TransitError::DataLoadError {
            kind: DataLoadErrorKind::Schema,
            detail: format!("invalid time component in {value}"),
        })?;
        secs += unit * value;
    }
    Ok(secs)
}

fn read_to_string<P: AsRef<Path>>(path: &P) -> Result<String, TransitError> {
    fs::read_to_string(path).map_err(|e| TransitError::DataLoadError {
        kind: DataLoadErrorKind::FileMissing,
        detail: format!("{}: {e}", path.as_ref().display()),
    })
}

fn schema_error<E: std::fmt::Display>(e: E) -> TransitError {
    TransitError::DataLoadError {
        kind: DataLoadErrorKind::Schema,
        detail: e.to_string(),
    }
}
