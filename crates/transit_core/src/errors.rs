//! Error taxonomy for the transit engine.
//!
//! One plain enum covering every named failure mode. No `thiserror`: `Display`
//! and `std::error::Error` are hand-written, matching the one error type the
//! teacher crate carries (`OsrmSpawnError`).

use std::fmt;

/// Sub-kinds of [`TransitError::DataLoadError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLoadErrorKind {
    FileMissing,
    ShapeMismatch,
    Schema,
}

impl fmt::Display for DataLoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileMissing => write!(f, "file missing"),
            Self::ShapeMismatch => write!(f, "shape mismatch"),
            Self::Schema => write!(f, "schema error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitError {
    /// Missing/invalid configuration. Fatal before engine start.
    ConfigError(String),
    /// Fatal at initialization: file missing, shape mismatch, or schema error.
    DataLoadError {
        kind: DataLoadErrorKind,
        detail: String,
    },
    /// Illegal state-machine call. Fatal — indicates a logic bug.
    InvalidTransition { entity: String, detail: String },
    /// Optimizer output or runtime boarding would exceed capacity. Recoverable:
    /// the offending plan is rejected and the minibus retains its prior plan.
    CapacityViolation(String),
    UnknownStation(String),
    UnknownVehicle(String),
    UnknownPassenger(String),
    /// A handler tried to schedule an event in the past, or record a
    /// timestamp that regresses past a recorded milestone. Fatal.
    TimeRegression(String),
    /// Negative or otherwise malformed event time passed to the queue.
    InvalidTime(String),
}

impl fmt::Display for TransitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "config error: {msg}"),
            Self::DataLoadError { kind, detail } => {
                write!(f, "data load error ({kind}): {detail}")
            }
            Self::InvalidTransition { entity, detail } => {
                write!(f, "invalid transition for {entity}: {detail}")
            }
            Self::CapacityViolation(msg) => write!(f, "capacity violation: {msg}"),
            Self::UnknownStation(id) => write!(f, "unknown station: {id}"),
            Self::UnknownVehicle(id) => write!(f, "unknown vehicle: {id}"),
            Self::UnknownPassenger(id) => write!(f, "unknown passenger: {id}"),
            Self::TimeRegression(msg) => write!(f, "time regression: {msg}"),
            Self::InvalidTime(msg) => write!(f, "invalid time: {msg}"),
        }
    }
}

impl std::error::Error for TransitError {}

/// Whether this error is recoverable at the point it's raised (only
/// capacity violations from optimizer output are — see spec §7).
impl TransitError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CapacityViolation(_))
    }
}
