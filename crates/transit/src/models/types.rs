//! Core data types for feed records.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use geo::Point;

use crate::identifiers::*;

// ============================================================================
// Data Structures
// ============================================================================

/// A stop (or station) as loaded from a feed, plus the adjacency derived later.
///
/// `int_id` is assigned by [`StopMap`](crate::models::StopMap) on insertion;
/// values set before that are overwritten.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopIdentifier,
    pub int_id: u32,
    pub name: Arc<str>,
    /// `None` when the feed's coordinates could not be parsed.
    pub location: Option<Point>,
    pub is_station: bool,
    pub is_virtual: bool,
    pub parent: Option<StopIdentifier>,
    pub neighbors: BTreeSet<StopIdentifier>,
}

impl Stop {
    pub fn new(id: impl Into<StopIdentifier>, name: impl AsRef<str>, location: Option<Point>) -> Self {
        Self {
            id: id.into(),
            int_id: 0,
            name: name.as_ref().into(),
            location,
            is_station: false,
            is_virtual: false,
            parent: None,
            neighbors: BTreeSet::new(),
        }
    }

    /// Convenience constructor taking latitude/longitude in degrees.
    pub fn at(id: impl Into<StopIdentifier>, name: impl AsRef<str>, lat: f64, lon: f64) -> Self {
        Self::new(id, name, Some(Point::new(lon, lat)))
    }

    pub fn with_parent(mut self, parent: impl Into<StopIdentifier>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_station(mut self, is_station: bool) -> Self {
        self.is_station = is_station;
        self
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn lat(&self) -> Option<f64> {
        self.location.map(|p| p.y())
    }

    pub fn lon(&self) -> Option<f64> {
        self.location.map(|p| p.x())
    }
}

/// One row of a trip's stop order: which stop, at which position.
///
/// Visits carry no trip id; runs are recovered from the sequence trend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visit {
    pub stop_id: StopIdentifier,
    /// `None` when the row's position in its trip is unknown; ends the run
    pub sequence: Option<u32>,
}

impl Visit {
    pub fn new(stop_id: impl Into<StopIdentifier>, sequence: u32) -> Self {
        Self {
            stop_id: stop_id.into(),
            sequence: Some(sequence),
        }
    }

    /// A visit that could not be placed in its trip.
    pub fn unsequenced(stop_id: impl Into<StopIdentifier>) -> Self {
        Self {
            stop_id: stop_id.into(),
            sequence: None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing column `{column}` in {}", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl TransitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransitError>;
