//! Sensor readings.

use serde::{Deserialize, Serialize};

use crate::Position;

/// Kind of probe that produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Probe at a fixed layout position, interpolated by inverse distance.
    #[serde(rename = "nchc")]
    DistributedProbe,
    /// Thermocouple embedded in a rack cell.
    #[serde(rename = "aidc")]
    EmbeddedCuringProbe,
}

impl SensorKind {
    /// Short tag used in artifact names and on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            SensorKind::DistributedProbe => "nchc",
            SensorKind::EmbeddedCuringProbe => "aidc",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which readings take part in an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorFilter {
    #[default]
    All,
    DistributedOnly,
    CuringOnly,
}

/// A single sensor reading in the enclosure-centered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub position: Position,
    pub value: f64,
    pub valid: bool,
    #[serde(rename = "type")]
    pub kind: SensorKind,
}

impl SensorReading {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Position,
        value: f64,
        kind: SensorKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            value,
            valid: true,
            kind,
        }
    }

    /// Shorthand for a valid distributed probe.
    pub fn distributed(id: impl Into<String>, position: Position, value: f64) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, position, value, SensorKind::DistributedProbe)
    }

    /// Shorthand for a valid curing probe.
    pub fn curing(id: impl Into<String>, position: Position, value: f64) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, position, value, SensorKind::EmbeddedCuringProbe)
    }

    /// Mark validity against an inclusive value range.
    pub fn with_valid_range(mut self, min: f64, max: f64) -> Self {
        self.valid = self.value >= min && self.value <= max;
        self
    }

    pub fn is_distributed(&self) -> bool {
        self.kind == SensorKind::DistributedProbe
    }

    pub fn is_curing(&self) -> bool {
        self.kind == SensorKind::EmbeddedCuringProbe
    }
}

/// Min and max value over a set of readings, `(0, 0)` when empty.
pub fn value_range(readings: &[SensorReading]) -> (f64, f64) {
    let mut iter = readings.iter().map(|r| r.value);
    let Some(first) = iter.next() else {
        return (0.0, 0.0);
    };
    iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v)))
}
