//! Turning raw snapshot values into sensor readings.

use std::collections::HashMap;

use oven_common::{OvenError, OvenGeometry, OvenResult, Position, SensorReading};
use tracing::{debug, warn};

use crate::config::ValidRange;
use crate::source::{CuringLayoutEntry, ProbeLayoutEntry};

/// Builds the readings of one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotAssembler<'a> {
    geometry: &'a OvenGeometry,
    valid_range: ValidRange,
}

impl<'a> SnapshotAssembler<'a> {
    pub fn new(geometry: &'a OvenGeometry, valid_range: ValidRange) -> Self {
        Self {
            geometry,
            valid_range,
        }
    }

    /// Distributed readings first (layout order), then curing readings (row order).
    ///
    /// Unparsable, missing and out-of-range values drop single readings. A
    /// snapshot with nothing left is [`OvenError::NoReadings`].
    pub fn assemble(
        &self,
        source: &str,
        raw: &HashMap<String, String>,
        probes: &[ProbeLayoutEntry],
        curing: &[CuringLayoutEntry],
    ) -> OvenResult<Vec<SensorReading>> {
        let mut readings: Vec<SensorReading> = probes
            .iter()
            .filter_map(|probe| self.distributed(raw, probe))
            .collect();
        let distributed = readings.len();

        for (i, entry) in curing.iter().enumerate() {
            match self.curing(source, i + 1, raw, entry) {
                Ok(Some(reading)) => readings.push(reading),
                Ok(None) => {}
                Err(e) if e.is_per_reading() => {
                    warn!(source = source, row = i + 1, error = %e, "Dropping curing probe");
                }
                Err(e) => return Err(e),
            }
        }

        if readings.is_empty() {
            return Err(OvenError::NoReadings(source.to_string()));
        }

        debug!(
            source = source,
            distributed = distributed,
            curing = readings.len() - distributed,
            "Assembled snapshot"
        );
        Ok(readings)
    }

    fn distributed(
        &self,
        raw: &HashMap<String, String>,
        probe: &ProbeLayoutEntry,
    ) -> Option<SensorReading> {
        let value = parse_value(raw, &probe.id)?;
        let position = self
            .geometry
            .enclosure
            .normalize(Position::new(probe.x, probe.y, probe.z));
        let reading = SensorReading::distributed(probe.id.clone(), position, value)
            .with_valid_range(self.valid_range.min, self.valid_range.max);
        let reading = SensorReading {
            name: probe.name.clone(),
            ..reading
        };
        reading.valid.then_some(reading)
    }

    /// Mean of the row's parsable in-range thermocouples, at its cell center.
    fn curing(
        &self,
        source: &str,
        row_number: usize,
        raw: &HashMap<String, String>,
        entry: &CuringLayoutEntry,
    ) -> OvenResult<Option<SensorReading>> {
        let values: Vec<f64> = entry
            .thermocouples()
            .filter_map(|id| parse_value(raw, id))
            .filter(|v| self.valid_range.contains(*v))
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        let center = self
            .geometry
            .rack
            .cell_center(entry.level, entry.row, entry.col)?;

        let id = format!("{}-TCG{:02}", source, row_number);
        let reading = SensorReading::curing(id, center, mean)
            .with_valid_range(self.valid_range.min, self.valid_range.max);
        Ok(Some(SensorReading {
            name: entry.tc_ids.clone(),
            ..reading
        }))
    }
}

fn parse_value(raw: &HashMap<String, String>, id: &str) -> Option<f64> {
    raw.get(id)?.trim().parse::<f64>().ok()
}
