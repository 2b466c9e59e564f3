//! Inverse-distance field with curing-cell overrides.

use oven_common::{Position, RackGeometry, SensorFilter, SensorReading};
use serde::{Deserialize, Serialize};

/// Weight of the curing probe in the value at its cell surface.
pub const SURFACE_WEIGHT: f64 = 0.75;

/// Exponent applied to distances in the inverse-distance average.
const DISTANCE_POWER: f64 = 1.0;

/// Field estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Value of the closest reading of any kind.
    Nearest,
    /// Inverse-distance average of distributed probes, overridden inside curing cells.
    #[default]
    InverseDistance,
}

impl InterpolationMethod {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nearest" => Self::Nearest,
            _ => Self::InverseDistance,
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::InverseDistance => write!(f, "inverse_distance"),
        }
    }
}

/// Normalized squared distance from a cell center, `0` at the center and `1`
/// on a face center.
///
/// `delta` and `half` are per-axis offsets and cell half-extents.
#[inline]
pub fn cell_blend_weight(delta: &Position, half: &Position) -> f64 {
    (delta.x * delta.x / (half.x * half.x)
        + delta.y * delta.y / (half.y * half.y)
        + delta.z * delta.z / (half.z * half.z))
        / 3.0
}

/// Field estimator over one snapshot of readings.
///
/// Invalid readings are dropped at construction; the remaining readings are
/// split by kind, preserving their order.
#[derive(Debug, Clone)]
pub struct FieldInterpolator<'a> {
    distributed: Vec<&'a SensorReading>,
    curing: Vec<&'a SensorReading>,
    rack: &'a RackGeometry,
    method: InterpolationMethod,
}

impl<'a> FieldInterpolator<'a> {
    pub fn new(readings: &'a [SensorReading], rack: &'a RackGeometry) -> Self {
        let (distributed, curing): (Vec<_>, Vec<_>) = readings
            .iter()
            .filter(|r| r.valid)
            .partition(|r| r.is_distributed());

        Self {
            distributed,
            curing,
            rack,
            method: InterpolationMethod::default(),
        }
    }

    pub fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Number of readings taking part in estimates.
    pub fn len(&self) -> usize {
        self.distributed.len() + self.curing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Estimate the field value at `point`.
    ///
    /// Never fails: with no readings of the relevant kind the estimate is `0.0`.
    pub fn estimate(&self, point: &Position, filter: SensorFilter) -> f64 {
        match self.method {
            InterpolationMethod::Nearest => self.nearest(point),
            InterpolationMethod::InverseDistance => self.blended(point, filter),
        }
    }

    fn blended(&self, point: &Position, filter: SensorFilter) -> f64 {
        let ambient = match self.inverse_distance(point) {
            Ambient::Exact(value) => return value,
            Ambient::Average(value) => value,
        };

        match filter {
            SensorFilter::DistributedOnly => ambient,
            SensorFilter::All => self.curing_override(point, ambient).unwrap_or(ambient),
            SensorFilter::CuringOnly => self.curing_override(point, ambient).unwrap_or(0.0),
        }
    }

    /// Inverse-distance average over distributed probes.
    pub fn inverse_distance_average(&self, point: &Position) -> f64 {
        match self.inverse_distance(point) {
            Ambient::Exact(value) | Ambient::Average(value) => value,
        }
    }

    fn inverse_distance(&self, point: &Position) -> Ambient {
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;

        for reading in &self.distributed {
            if reading.position == *point {
                return Ambient::Exact(reading.value);
            }
            let weight = 1.0 / point.distance(&reading.position).powf(DISTANCE_POWER);
            weight_sum += weight;
            weighted_sum += reading.value * weight;
        }

        if weight_sum > 0.0 {
            Ambient::Average(weighted_sum / weight_sum)
        } else {
            Ambient::Average(0.0)
        }
    }

    /// Value inside the first curing cell containing `point`, if any.
    ///
    /// Cells are scanned in reading order and the first match wins;
    /// overlapping cells are not reconciled.
    fn curing_override(&self, point: &Position, ambient: f64) -> Option<f64> {
        let half = &self.rack.half_extent;
        let reading = self
            .curing
            .iter()
            .find(|r| self.rack.cell_contains(&r.position, point))?;

        let delta = Position::new(
            point.x - reading.position.x,
            point.y - reading.position.y,
            point.z - reading.position.z,
        );
        let w = cell_blend_weight(&delta, half);
        let surface = reading.value * SURFACE_WEIGHT + ambient * (1.0 - SURFACE_WEIGHT);
        Some(reading.value * (1.0 - w) + surface * w)
    }

    /// Value of the closest valid reading, first one on ties.
    pub fn nearest(&self, point: &Position) -> f64 {
        let mut best: Option<(f64, f64)> = None;
        for reading in self.distributed.iter().chain(self.curing.iter()) {
            let d = point.distance(&reading.position);
            if best.map_or(true, |(best_d, _)| d < best_d) {
                best = Some((d, reading.value));
            }
        }
        best.map_or(0.0, |(_, value)| value)
    }
}

enum Ambient {
    /// The point coincides with a distributed probe.
    Exact(f64),
    Average(f64),
}

/// Estimate a single point without keeping an interpolator around.
pub fn estimate(
    point: &Position,
    readings: &[SensorReading],
    rack: &RackGeometry,
    filter: SensorFilter,
) -> f64 {
    FieldInterpolator::new(readings, rack).estimate(point, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rack(half: f64) -> RackGeometry {
        RackGeometry {
            levels: vec![50.0],
            rows: vec![0.0],
            cols: vec![0.0],
            half_extent: Position::new(half, half, half),
        }
    }

    #[test]
    fn test_empty_readings_estimate_zero() {
        let rack = rack(5.0);
        let field = FieldInterpolator::new(&[], &rack);
        assert!(field.is_empty());
        for filter in [SensorFilter::All, SensorFilter::DistributedOnly, SensorFilter::CuringOnly] {
            assert_eq!(field.estimate(&Position::new(1.0, 2.0, 3.0), filter), 0.0);
        }
    }

    #[test]
    fn test_invalid_readings_are_ignored() {
        let rack = rack(5.0);
        let mut bad = SensorReading::distributed("bad", Position::new(1.0, 0.0, 0.0), 900.0);
        bad.valid = false;
        let readings = vec![
            bad,
            SensorReading::distributed("good", Position::new(-1.0, 0.0, 0.0), 100.0),
        ];
        let field = FieldInterpolator::new(&readings, &rack);
        assert_eq!(field.len(), 1);
        assert_eq!(field.estimate(&Position::default(), SensorFilter::All), 100.0);
    }

    #[test]
    fn test_blend_weight_corners() {
        let half = Position::new(5.0, 10.0, 20.0);
        assert_eq!(cell_blend_weight(&Position::default(), &half), 0.0);
        assert_eq!(cell_blend_weight(&Position::new(5.0, 10.0, 20.0), &half), 1.0);
        let w = cell_blend_weight(&Position::new(0.0, 10.0, 0.0), &half);
        assert!((w - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_curing_only_returns_zero_outside_cells() {
        let rack = rack(5.0);
        let readings = vec![
            SensorReading::distributed("a", Position::new(0.0, 0.0, 0.0), 100.0),
            SensorReading::curing("c", Position::new(0.0, 0.0, 50.0), 300.0),
        ];
        let field = FieldInterpolator::new(&readings, &rack);
        let outside = Position::new(0.0, 0.0, 20.0);
        assert_eq!(field.estimate(&outside, SensorFilter::CuringOnly), 0.0);
        assert_eq!(field.estimate(&outside, SensorFilter::All), 100.0);
    }

    #[test]
    fn test_distributed_only_ignores_cells() {
        let rack = rack(5.0);
        let readings = vec![
            SensorReading::distributed("a", Position::new(0.0, 0.0, 0.0), 100.0),
            SensorReading::curing("c", Position::new(0.0, 0.0, 50.0), 300.0),
        ];
        let field = FieldInterpolator::new(&readings, &rack);
        let center = Position::new(0.0, 0.0, 50.0);
        assert_eq!(field.estimate(&center, SensorFilter::DistributedOnly), 100.0);
        assert_eq!(field.estimate(&center, SensorFilter::CuringOnly), 300.0);
    }

    #[test]
    fn test_nearest_method() {
        let rack = rack(5.0);
        let readings = vec![
            SensorReading::distributed("a", Position::new(0.0, 0.0, 0.0), 100.0),
            SensorReading::curing("c", Position::new(0.0, 0.0, 50.0), 300.0),
        ];
        let field =
            FieldInterpolator::new(&readings, &rack).with_method(InterpolationMethod::Nearest);
        assert_eq!(field.estimate(&Position::new(0.0, 0.0, 20.0), SensorFilter::All), 100.0);
        assert_eq!(field.estimate(&Position::new(0.0, 0.0, 30.0), SensorFilter::All), 300.0);
        // equidistant: first reading wins
        assert_eq!(field.estimate(&Position::new(0.0, 0.0, 25.0), SensorFilter::All), 100.0);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(InterpolationMethod::from_str("NEAREST"), InterpolationMethod::Nearest);
        assert_eq!(InterpolationMethod::from_str("idw"), InterpolationMethod::InverseDistance);
        assert_eq!(InterpolationMethod::Nearest.to_string(), "nearest");
    }
}
