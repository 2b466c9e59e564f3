//! Enclosure and rack geometry.
//!
//! All positions handed to the interpolator live in an enclosure-centered
//! frame: X runs along the oven, Y across it and Z upwards. Raw layout
//! coordinates are shifted into this frame once, when a reading is built.

use serde::{Deserialize, Serialize};

use crate::{OvenError, OvenResult};

/// A point in the enclosure-centered frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }
}

/// Enclosure axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Fixed axis-aligned bounds of the enclosure.
///
/// Bounds are integral so that rasters map one pixel to one unit length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
    pub z_min: i32,
    pub z_max: i32,
    /// Height above `z_min` below which the enclosure is solid floor.
    pub bottom_height: i32,
    /// Offset subtracted from raw layout coordinates.
    pub center_offset: Position,
}

impl Default for Enclosure {
    /// The curing oven.
    fn default() -> Self {
        Self {
            x_min: -484,
            x_max: 484,
            y_min: -182,
            y_max: 182,
            z_min: -182,
            z_max: 182,
            bottom_height: 30,
            center_offset: Position::new(484.0, 0.0, 183.0),
        }
    }
}

impl Enclosure {
    /// Shift a raw layout position into the enclosure-centered frame.
    pub fn normalize(&self, raw: Position) -> Position {
        Position::new(
            raw.x - self.center_offset.x,
            raw.y - self.center_offset.y,
            raw.z - self.center_offset.z,
        )
    }

    /// Inclusive coordinate range of an axis.
    pub fn range(&self, axis: Axis) -> (i32, i32) {
        match axis {
            Axis::X => (self.x_min, self.x_max),
            Axis::Y => (self.y_min, self.y_max),
            Axis::Z => (self.z_min, self.z_max),
        }
    }

    /// Number of unit samples along an axis (pixels in a raster).
    pub fn extent(&self, axis: Axis) -> usize {
        let (min, max) = self.range(axis);
        (max - min + 1).max(0) as usize
    }

    /// Offset mapping a pixel index to a coordinate: `coord = index - shift`.
    pub fn shift(&self, axis: Axis) -> f64 {
        -(self.range(axis).0 as f64)
    }

    /// Aspect-corrected ellipse test on (Y, Z): inside iff Y² + Z² ≤ Yshift·Zshift.
    pub fn contains_yz(&self, y: f64, z: f64) -> bool {
        y * y + z * z <= self.shift(Axis::Y) * self.shift(Axis::Z)
    }

    /// Whether a height lies inside the solid floor.
    pub fn is_below_bottom(&self, z: f64) -> bool {
        z < (self.z_min + self.bottom_height) as f64
    }
}

/// Rack configuration as produced by the configuration collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackConfig {
    /// Cell half-extents: x, y, z.
    #[serde(rename = "cube-size")]
    pub cube_size: Vec<f64>,
    /// Level heights (Z).
    #[serde(rename = "level")]
    pub levels: Vec<f64>,
    /// Row coordinates (Y).
    #[serde(rename = "row")]
    pub rows: Vec<f64>,
    /// Column coordinates (X), in raw layout units.
    #[serde(rename = "col")]
    pub cols: Vec<f64>,
}

/// Validated rack geometry in the enclosure-centered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackGeometry {
    pub levels: Vec<f64>,
    pub rows: Vec<f64>,
    pub cols: Vec<f64>,
    /// Cell half-extents, shared by all cells.
    pub half_extent: Position,
}

impl RackGeometry {
    /// Build geometry from a raw rack configuration.
    ///
    /// Column coordinates are shifted by the enclosure center along X.
    pub fn from_config(config: &RackConfig, enclosure: &Enclosure) -> OvenResult<Self> {
        if config.cube_size.len() != 3 {
            return Err(OvenError::InvalidGeometry(format!(
                "cube size must have 3 components, got {}",
                config.cube_size.len()
            )));
        }
        if config.cube_size.iter().any(|s| s.is_nan() || *s <= 0.0) {
            return Err(OvenError::InvalidGeometry(format!(
                "cube size components must be positive: {:?}",
                config.cube_size
            )));
        }

        Ok(Self {
            levels: config.levels.clone(),
            rows: config.rows.clone(),
            cols: config
                .cols
                .iter()
                .map(|x| x - enclosure.center_offset.x)
                .collect(),
            half_extent: Position::new(
                config.cube_size[0],
                config.cube_size[1],
                config.cube_size[2],
            ),
        })
    }

    /// Cell center for 1-based (level, row, col) indices.
    pub fn cell_center(&self, level: i64, row: i64, col: i64) -> OvenResult<Position> {
        let z = Self::lookup(&self.levels, "level", level)?;
        let y = Self::lookup(&self.rows, "row", row)?;
        let x = Self::lookup(&self.cols, "col", col)?;
        Ok(Position::new(x, y, z))
    }

    fn lookup(values: &[f64], axis: &'static str, index: i64) -> OvenResult<f64> {
        if index > 0 && index as usize <= values.len() {
            Ok(values[index as usize - 1])
        } else {
            Err(OvenError::RackIndexOutOfRange {
                axis,
                index,
                len: values.len(),
            })
        }
    }

    /// Whether `point` lies inside the cell centered at `center`.
    pub fn cell_contains(&self, center: &Position, point: &Position) -> bool {
        (point.x - center.x).abs() <= self.half_extent.x
            && (point.y - center.y).abs() <= self.half_extent.y
            && (point.z - center.z).abs() <= self.half_extent.z
    }
}

/// Immutable geometry snapshot threaded through one render request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvenGeometry {
    pub enclosure: Enclosure,
    pub rack: RackGeometry,
}

impl OvenGeometry {
    pub fn new(enclosure: Enclosure, rack: RackGeometry) -> Self {
        Self { enclosure, rack }
    }

    /// Load geometry from a rack configuration.
    pub fn from_config(enclosure: Enclosure, config: &RackConfig) -> OvenResult<Self> {
        let rack = RackGeometry::from_config(config, &enclosure)?;
        Ok(Self { enclosure, rack })
    }
}
