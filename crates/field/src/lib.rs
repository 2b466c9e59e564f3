//! Temperature field estimation.
//!
//! Estimates the temperature at an arbitrary point of the oven from a
//! snapshot of probe readings:
//!
//! - Distributed probes contribute an inverse-distance weighted average.
//! - Curing probes override the field inside their rack cell, blending
//!   from the probe value at the cell center towards a surface value at
//!   the cell faces.
//!
//! # Example
//!
//! ```
//! use field::FieldInterpolator;
//! use oven_common::{Position, RackGeometry, SensorFilter, SensorReading};
//!
//! let rack = RackGeometry {
//!     levels: vec![50.0],
//!     rows: vec![0.0],
//!     cols: vec![0.0],
//!     half_extent: Position::new(5.0, 5.0, 5.0),
//! };
//! let readings = vec![
//!     SensorReading::distributed("a", Position::new(0.0, 0.0, 0.0), 100.0),
//!     SensorReading::distributed("b", Position::new(10.0, 0.0, 0.0), 200.0),
//! ];
//! let field = FieldInterpolator::new(&readings, &rack);
//! let value = field.estimate(&Position::new(5.0, 0.0, 0.0), SensorFilter::All);
//! assert!((value - 150.0).abs() < 1e-9);
//! ```

pub mod interpolator;

pub use interpolator::{
    cell_blend_weight, estimate, FieldInterpolator, InterpolationMethod, SURFACE_WEIGHT,
};
