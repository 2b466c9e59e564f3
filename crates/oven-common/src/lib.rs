//! Common types shared across the oven heatmap crates.

pub mod error;
pub mod event;
pub mod geometry;
pub mod sensor;

pub use error::{ErrorCategory, OvenError, OvenResult};
pub use event::{format_timestamp, resolve_comparison_window, EventTime};
pub use geometry::{Axis, Enclosure, OvenGeometry, Position, RackConfig, RackGeometry};
pub use sensor::{value_range, SensorFilter, SensorKind, SensorReading};
