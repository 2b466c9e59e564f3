//! Common test fixtures for oven heatmap tests.
//!
//! This module provides pre-defined geometry and readings that represent
//! common scenarios in the curing oven.

use oven_common::{
    Enclosure, OvenGeometry, Position, RackConfig, RackGeometry, SensorReading,
};

/// Common pixel colors.
pub mod colors {
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    pub const BLACK: [u8; 4] = [0, 0, 0, 255];
    pub const FLOOR_GRAY: [u8; 4] = [220, 220, 220, 255];
    pub const BLUE: [u8; 4] = [0, 0, 255, 255];
    pub const CYAN: [u8; 4] = [0, 255, 255, 255];
    pub const RED: [u8; 4] = [255, 0, 0, 255];
}

/// Single-cell rack with one level at Z=50 and half-extents (5, 5, 5).
///
/// Already in the enclosure-centered frame.
pub fn single_cell_rack() -> RackGeometry {
    RackGeometry {
        levels: vec![50.0],
        rows: vec![0.0],
        cols: vec![0.0],
        half_extent: Position::new(5.0, 5.0, 5.0),
    }
}

/// Rack configuration shaped like the production oven: 3 levels, 3 rows, 24 columns.
///
/// Columns are in raw layout units (shifted on load).
pub fn oven_rack_config() -> RackConfig {
    RackConfig {
        cube_size: vec![15.0, 40.0, 25.0],
        levels: vec![-110.0, -20.0, 70.0],
        rows: vec![-90.0, 0.0, 90.0],
        cols: (0..24).map(|i| 102.0 + 33.0 * i as f64).collect(),
    }
}

/// Default enclosure with the production-like rack.
pub fn oven_geometry() -> OvenGeometry {
    OvenGeometry::from_config(Enclosure::default(), &oven_rack_config())
        .expect("fixture rack config is valid")
}

/// Geometry with the single-cell rack.
pub fn single_cell_geometry() -> OvenGeometry {
    OvenGeometry::new(Enclosure::default(), single_cell_rack())
}

/// Two distributed probes at (0,0,0)=100 and (10,0,0)=200.
pub fn two_probe_readings() -> Vec<SensorReading> {
    vec![
        SensorReading::distributed("T1", Position::new(0.0, 0.0, 0.0), 100.0),
        SensorReading::distributed("T2", Position::new(10.0, 0.0, 0.0), 200.0),
    ]
}

/// Ambient field of 100 everywhere plus one curing probe at (0,0,50)=300.
///
/// The distributed probes all read 100, so the inverse-distance average is
/// exactly 100 at any point.
pub fn single_cell_readings() -> Vec<SensorReading> {
    vec![
        SensorReading::distributed("T1", Position::new(-300.0, 0.0, 0.0), 100.0),
        SensorReading::distributed("T2", Position::new(300.0, 0.0, 0.0), 100.0),
        SensorReading::distributed("T3", Position::new(0.0, 120.0, -100.0), 100.0),
        SensorReading::curing("TCG01", Position::new(0.0, 0.0, 50.0), 300.0),
    ]
}
