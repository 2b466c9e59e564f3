//! Generators for synthetic oven readings.
//!
//! These generators create predictable, verifiable sensor layouts that can
//! be used across the test suite.

use oven_common::{Enclosure, EventTime, Position, RackGeometry, SensorReading};

/// Creates distributed probes on a regular lattice inside the enclosure.
///
/// Probes are placed at the centers of an `nx × ny × nz` subdivision of the
/// enclosure and valued with `value_fn(position)`.
///
/// # Example
///
/// ```
/// use oven_common::Enclosure;
/// use test_utils::distributed_lattice;
///
/// let readings = distributed_lattice(&Enclosure::default(), 4, 2, 2, |p| 100.0 + p.x / 10.0);
/// assert_eq!(readings.len(), 16);
/// ```
pub fn distributed_lattice<F>(
    enclosure: &Enclosure,
    nx: usize,
    ny: usize,
    nz: usize,
    value_fn: F,
) -> Vec<SensorReading>
where
    F: Fn(&Position) -> f64,
{
    let axis = |min: i32, max: i32, n: usize, i: usize| {
        let step = (max - min) as f64 / n as f64;
        min as f64 + step * (i as f64 + 0.5)
    };

    let mut readings = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let position = Position::new(
                    axis(enclosure.x_min, enclosure.x_max, nx, i),
                    axis(enclosure.y_min, enclosure.y_max, ny, j),
                    axis(enclosure.z_min, enclosure.z_max, nz, k),
                );
                let value = value_fn(&position);
                readings.push(SensorReading::distributed(
                    format!("T{}", readings.len() + 1),
                    position,
                    value,
                ));
            }
        }
    }
    readings
}

/// Creates one curing probe at the center of every rack cell.
pub fn curing_probes<F>(rack: &RackGeometry, value_fn: F) -> Vec<SensorReading>
where
    F: Fn(&Position) -> f64,
{
    let mut readings = Vec::new();
    for &z in &rack.levels {
        for &y in &rack.rows {
            for &x in &rack.cols {
                let position = Position::new(x, y, z);
                readings.push(SensorReading::curing(
                    format!("TCG{:02}", readings.len() + 1),
                    position,
                    value_fn(&position),
                ));
            }
        }
    }
    readings
}

/// Creates an evenly spaced event timeline.
pub fn event_timeline(start: i64, count: usize, step_secs: i64) -> Vec<EventTime> {
    (0..count)
        .map(|i| {
            let value = 100.0 + i as f64;
            EventTime::new(start + i as i64 * step_secs, value, value + 10.0, value - 10.0)
        })
        .collect()
}
