//! Event timeline entries and comparison windows.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::{OvenError, OvenResult};

/// One entry of a source's event timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    #[serde(default)]
    pub time: String,
    /// Representative value at this time.
    pub value: f64,
    pub max_value: f64,
    pub min_value: f64,
}

impl EventTime {
    pub fn new(timestamp: i64, value: f64, max_value: f64, min_value: f64) -> Self {
        Self {
            timestamp,
            time: format_timestamp(timestamp),
            value,
            max_value,
            min_value,
        }
    }
}

/// Render a Unix timestamp as a UTC date string.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S %z UTC").to_string(),
        None => timestamp.to_string(),
    }
}

/// Resolve the previous/current/next timestamps around `timestamp`.
///
/// Neighbours `offset` entries away are included only when `offset > 0` and
/// they exist in the timeline. The result is in timeline order.
pub fn resolve_comparison_window(
    timeline: &[EventTime],
    timestamp: i64,
    offset: usize,
) -> OvenResult<Vec<i64>> {
    let index = timeline
        .iter()
        .position(|e| e.timestamp == timestamp)
        .ok_or(OvenError::TimestampNotFound(timestamp))?;

    let neighbour = |i: Option<usize>| {
        i.filter(|_| offset > 0)
            .and_then(|i| timeline.get(i))
            .map(|e| e.timestamp)
    };

    let mut window = Vec::with_capacity(3);
    window.extend(neighbour(index.checked_sub(offset)));
    window.push(timestamp);
    window.extend(neighbour(index.checked_add(offset)));
    Ok(window)
}
