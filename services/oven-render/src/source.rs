//! Data sources feeding the renderer.
//!
//! A source provides the already-parsed inputs of a render: the event
//! timeline, raw snapshot values keyed by sensor id, both sensor layouts and
//! the rack configuration. File discovery and CSV parsing live elsewhere.

use std::collections::HashMap;
use std::path::Path;

use oven_common::{EventTime, OvenError, OvenResult, RackConfig};
use serde::{Deserialize, Serialize};

/// Layout entry for a distributed probe, in raw layout coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeLayoutEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Layout row for an embedded curing probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuringLayoutEntry {
    /// Comma-separated thermocouple ids averaged into one reading.
    pub tc_ids: String,
    /// 1-based rack indices.
    pub level: i64,
    pub row: i64,
    pub col: i64,
}

impl CuringLayoutEntry {
    pub fn thermocouples(&self) -> impl Iterator<Item = &str> {
        self.tc_ids.split(',').map(str::trim).filter(|id| !id.is_empty())
    }
}

/// Provider of render inputs.
pub trait OvenDataSource: Send + Sync {
    /// Ordered event timeline of a source.
    fn event_timeline(&self, source: &str) -> OvenResult<Vec<EventTime>>;

    /// Raw values keyed by sensor id; `None` selects the latest record.
    fn raw_snapshot(
        &self,
        source: &str,
        timestamp: Option<i64>,
    ) -> OvenResult<HashMap<String, String>>;

    fn probe_layout(&self, source: &str) -> OvenResult<Vec<ProbeLayoutEntry>>;

    /// Curing layout; empty when the source has no embedded probes.
    fn curing_layout(&self, source: &str) -> OvenResult<Vec<CuringLayoutEntry>>;

    fn rack_config(&self) -> OvenResult<RackConfig>;
}

/// One timestamped record of raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub timestamp: i64,
    pub values: HashMap<String, String>,
}

/// Everything known about one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceData {
    pub timeline: Vec<EventTime>,
    /// Records in time order.
    pub snapshots: Vec<RawSnapshot>,
    pub probe_layout: Vec<ProbeLayoutEntry>,
    #[serde(default)]
    pub curing_layout: Vec<CuringLayoutEntry>,
}

/// In-memory data source, loadable from a JSON bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBundle {
    pub rack: RackConfig,
    pub sources: HashMap<String, SourceData>,
}

impl SourceBundle {
    pub fn new(rack: RackConfig) -> Self {
        Self {
            rack,
            sources: HashMap::new(),
        }
    }

    pub fn with_source(mut self, name: impl Into<String>, data: SourceData) -> Self {
        self.sources.insert(name.into(), data);
        self
    }

    pub fn from_json_file(path: &Path) -> OvenResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            OvenError::DataReadError(format!("failed to read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    fn source(&self, name: &str) -> OvenResult<&SourceData> {
        self.sources
            .get(name)
            .ok_or_else(|| OvenError::DataReadError(format!("unknown source '{}'", name)))
    }
}

impl OvenDataSource for SourceBundle {
    fn event_timeline(&self, source: &str) -> OvenResult<Vec<EventTime>> {
        Ok(self.source(source)?.timeline.clone())
    }

    fn raw_snapshot(
        &self,
        source: &str,
        timestamp: Option<i64>,
    ) -> OvenResult<HashMap<String, String>> {
        let data = self.source(source)?;
        let snapshot = match timestamp {
            Some(ts) => data.snapshots.iter().find(|s| s.timestamp == ts),
            None => data.snapshots.last(),
        };
        snapshot
            .map(|s| s.values.clone())
            .ok_or_else(|| OvenError::NoReadings(source.to_string()))
    }

    fn probe_layout(&self, source: &str) -> OvenResult<Vec<ProbeLayoutEntry>> {
        Ok(self.source(source)?.probe_layout.clone())
    }

    fn curing_layout(&self, source: &str) -> OvenResult<Vec<CuringLayoutEntry>> {
        Ok(self.source(source)?.curing_layout.clone())
    }

    fn rack_config(&self) -> OvenResult<RackConfig> {
        Ok(self.rack.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> SourceBundle {
        let rack = RackConfig {
            cube_size: vec![5.0, 5.0, 5.0],
            levels: vec![0.0],
            rows: vec![0.0],
            cols: vec![484.0],
        };
        let data = SourceData {
            snapshots: vec![
                RawSnapshot {
                    timestamp: 10,
                    values: HashMap::from([("T1".to_string(), "100".to_string())]),
                },
                RawSnapshot {
                    timestamp: 20,
                    values: HashMap::from([("T1".to_string(), "120".to_string())]),
                },
            ],
            ..Default::default()
        };
        SourceBundle::new(rack).with_source("a1", data)
    }

    #[test]
    fn test_snapshot_by_timestamp_and_latest() {
        let bundle = bundle();
        assert_eq!(bundle.raw_snapshot("a1", Some(10)).unwrap()["T1"], "100");
        assert_eq!(bundle.raw_snapshot("a1", None).unwrap()["T1"], "120");
        assert!(matches!(
            bundle.raw_snapshot("a1", Some(15)),
            Err(OvenError::NoReadings(_))
        ));
    }

    #[test]
    fn test_unknown_source() {
        assert!(matches!(
            bundle().event_timeline("zz"),
            Err(OvenError::DataReadError(_))
        ));
    }

    #[test]
    fn test_thermocouple_ids_split() {
        let entry = CuringLayoutEntry {
            tc_ids: "TC1, TC2,,TC3".to_string(),
            level: 1,
            row: 1,
            col: 1,
        };
        assert_eq!(entry.thermocouples().collect::<Vec<_>>(), vec!["TC1", "TC2", "TC3"]);
    }

    #[test]
    fn test_bundle_json_roundtrip_shape() {
        let json = serde_json::to_string(&bundle()).unwrap();
        assert!(json.contains("\"cube-size\""));
        let back: SourceBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bundle());
    }
}
