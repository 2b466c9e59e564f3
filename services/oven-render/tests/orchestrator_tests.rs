//! End-to-end tests for the oven view orchestrator.
//!
//! Renders against a small enclosure so every view stays cheap, and writes
//! into a temporary cache directory.

use std::collections::HashMap;
use std::path::Path;

use oven_common::{Enclosure, OvenError, Position, RackConfig, SensorFilter};
use oven_render::{
    CuringLayoutEntry, OvenDataSource, OvenRenderConfig, OvenRenderer, OvenViewsRequest,
    ProbeLayoutEntry, RawSnapshot, SourceBundle, SourceData,
};
use renderer::{ColorMethod, PlaneKind, ViewRequest};
use test_utils::{event_timeline, service_testdata_dir, temp_test_dir};

const START: i64 = 1_700_000_000;

fn small_enclosure() -> Enclosure {
    Enclosure {
        x_min: -40,
        x_max: 40,
        y_min: -20,
        y_max: 20,
        z_min: -20,
        z_max: 20,
        bottom_height: 2,
        center_offset: Position::new(40.0, 0.0, 20.0),
    }
}

fn small_rack(levels: Vec<f64>) -> RackConfig {
    RackConfig {
        cube_size: vec![3.0, 3.0, 3.0],
        levels,
        rows: vec![0.0],
        cols: vec![40.0],
    }
}

fn values(i: i64) -> HashMap<String, String> {
    HashMap::from([
        ("T1".to_string(), (100 + i * 10).to_string()),
        ("T2".to_string(), (200 + i * 10).to_string()),
        ("TC1".to_string(), "150".to_string()),
    ])
}

fn bundle(levels: Vec<f64>) -> SourceBundle {
    let data = SourceData {
        timeline: event_timeline(START, 5, 60),
        snapshots: (0..5)
            .map(|i| RawSnapshot {
                timestamp: START + i * 60,
                values: values(i),
            })
            .collect(),
        probe_layout: vec![
            ProbeLayoutEntry {
                id: "T1".to_string(),
                name: "door".to_string(),
                x: 40.0,
                y: 0.0,
                z: 20.0,
            },
            ProbeLayoutEntry {
                id: "T2".to_string(),
                name: "burner".to_string(),
                x: 60.0,
                y: 0.0,
                z: 20.0,
            },
        ],
        curing_layout: vec![CuringLayoutEntry {
            tc_ids: "TC1".to_string(),
            level: 2,
            row: 1,
            col: 1,
        }],
    };
    SourceBundle::new(small_rack(levels)).with_source("a1", data)
}

fn renderer(cache_dir: &Path) -> OvenRenderer {
    OvenRenderer::new(OvenRenderConfig {
        cache_image_path: cache_dir.to_path_buf(),
        web_image_path: "/images/".to_string(),
        enclosure: small_enclosure(),
        ..Default::default()
    })
}

fn cached_files(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}

fn file_for(dir: &Path, public_path: &str) -> std::path::PathBuf {
    let name = public_path
        .strip_prefix("/images/")
        .expect("public path uses the configured prefix");
    dir.join(name)
}

#[test]
fn test_single_timestamp_renders_nine_views() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let bundle = bundle(vec![-10.0, 0.0, 10.0]);

    let request = OvenViewsRequest::new("a1", START + 120);
    let response = renderer.render_oven_views(&bundle, &request).unwrap();

    assert_eq!(response.timestamps, vec![START + 120]);
    assert_eq!(response.timestrings.len(), 1);
    assert_eq!(response.img_yz.len(), 1);
    assert_eq!(response.img_top.len(), 1);
    assert_eq!(cached_files(dir.path()).len(), 9);

    let yz = &response.img_yz[0];
    assert!(yz.starts_with(&format!("/images/{}-", START + 120)));
    assert!(yz.ends_with("-yz.png"));
    assert!(response.img_xz[0].ends_with("-xz.png"));
    assert!(response.img_xy[0].ends_with("-xy.png"));
    assert!(response.img_bottom[0].distributed.ends_with("-bottom-nchc.png"));
    assert!(response.img_middle[0].curing.ends_with("-middle-aidc.png"));
    assert!(response.img_top[0].curing.ends_with("-top-aidc.png"));

    for path in [yz, &response.img_xz[0], &response.img_top[0].distributed] {
        let bytes = std::fs::read(file_for(dir.path(), path)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    assert_eq!(response.levels, vec![-10.0, 0.0, 10.0]);
}

#[test]
fn test_images_of_one_timestamp_share_a_token() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let response = renderer
        .render_oven_views(&bundle(vec![-10.0, 0.0, 10.0]), &OvenViewsRequest::new("a1", START))
        .unwrap();

    let prefix = |path: &str| path.rsplitn(2, "-yz.png").last().map(str::to_string);
    let stem = prefix(&response.img_yz[0]).unwrap();
    assert!(response.img_xz[0].starts_with(&stem));
    assert!(response.img_middle[0].distributed.starts_with(&stem));
}

#[test]
fn test_comparison_window_and_data_range() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let request = OvenViewsRequest {
        compare_offset: 1,
        ..OvenViewsRequest::new("a1", START + 120)
    };

    let response = renderer
        .render_oven_views(&bundle(vec![-10.0, 0.0, 10.0]), &request)
        .unwrap();

    assert_eq!(response.timestamps, vec![START + 60, START + 120, START + 180]);
    for list in [&response.img_yz, &response.img_xz, &response.img_xy] {
        assert_eq!(list.len(), 3);
    }
    assert_eq!(response.img_bottom.len(), 3);
    assert_eq!(response.img_middle.len(), 3);
    assert_eq!(response.img_top.len(), 3);
    assert_eq!(cached_files(dir.path()).len(), 27);

    // Window range: T1 at START+60 is 110, T2 at START+180 is 230.
    assert_eq!(response.min_value, 110.0);
    assert_eq!(response.max_value, 230.0);

    // Each image is named by its own timestamp.
    assert!(response.img_yz[0].starts_with(&format!("/images/{}-", START + 60)));
    assert!(response.img_yz[2].starts_with(&format!("/images/{}-", START + 180)));

    // Sensors belong to the requested timestamp.
    let t1 = response.sensors.iter().find(|r| r.id == "T1").unwrap();
    assert_eq!(t1.value, 120.0);
    assert_eq!(t1.name, "door");
    assert_eq!(response.sensors.len(), 3);
    assert!(response.sensors.iter().any(|r| r.id == "a1-TCG01" && r.is_curing()));
}

#[test]
fn test_window_is_clipped_at_the_timeline_start() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let request = OvenViewsRequest {
        compare_offset: 2,
        ..OvenViewsRequest::new("a1", START)
    };

    let response = renderer
        .render_oven_views(&bundle(vec![-10.0, 0.0, 10.0]), &request)
        .unwrap();
    assert_eq!(response.timestamps, vec![START, START + 120]);
    assert_eq!(response.img_xy.len(), 2);
}

#[test]
fn test_oversized_compare_range_renders_only_the_current_timestamp() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let request = OvenViewsRequest {
        compare_offset: usize::MAX,
        ..OvenViewsRequest::new("a1", START + 120)
    };

    let response = renderer
        .render_oven_views(&bundle(vec![-10.0, 0.0, 10.0]), &request)
        .unwrap();
    assert_eq!(response.timestamps, vec![START + 120]);
    assert_eq!(cached_files(dir.path()).len(), 9);
}

#[test]
fn test_explicit_display_range_keeps_data_range_in_response() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let request = OvenViewsRequest {
        min_value: 0.0,
        max_value: 500.0,
        color_method: Some(ColorMethod::TwoColor),
        reference_line: true,
        ..OvenViewsRequest::new("a1", START)
    };

    let response = renderer
        .render_oven_views(&bundle(vec![-10.0, 0.0, 10.0]), &request)
        .unwrap();
    assert_eq!(response.min_value, 100.0);
    assert_eq!(response.max_value, 200.0);
}

#[test]
fn test_unknown_timestamp_writes_nothing() {
    let dir = temp_test_dir();
    let cache_dir = dir.path().join("images");
    let renderer = renderer(&cache_dir);

    let err = renderer
        .render_oven_views(&bundle(vec![-10.0, 0.0, 10.0]), &OvenViewsRequest::new("a1", START + 1))
        .unwrap_err();
    assert!(matches!(err, OvenError::TimestampNotFound(ts) if ts == START + 1));
    assert!(cached_files(&cache_dir).is_empty());
}

#[test]
fn test_unknown_source_is_missing_data() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let err = renderer
        .render_oven_views(&bundle(vec![-10.0, 0.0, 10.0]), &OvenViewsRequest::new("b7", START))
        .unwrap_err();
    assert!(matches!(err, OvenError::DataReadError(_)));
}

#[test]
fn test_two_level_rack_is_invalid_geometry() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let err = renderer
        .render_oven_views(&bundle(vec![-10.0, 10.0]), &OvenViewsRequest::new("a1", START))
        .unwrap_err();
    assert!(matches!(err, OvenError::InvalidGeometry(_)));
    assert!(cached_files(dir.path()).is_empty());
}

#[test]
fn test_render_single_view() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let bundle = bundle(vec![-10.0, 0.0, 10.0]);

    let geometry = renderer.load_geometry(&bundle).unwrap();
    let readings = renderer
        .load_readings(&bundle, &geometry, "a1", None)
        .unwrap();
    // Latest snapshot: T1=140, T2=240.
    assert!(readings.iter().any(|r| r.id == "T2" && r.value == 240.0));

    let request = ViewRequest::new(Position::default(), 100.0, 250.0);
    let path = renderer
        .render_single_view(PlaneKind::DepthXy, &readings, &geometry, &request)
        .unwrap();
    assert!(path.starts_with("/images/"));
    assert!(path.ends_with("-persp-xy.png"));
    assert!(file_for(dir.path(), &path).exists());
}

#[test]
fn test_sample_bundle_renders() {
    let path = service_testdata_dir("oven-render").join("sample_bundle.json");
    let bundle = SourceBundle::from_json_file(&path).unwrap();
    let timeline = bundle.event_timeline("a1").unwrap();
    assert_eq!(timeline.len(), 3);

    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let request = OvenViewsRequest {
        compare_offset: 1,
        ..OvenViewsRequest::new("a1", timeline[1].timestamp)
    };
    let response = renderer.render_oven_views(&bundle, &request).unwrap();

    assert_eq!(response.timestamps.len(), 3);
    assert_eq!(response.min_value, 100.0);
    assert_eq!(response.max_value, 220.0);
    let curing = response
        .sensors
        .iter()
        .find(|r| r.is_curing())
        .unwrap();
    assert_eq!(curing.value, 160.0);
    assert_eq!(curing.position, Position::new(0.0, 0.0, 0.0));
}

#[test]
fn test_response_json_field_names() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let response = renderer
        .render_oven_views(&bundle(vec![-10.0, 0.0, 10.0]), &OvenViewsRequest::new("a1", START))
        .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    for key in [
        "minValue", "maxValue", "timestrings", "timestamps", "imgYZ", "imgXZ", "imgXY", "imgTop",
        "imgMiddle", "imgBottom", "sensors", "levels",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn test_single_curing_rack_view() {
    let dir = temp_test_dir();
    let renderer = renderer(dir.path());
    let bundle = bundle(vec![-10.0, 0.0, 10.0]);
    let geometry = renderer.load_geometry(&bundle).unwrap();
    let readings = renderer
        .load_readings(&bundle, &geometry, "a1", Some(START))
        .unwrap();

    let request = ViewRequest::new(Position::default(), 100.0, 200.0)
        .with_filter(SensorFilter::CuringOnly);
    let path = renderer
        .render_single_view(PlaneKind::XyByKind, &readings, &geometry, &request)
        .unwrap();
    assert!(path.ends_with("-middle-aidc.png"));
    assert!(file_for(dir.path(), &path).exists());
}
