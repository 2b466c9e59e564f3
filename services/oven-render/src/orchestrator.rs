//! Request orchestration: snapshots in, cached image paths out.
//!
//! A request either yields every view of every timestamp in its comparison
//! window or fails as a whole. Views are rasterized in parallel, then the
//! whole batch goes through one sweep-and-write on the render cache.

use std::time::Instant;

use oven_common::{
    format_timestamp, resolve_comparison_window, value_range, OvenError, OvenGeometry,
    OvenResult, Position, SensorFilter, SensorKind, SensorReading,
};
use rayon::prelude::*;
use renderer::{rasterize, ColorMethod, PlaneKind, ViewRequest};
use serde::{Deserialize, Serialize};
use storage::{random_token, ArtifactFamily, ArtifactName, RackLevel, RenderCache};
use tracing::{debug, info};

use crate::config::OvenRenderConfig;
use crate::readings::SnapshotAssembler;
use crate::source::OvenDataSource;

/// Parameters of a multi-view request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvenViewsRequest {
    pub source_name: String,
    pub timestamp: i64,
    #[serde(default, rename = "heatColorMethod")]
    pub color_method: Option<ColorMethod>,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
    #[serde(default)]
    pub center_z: f64,
    #[serde(default, rename = "refLine")]
    pub reference_line: bool,
    /// Distance, in timeline entries, of the previous/next comparison views.
    #[serde(default, rename = "imgCompareRange")]
    pub compare_offset: usize,
    /// Display range; `0..0` selects the data range.
    #[serde(default)]
    pub min_value: f64,
    #[serde(default)]
    pub max_value: f64,
}

impl OvenViewsRequest {
    pub fn new(source_name: impl Into<String>, timestamp: i64) -> Self {
        Self {
            source_name: source_name.into(),
            timestamp,
            color_method: None,
            center_x: 0.0,
            center_y: 0.0,
            center_z: 0.0,
            reference_line: false,
            compare_offset: 0,
            min_value: 0.0,
            max_value: 0.0,
        }
    }

    pub fn anchor(&self) -> Position {
        Position::new(self.center_x, self.center_y, self.center_z)
    }
}

/// Paired images of one rack level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackImages {
    /// Distributed probes only.
    pub distributed: String,
    /// Curing probes only, with the cell outline.
    pub curing: String,
}

/// Result of a multi-view request. Image lists run parallel to `timestamps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvenViewsResponse {
    /// Data range over the whole comparison window.
    pub min_value: f64,
    pub max_value: f64,
    pub timestrings: Vec<String>,
    pub timestamps: Vec<i64>,
    #[serde(rename = "imgYZ")]
    pub img_yz: Vec<String>,
    #[serde(rename = "imgXZ")]
    pub img_xz: Vec<String>,
    #[serde(rename = "imgXY")]
    pub img_xy: Vec<String>,
    pub img_top: Vec<RackImages>,
    pub img_middle: Vec<RackImages>,
    pub img_bottom: Vec<RackImages>,
    /// Readings of the requested timestamp.
    pub sensors: Vec<SensorReading>,
    /// Rack level heights.
    pub levels: Vec<f64>,
}

/// One image to render.
struct ViewJob<'a> {
    snapshot: usize,
    family: ArtifactFamily,
    plane: PlaneKind,
    request: ViewRequest,
    readings: &'a [SensorReading],
}

/// Renders oven views into a render cache.
#[derive(Debug, Clone)]
pub struct OvenRenderer {
    config: OvenRenderConfig,
    cache: RenderCache,
}

impl OvenRenderer {
    pub fn new(config: OvenRenderConfig) -> Self {
        let cache = RenderCache::new(
            config.cache_image_path.clone(),
            config.web_image_path.clone(),
            config.cache_ttl(),
        );
        Self { config, cache }
    }

    pub fn config(&self) -> &OvenRenderConfig {
        &self.config
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Load the rack geometry snapshot used for one request.
    pub fn load_geometry(&self, source: &dyn OvenDataSource) -> OvenResult<OvenGeometry> {
        let rack = source.rack_config()?;
        OvenGeometry::from_config(self.config.enclosure.clone(), &rack)
    }

    /// Readings of one source at one timestamp (`None` for the latest).
    pub fn load_readings(
        &self,
        source: &dyn OvenDataSource,
        geometry: &OvenGeometry,
        source_name: &str,
        timestamp: Option<i64>,
    ) -> OvenResult<Vec<SensorReading>> {
        let raw = source.raw_snapshot(source_name, timestamp)?;
        let probes = source.probe_layout(source_name)?;
        let curing = source.curing_layout(source_name)?;
        SnapshotAssembler::new(geometry, self.config.valid_range).assemble(
            source_name,
            &raw,
            &probes,
            &curing,
        )
    }

    /// Render the cross-section and rack-level views for every timestamp in
    /// the comparison window around `request.timestamp`.
    pub fn render_oven_views(
        &self,
        source: &dyn OvenDataSource,
        request: &OvenViewsRequest,
    ) -> OvenResult<OvenViewsResponse> {
        let start = Instant::now();
        let name = request.source_name.as_str();

        let timeline = source.event_timeline(name)?;
        let timestamps =
            resolve_comparison_window(&timeline, request.timestamp, request.compare_offset)?;

        let geometry = self.load_geometry(source)?;
        let levels = rack_levels(&geometry)?;

        let probes = source.probe_layout(name)?;
        let curing = source.curing_layout(name)?;
        let assembler = SnapshotAssembler::new(&geometry, self.config.valid_range);
        let snapshots = timestamps
            .iter()
            .map(|ts| {
                let raw = source.raw_snapshot(name, Some(*ts))?;
                assembler.assemble(name, &raw, &probes, &curing)
            })
            .collect::<OvenResult<Vec<_>>>()?;

        let (min_value, max_value) = window_range(&snapshots);
        let (display_min, display_max) = if request.min_value == 0.0 && request.max_value == 0.0 {
            (min_value, max_value)
        } else {
            (request.min_value, request.max_value)
        };
        let color_method = request.color_method.unwrap_or(self.config.default_color_method);

        let base = ViewRequest::new(request.anchor(), display_min, display_max)
            .with_color_method(color_method);
        let jobs: Vec<ViewJob<'_>> = snapshots
            .iter()
            .enumerate()
            .flat_map(|(i, readings)| {
                view_jobs(i, readings, &base, request.reference_line, &levels)
            })
            .collect();

        debug!(
            source = name,
            timestamps = timestamps.len(),
            views = jobs.len(),
            display_min = display_min,
            display_max = display_max,
            "Rendering oven views"
        );

        let pngs = jobs
            .par_iter()
            .map(|job| rasterize(job.plane, job.readings, &geometry, &job.request).to_png())
            .collect::<OvenResult<Vec<_>>>()?;

        let tokens: Vec<String> = timestamps.iter().map(|_| random_token()).collect();
        let batch = jobs
            .iter()
            .zip(pngs)
            .map(|(job, png)| {
                let name = ArtifactName::new(
                    timestamps[job.snapshot],
                    tokens[job.snapshot].clone(),
                    job.family,
                );
                (name, png)
            })
            .collect();
        let stored = self.cache.store_batch(batch)?;

        let mut response = OvenViewsResponse {
            min_value,
            max_value,
            timestrings: timestamps.iter().map(|ts| format_timestamp(*ts)).collect(),
            timestamps: timestamps.clone(),
            img_yz: Vec::new(),
            img_xz: Vec::new(),
            img_xy: Vec::new(),
            img_top: Vec::new(),
            img_middle: Vec::new(),
            img_bottom: Vec::new(),
            sensors: Vec::new(),
            levels: geometry.rack.levels.clone(),
        };

        let mut stored = stored.into_iter().map(|s| s.public_path);
        for _ in &timestamps {
            let mut next = || {
                stored
                    .next()
                    .ok_or_else(|| OvenError::RenderError("missing stored image".into()))
            };
            response.img_yz.push(next()?);
            response.img_xz.push(next()?);
            response.img_xy.push(next()?);
            for level in RackLevel::ALL {
                let images = RackImages {
                    distributed: next()?,
                    curing: next()?,
                };
                match level {
                    RackLevel::Bottom => response.img_bottom.push(images),
                    RackLevel::Middle => response.img_middle.push(images),
                    RackLevel::Top => response.img_top.push(images),
                }
            }
        }

        let current = timestamps
            .iter()
            .position(|ts| *ts == request.timestamp)
            .ok_or(OvenError::TimestampNotFound(request.timestamp))?;
        response.sensors = snapshots.get(current).cloned().unwrap_or_default();

        info!(
            source = name,
            timestamp = request.timestamp,
            timestamps = response.timestamps.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rendered oven views"
        );

        Ok(response)
    }

    /// Render one view and return its public path.
    pub fn render_single_view(
        &self,
        plane: PlaneKind,
        readings: &[SensorReading],
        geometry: &OvenGeometry,
        request: &ViewRequest,
    ) -> OvenResult<String> {
        let png = rasterize(plane, readings, geometry, request).to_png()?;
        let name = ArtifactName::new(
            chrono::Utc::now().timestamp(),
            random_token(),
            single_view_family(plane, request.filter),
        );
        let mut stored = self.cache.store_batch(vec![(name, png)])?;
        stored
            .pop()
            .map(|s| s.public_path)
            .ok_or_else(|| OvenError::RenderError("image was not stored".into()))
    }
}

/// Bottom, middle and top level heights: the first three configured levels.
fn rack_levels(geometry: &OvenGeometry) -> OvenResult<[f64; 3]> {
    match geometry.rack.levels.as_slice() {
        [bottom, middle, top, ..] => Ok([*bottom, *middle, *top]),
        levels => Err(OvenError::InvalidGeometry(format!(
            "rack needs at least 3 levels, got {}",
            levels.len()
        ))),
    }
}

/// Combined value range of several snapshots.
fn window_range(snapshots: &[Vec<SensorReading>]) -> (f64, f64) {
    snapshots
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| value_range(s))
        .reduce(|(a_min, a_max), (b_min, b_max)| (a_min.min(b_min), a_max.max(b_max)))
        .unwrap_or((0.0, 0.0))
}

/// Views of one snapshot, in response order: yz, xz, xy, then each rack
/// level bottom to top as (distributed, curing).
fn view_jobs<'a>(
    snapshot: usize,
    readings: &'a [SensorReading],
    base: &ViewRequest,
    reference_line: bool,
    levels: &[f64; 3],
) -> Vec<ViewJob<'a>> {
    let section = base.clone().with_reference_line(reference_line);
    let mut jobs = vec![
        ViewJob {
            snapshot,
            family: ArtifactFamily::Yz,
            plane: PlaneKind::Yz,
            request: section.clone(),
            readings,
        },
        ViewJob {
            snapshot,
            family: ArtifactFamily::Xz,
            plane: PlaneKind::Xz,
            request: section.clone(),
            readings,
        },
        ViewJob {
            snapshot,
            family: ArtifactFamily::Xy,
            plane: PlaneKind::Xy,
            request: section,
            readings,
        },
    ];

    for level in RackLevel::ALL {
        let mut anchor = base.anchor;
        anchor.z = levels[level.index()];
        for (kind, filter) in [
            (SensorKind::DistributedProbe, SensorFilter::DistributedOnly),
            (SensorKind::EmbeddedCuringProbe, SensorFilter::CuringOnly),
        ] {
            let request = ViewRequest {
                anchor,
                reference_line: false,
                ..base.clone()
            }
            .with_filter(filter);
            jobs.push(ViewJob {
                snapshot,
                family: ArtifactFamily::Rack(level, kind),
                plane: PlaneKind::XyByKind,
                request,
                readings,
            });
        }
    }
    jobs
}

fn single_view_family(plane: PlaneKind, filter: SensorFilter) -> ArtifactFamily {
    match plane {
        PlaneKind::Yz => ArtifactFamily::Yz,
        PlaneKind::Xz => ArtifactFamily::Xz,
        PlaneKind::Xy => ArtifactFamily::Xy,
        PlaneKind::XyByKind => match filter {
            SensorFilter::CuringOnly => {
                ArtifactFamily::Rack(RackLevel::Middle, SensorKind::EmbeddedCuringProbe)
            }
            _ => ArtifactFamily::Rack(RackLevel::Middle, SensorKind::DistributedProbe),
        },
        PlaneKind::DepthYz => ArtifactFamily::PerspYz,
        PlaneKind::DepthXz => ArtifactFamily::PerspXz,
        PlaneKind::DepthXy => ArtifactFamily::PerspXy,
    }
}
