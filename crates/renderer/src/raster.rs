//! Plane rasterizer.
//!
//! One pixel per unit length of the enclosure. Image row 0 is the maximum
//! coordinate of the vertical axis. Every pixel is written exactly once, so
//! a returned image is always fully populated.

use std::time::Instant;

use field::{FieldInterpolator, InterpolationMethod};
use oven_common::{
    Axis, Enclosure, OvenGeometry, OvenResult, Position, RackGeometry, SensorFilter,
    SensorReading,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::colormap::{color_for, normalize_value, Color, ColorMethod};
use crate::png::encode_png;

/// An RGBA raster, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// A white image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![255; width * height * 4],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        let i = (y * self.width + x) * 4;
        self.pixels[i..i + 4].copy_from_slice(&color.to_rgba());
    }

    pub fn to_png(&self) -> OvenResult<Vec<u8>> {
        encode_png(self)
    }
}

/// Which plane a view slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneKind {
    Yz,
    Xz,
    Xy,
    /// XY slice at a rack level; draws the cell outline under the curing filter.
    XyByKind,
    DepthYz,
    DepthXz,
    DepthXy,
}

impl PlaneKind {
    /// (horizontal, vertical, fixed) axes.
    pub fn axes(&self) -> (Axis, Axis, Axis) {
        match self {
            PlaneKind::Yz | PlaneKind::DepthYz => (Axis::Y, Axis::Z, Axis::X),
            PlaneKind::Xz | PlaneKind::DepthXz => (Axis::X, Axis::Z, Axis::Y),
            PlaneKind::Xy | PlaneKind::XyByKind | PlaneKind::DepthXy => (Axis::X, Axis::Y, Axis::Z),
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            PlaneKind::Yz => "yz",
            PlaneKind::Xz => "xz",
            PlaneKind::Xy => "xy",
            PlaneKind::XyByKind => "xy-kind",
            PlaneKind::DepthYz => "persp-yz",
            PlaneKind::DepthXz => "persp-xz",
            PlaneKind::DepthXy => "persp-xy",
        }
    }

    /// Parse a slug as produced by [`PlaneKind::slug`].
    pub fn from_slug(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "yz" => Some(PlaneKind::Yz),
            "xz" => Some(PlaneKind::Xz),
            "xy" => Some(PlaneKind::Xy),
            "xy-kind" => Some(PlaneKind::XyByKind),
            "persp-yz" => Some(PlaneKind::DepthYz),
            "persp-xz" => Some(PlaneKind::DepthXz),
            "persp-xy" => Some(PlaneKind::DepthXy),
            _ => None,
        }
    }

    pub fn is_depth_aggregated(&self) -> bool {
        matches!(self, PlaneKind::DepthYz | PlaneKind::DepthXz | PlaneKind::DepthXy)
    }

    /// Whether points outside the Y/Z cross-section are whited out.
    pub fn clips_cylinder(&self) -> bool {
        matches!(
            self,
            PlaneKind::Yz | PlaneKind::Xy | PlaneKind::XyByKind | PlaneKind::DepthYz
        )
    }

    /// Whether points inside the floor are grayed out.
    pub fn clips_bottom(&self) -> bool {
        !matches!(self, PlaneKind::DepthXy)
    }

    /// Image (width, height) for this plane.
    pub fn dimensions(&self, enclosure: &Enclosure) -> (usize, usize) {
        let (h, v, _) = self.axes();
        (enclosure.extent(h), enclosure.extent(v))
    }
}

impl std::fmt::Display for PlaneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Parameters for one rasterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRequest {
    /// Center of the slicing plane.
    pub anchor: Position,
    pub min_value: f64,
    pub max_value: f64,
    #[serde(default)]
    pub color_method: ColorMethod,
    /// Draw a black crosshair through the anchor.
    #[serde(default)]
    pub reference_line: bool,
    #[serde(default)]
    pub filter: SensorFilter,
    #[serde(default)]
    pub method: InterpolationMethod,
}

impl ViewRequest {
    pub fn new(anchor: Position, min_value: f64, max_value: f64) -> Self {
        Self {
            anchor,
            min_value,
            max_value,
            color_method: ColorMethod::default(),
            reference_line: false,
            filter: SensorFilter::All,
            method: InterpolationMethod::default(),
        }
    }

    pub fn with_color_method(mut self, color_method: ColorMethod) -> Self {
        self.color_method = color_method;
        self
    }

    pub fn with_reference_line(mut self, reference_line: bool) -> Self {
        self.reference_line = reference_line;
        self
    }

    pub fn with_filter(mut self, filter: SensorFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }
}

/// Rasterize one plane of the field described by `readings`.
pub fn rasterize(
    plane: PlaneKind,
    readings: &[SensorReading],
    geometry: &OvenGeometry,
    request: &ViewRequest,
) -> RasterImage {
    let start = Instant::now();
    let enclosure = &geometry.enclosure;
    let (width, height) = plane.dimensions(enclosure);
    let mut image = RasterImage::new(width, height);
    if width == 0 || height == 0 {
        return image;
    }

    let field = FieldInterpolator::new(readings, &geometry.rack).with_method(request.method);
    let sampler = PlaneSampler::new(plane, enclosure, &geometry.rack, request);

    image
        .pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(row, line)| {
            for (col, px) in line.chunks_exact_mut(4).enumerate() {
                let color = sampler.shade(&field, col, row);
                px.copy_from_slice(&color.to_rgba());
            }
        });

    debug!(
        plane = %plane,
        width = width,
        height = height,
        readings = field.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Rasterized plane"
    );

    image
}

/// Per-request pixel shading, shared read-only across rows.
struct PlaneSampler<'a> {
    plane: PlaneKind,
    enclosure: &'a Enclosure,
    rack: &'a RackGeometry,
    request: &'a ViewRequest,
    horizontal: Axis,
    vertical: Axis,
    fixed: Axis,
}

impl<'a> PlaneSampler<'a> {
    fn new(
        plane: PlaneKind,
        enclosure: &'a Enclosure,
        rack: &'a RackGeometry,
        request: &'a ViewRequest,
    ) -> Self {
        let (horizontal, vertical, fixed) = plane.axes();
        Self {
            plane,
            enclosure,
            rack,
            request,
            horizontal,
            vertical,
            fixed,
        }
    }

    /// Map a pixel to a point on the plane through the anchor.
    fn point_at(&self, col: usize, row: usize) -> Position {
        let mut point = self.request.anchor;
        point.set(self.horizontal, col as f64 - self.enclosure.shift(self.horizontal));
        point.set(self.vertical, self.enclosure.shift(self.vertical) - row as f64);
        point
    }

    fn shade(&self, field: &FieldInterpolator<'_>, col: usize, row: usize) -> Color {
        let mut point = self.point_at(col, row);
        let req = self.request;

        let normalized = if self.plane.is_depth_aggregated() {
            // max-intensity projection; clipping below uses the last slice
            let (lo, hi) = self.enclosure.range(self.fixed);
            let mut max = 0.0_f64;
            for depth in lo..=hi {
                point.set(self.fixed, depth as f64);
                let raw = field.estimate(&point, req.filter);
                max = max.max(normalize_value(raw, req.min_value, req.max_value));
            }
            max
        } else {
            let raw = field.estimate(&point, req.filter);
            normalize_value(raw, req.min_value, req.max_value)
        };

        let mut color = color_for(normalized, req.color_method);

        if self.plane.clips_cylinder() && !self.enclosure.contains_yz(point.y, point.z) {
            color = Color::WHITE;
        }
        if self.plane.clips_bottom() && self.enclosure.is_below_bottom(point.z) {
            color = Color::FLOOR_GRAY;
        }
        if req.reference_line && self.on_reference_line(&point) {
            color = Color::BLACK;
        }
        if self.plane == PlaneKind::XyByKind
            && req.filter == SensorFilter::CuringOnly
            && self.on_cell_outline(&point)
        {
            color = Color::BLACK;
        }

        color
    }

    fn on_reference_line(&self, point: &Position) -> bool {
        let anchor = &self.request.anchor;
        point.get(self.horizontal) as i64 == anchor.get(self.horizontal) as i64
            || point.get(self.vertical) as i64 == anchor.get(self.vertical) as i64
    }

    /// Black where a pixel sits on a cell edge along one axis and inside the
    /// cell span along the other.
    fn on_cell_outline(&self, point: &Position) -> bool {
        let half = &self.rack.half_extent;
        let x = cell_span(&self.rack.cols, half.x, point.x);
        let y = cell_span(&self.rack.rows, half.y, point.y);
        (x.online && y.inside) || (y.online && x.inside)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Span {
    inside: bool,
    online: bool,
}

/// Position of `coord` against the first cell span containing it.
fn cell_span(centers: &[f64], half: f64, coord: f64) -> Span {
    let c = coord as i64;
    centers
        .iter()
        .map(|center| ((center - half) as i64, (center + half) as i64))
        .find(|(lo, hi)| *lo <= c && c <= *hi)
        .map(|(lo, hi)| Span {
            inside: true,
            online: c == lo || c == hi,
        })
        .unwrap_or_default()
}
