//! Heatmap rendering for oven temperature fields.
//!
//! Implements:
//! - Colormaps (two-color and five-stop ramps)
//! - Plane rasterization (axis-aligned slices and depth projections)
//! - PNG encoding

pub mod colormap;
pub mod png;
pub mod raster;

pub use colormap::{color_for, normalize_value, Color, ColorMethod};
pub use raster::{rasterize, PlaneKind, RasterImage, ViewRequest};
