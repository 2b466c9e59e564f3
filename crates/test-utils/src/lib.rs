//! Shared test utilities for the oven heatmap workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Oven geometry and sensor fixtures
//! - Synthetic reading generators
//! - Temporary cache directories and file aging helpers
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(250.0001_f64, 250.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(251.0_f64, 250.0_f64, 0.001_f64);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                concat!(
                    "assertion failed: `(left ≈ right)`\n",
                    "  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`"
                ),
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro asserting the RGBA value of a pixel in a raster exposing `pixel(x, y)`.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_pixel_eq;
///
/// assert_pixel_eq!(image, 0, 0, [255, 255, 255, 255]);
/// ```
#[macro_export]
macro_rules! assert_pixel_eq {
    ($image:expr, $x:expr, $y:expr, $rgba:expr) => {{
        let actual: [u8; 4] = $image.pixel($x, $y);
        let expected: [u8; 4] = $rgba;
        if actual != expected {
            panic!(
                "pixel ({}, {}) mismatch\n  actual: `{:?}`,\n expected: `{:?}`",
                $x, $y, actual, expected
            );
        }
    }};
}
