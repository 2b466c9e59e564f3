//! Colormaps for normalized temperature values.
//!
//! Values are expected in `[0, 1]` after [`normalize_value`]. Anything below
//! zero renders white and anything above one renders black, which the
//! rasterizer also uses to mark points outside the valid field domain.

use serde::{Deserialize, Serialize};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    /// Fill for the solid oven floor.
    pub const FLOOR_GRAY: Color = Color::new(220, 220, 220, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Color ramp selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMethod {
    /// Blue to red.
    #[serde(rename = "two")]
    TwoColor,
    /// Blue, cyan, green, yellow, red.
    #[default]
    #[serde(rename = "five")]
    FiveStop,
}

impl ColorMethod {
    /// Parse from a request string; anything other than "two" selects the five-stop ramp.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "two" | "two-color" => Self::TwoColor,
            _ => Self::FiveStop,
        }
    }
}

impl std::fmt::Display for ColorMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TwoColor => write!(f, "two"),
            Self::FiveStop => write!(f, "five"),
        }
    }
}

const FIVE_STOP_VALUES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

const FIVE_STOP_COLORS: [Color; 5] = [
    Color::rgb(0, 0, 255),   // blue
    Color::rgb(0, 255, 255), // cyan
    Color::rgb(0, 255, 0),   // green
    Color::rgb(255, 255, 0), // yellow
    Color::rgb(255, 0, 0),   // red
];

/// Map a raw value into the display range, `0` when the range is empty.
pub fn normalize_value(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.0;
    }
    (value - min) / (max - min)
}

/// Color for a normalized value.
pub fn color_for(normalized: f64, method: ColorMethod) -> Color {
    if normalized < 0.0 {
        return Color::WHITE;
    }
    if normalized > 1.0 {
        return Color::BLACK;
    }
    match method {
        ColorMethod::TwoColor => two_color(normalized),
        ColorMethod::FiveStop => five_stop(normalized),
    }
}

fn two_color(v: f64) -> Color {
    let blue = FIVE_STOP_COLORS[0];
    let red = FIVE_STOP_COLORS[4];
    blend(blue, red, 1.0 - v, v)
}

/// Piecewise-linear ramp; values at or outside the end stops render white.
fn five_stop(v: f64) -> Color {
    let last = FIVE_STOP_VALUES.len() - 1;
    if v <= FIVE_STOP_VALUES[0] || v >= FIVE_STOP_VALUES[last] {
        return Color::WHITE;
    }

    let i = FIVE_STOP_VALUES
        .iter()
        .position(|stop| v <= *stop)
        .unwrap_or(last);
    let (v0, v1) = (FIVE_STOP_VALUES[i - 1], FIVE_STOP_VALUES[i]);
    let w0 = (v1 - v) / (v1 - v0);
    let w1 = (v - v0) / (v1 - v0);
    blend(FIVE_STOP_COLORS[i - 1], FIVE_STOP_COLORS[i], w0, w1)
}

/// Weighted channel sum, truncated to u8. Output is opaque.
fn blend(c0: Color, c1: Color, w0: f64, w1: f64) -> Color {
    let channel = |a: u8, b: u8| (a as f64 * w0 + b as f64 * w1) as u8;
    Color::rgb(channel(c0.r, c1.r), channel(c0.g, c1.g), channel(c0.b, c1.b))
}
