//! Service configuration.
//!
//! Loaded once at startup and passed by reference into every request; nothing
//! in the render path reads the environment.

use std::path::PathBuf;
use std::time::Duration;

use oven_common::{Axis, Enclosure, OvenError, OvenResult};
use renderer::ColorMethod;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Inclusive range of plausible sensor values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ValidRange {
    fn default() -> Self {
        Self { min: 0.0, max: 700.0 }
    }
}

impl ValidRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Configuration for the oven render service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvenRenderConfig {
    /// Directory rendered images are written to.
    pub cache_image_path: PathBuf,
    /// Prefix of the public image paths returned to clients.
    pub web_image_path: String,
    /// Age after which cached images are swept.
    pub cache_ttl_secs: u64,
    pub valid_range: ValidRange,
    pub enclosure: Enclosure,
    pub default_color_method: ColorMethod,
}

impl Default for OvenRenderConfig {
    fn default() -> Self {
        Self {
            cache_image_path: PathBuf::from("web/images"),
            web_image_path: "/images/".to_string(),
            cache_ttl_secs: 600, // 10 minutes
            valid_range: ValidRange::default(),
            enclosure: Enclosure::default(),
            default_color_method: ColorMethod::FiveStop,
        }
    }
}

impl OvenRenderConfig {
    /// Load configuration from `OVEN_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cache_image_path = lookup("OVEN_CACHE_IMAGE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_image_path);

        let web_image_path = lookup("OVEN_WEB_IMAGE_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.web_image_path);

        let cache_ttl_secs = lookup("OVEN_CACHE_TTL_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache_ttl_secs);

        let min = lookup("OVEN_MIN_VALID_VALUE").and_then(|v| v.trim().parse::<f64>().ok());
        let max = lookup("OVEN_MAX_VALID_VALUE").and_then(|v| v.trim().parse::<f64>().ok());
        let valid_range = match (min, max) {
            (None, None) => defaults.valid_range,
            (min, max) => {
                let range = ValidRange {
                    min: min.unwrap_or(defaults.valid_range.min),
                    max: max.unwrap_or(defaults.valid_range.max),
                };
                if range.min > range.max {
                    warn!(
                        min = range.min,
                        max = range.max,
                        "Inverted valid value range, using default"
                    );
                    defaults.valid_range
                } else {
                    range
                }
            }
        };

        let default_color_method = lookup("OVEN_COLOR_METHOD")
            .map(|v| ColorMethod::from_str(&v))
            .unwrap_or(defaults.default_color_method);

        Self {
            cache_image_path,
            web_image_path,
            cache_ttl_secs,
            valid_range,
            enclosure: defaults.enclosure,
            default_color_method,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> OvenResult<()> {
        if self.cache_image_path.as_os_str().is_empty() {
            return Err(OvenError::ConfigError("cache_image_path is empty".into()));
        }
        if self.cache_ttl_secs == 0 {
            return Err(OvenError::ConfigError("cache_ttl_secs must be positive".into()));
        }
        if self.valid_range.min > self.valid_range.max {
            return Err(OvenError::ConfigError(format!(
                "valid range is inverted: {} > {}",
                self.valid_range.min, self.valid_range.max
            )));
        }
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let (min, max) = self.enclosure.range(axis);
            if min >= max {
                return Err(OvenError::ConfigError(format!(
                    "enclosure {:?} range is empty: {}..{}",
                    axis, min, max
                )));
            }
        }
        if self.enclosure.bottom_height < 0 {
            return Err(OvenError::ConfigError("bottom_height must not be negative".into()));
        }
        Ok(())
    }
}
