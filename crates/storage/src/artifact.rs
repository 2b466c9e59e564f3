//! Artifact names for cached view images.

use oven_common::SensorKind;
use serde::{Deserialize, Serialize};

/// Rack level slot, by position in the rack configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RackLevel {
    Bottom,
    Middle,
    Top,
}

impl RackLevel {
    pub const ALL: [RackLevel; 3] = [RackLevel::Bottom, RackLevel::Middle, RackLevel::Top];

    /// Index into the configured level list.
    pub fn index(&self) -> usize {
        match self {
            RackLevel::Bottom => 0,
            RackLevel::Middle => 1,
            RackLevel::Top => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RackLevel::Bottom => "bottom",
            RackLevel::Middle => "middle",
            RackLevel::Top => "top",
        }
    }
}

/// Family of a rendered image; one file suffix per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactFamily {
    Yz,
    Xz,
    Xy,
    Rack(RackLevel, SensorKind),
    PerspYz,
    PerspXz,
    PerspXy,
}

impl ArtifactFamily {
    /// Every family, in sweep order.
    pub fn all() -> Vec<ArtifactFamily> {
        let mut families = vec![ArtifactFamily::Yz, ArtifactFamily::Xz, ArtifactFamily::Xy];
        for level in [RackLevel::Top, RackLevel::Middle, RackLevel::Bottom] {
            families.push(ArtifactFamily::Rack(level, SensorKind::DistributedProbe));
            families.push(ArtifactFamily::Rack(level, SensorKind::EmbeddedCuringProbe));
        }
        families.extend([
            ArtifactFamily::PerspYz,
            ArtifactFamily::PerspXz,
            ArtifactFamily::PerspXy,
        ]);
        families
    }

    pub fn suffix(&self) -> String {
        match self {
            ArtifactFamily::Yz => "yz".to_string(),
            ArtifactFamily::Xz => "xz".to_string(),
            ArtifactFamily::Xy => "xy".to_string(),
            ArtifactFamily::Rack(level, kind) => format!("{}-{}", level.name(), kind.tag()),
            ArtifactFamily::PerspYz => "persp-yz".to_string(),
            ArtifactFamily::PerspXz => "persp-xz".to_string(),
            ArtifactFamily::PerspXy => "persp-xy".to_string(),
        }
    }

    /// File name endings swept by the render cache.
    pub fn tracked_suffixes() -> Vec<String> {
        Self::all()
            .iter()
            .map(|f| format!("-{}.png", f.suffix()))
            .collect()
    }
}

/// `{timestamp}-{token}-{family}.png`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    pub timestamp: i64,
    pub token: String,
    pub family: ArtifactFamily,
}

impl ArtifactName {
    pub fn new(timestamp: i64, token: impl Into<String>, family: ArtifactFamily) -> Self {
        Self {
            timestamp,
            token: token.into(),
            family,
        }
    }
}

impl std::fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}.png", self.timestamp, self.token, self.family.suffix())
    }
}
