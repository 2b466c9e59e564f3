//! On-disk storage for rendered view images.
//!
//! Provides:
//! - Artifact naming (`{timestamp}-{token}-{family}.png`)
//! - A directory-backed render cache with TTL sweeping

pub mod artifact;
pub mod render_cache;

pub use artifact::{ArtifactFamily, ArtifactName, RackLevel};
pub use render_cache::{random_token, sweep_expired, RenderCache, StoredImage, DEFAULT_TTL};
