//! Oven heatmap render service library.
//!
//! Assembles sensor snapshots from a data source, renders the cross-section
//! and rack-level views and stores them in the render cache.

pub mod config;
pub mod orchestrator;
pub mod readings;
pub mod source;

pub use config::{OvenRenderConfig, ValidRange};
pub use orchestrator::{OvenRenderer, OvenViewsRequest, OvenViewsResponse, RackImages};
pub use readings::SnapshotAssembler;
pub use source::{
    CuringLayoutEntry, OvenDataSource, ProbeLayoutEntry, RawSnapshot, SourceBundle, SourceData,
};
