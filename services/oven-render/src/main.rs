//! Oven render CLI.
//!
//! Loads a JSON data bundle, renders the requested views into the image cache
//! and prints the response as JSON on stdout.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use oven_common::{Position, SensorFilter};
use renderer::{ColorMethod, PlaneKind, ViewRequest};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oven_render::{
    OvenDataSource, OvenRenderConfig, OvenRenderer, OvenViewsRequest, SourceBundle,
};

/// Readings taking part in a single-plane render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FilterArg {
    All,
    Distributed,
    Curing,
}

impl From<FilterArg> for SensorFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => SensorFilter::All,
            FilterArg::Distributed => SensorFilter::DistributedOnly,
            FilterArg::Curing => SensorFilter::CuringOnly,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "oven-render")]
#[command(about = "Render oven temperature heatmaps from sensor snapshots")]
struct Args {
    /// JSON data bundle (timeline, snapshots, layouts, rack config)
    #[arg(short, long, env = "OVEN_BUNDLE")]
    bundle: PathBuf,

    /// Source name inside the bundle
    #[arg(short, long)]
    source: String,

    /// Event timestamp (default: last timeline entry)
    #[arg(short, long)]
    timestamp: Option<i64>,

    /// Color method: "two" or "five"
    #[arg(long)]
    color_method: Option<String>,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    center_x: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    center_y: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    center_z: f64,

    /// Draw reference lines through the center
    #[arg(long)]
    ref_line: bool,

    /// Timeline distance of the comparison views (0 disables them)
    #[arg(long, default_value_t = 0)]
    compare_range: usize,

    /// Display range; 0/0 uses the data range
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    min_value: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    max_value: f64,

    /// Render a single plane instead (yz, xz, xy, xy-kind, persp-yz, persp-xz, persp-xy)
    #[arg(long)]
    plane: Option<String>,

    /// Readings used by the single plane; `curing` on xy-kind draws the rack outline
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    filter: FilterArg,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config = OvenRenderConfig::from_env();
    config.validate()?;
    info!(
        cache = %config.cache_image_path.display(),
        ttl_secs = config.cache_ttl_secs,
        "Starting oven render"
    );

    let bundle = SourceBundle::from_json_file(&args.bundle)
        .with_context(|| format!("loading bundle {}", args.bundle.display()))?;

    let timestamp = match args.timestamp {
        Some(ts) => ts,
        None => match bundle.event_timeline(&args.source)?.last() {
            Some(event) => event.timestamp,
            None => bail!("source '{}' has an empty timeline", args.source),
        },
    };

    let color_method = args.color_method.as_deref().map(ColorMethod::from_str);
    let renderer = OvenRenderer::new(config);

    let output = match args.plane.as_deref() {
        Some(slug) => {
            let Some(plane) = PlaneKind::from_slug(slug) else {
                bail!("unknown plane '{}'", slug);
            };
            let geometry = renderer.load_geometry(&bundle)?;
            let readings =
                renderer.load_readings(&bundle, &geometry, &args.source, Some(timestamp))?;
            let default_method = renderer.config().default_color_method;
            let request = single_view_request(
                &args,
                oven_common::value_range(&readings),
                color_method.unwrap_or(default_method),
            );
            let path = renderer.render_single_view(plane, &readings, &geometry, &request)?;
            serde_json::json!({ "path": path })
        }
        None => {
            let request = OvenViewsRequest {
                color_method,
                center_x: args.center_x,
                center_y: args.center_y,
                center_z: args.center_z,
                reference_line: args.ref_line,
                compare_offset: args.compare_range,
                min_value: args.min_value,
                max_value: args.max_value,
                ..OvenViewsRequest::new(args.source.clone(), timestamp)
            };
            let response = renderer.render_oven_views(&bundle, &request)?;
            serde_json::to_value(&response)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// View request for `--plane`; a 0/0 display range falls back to `data_range`.
fn single_view_request(
    args: &Args,
    data_range: (f64, f64),
    color_method: ColorMethod,
) -> ViewRequest {
    let (min, max) = if args.min_value == 0.0 && args.max_value == 0.0 {
        data_range
    } else {
        (args.min_value, args.max_value)
    };
    let anchor = Position::new(args.center_x, args.center_y, args.center_z);
    ViewRequest::new(anchor, min, max)
        .with_color_method(color_method)
        .with_reference_line(args.ref_line)
        .with_filter(args.filter.into())
}
