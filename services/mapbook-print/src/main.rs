//! Mapbook print tool.
//!
//! Loads a mapbook, builds its map sources with the configured layer
//! defaults, and writes the print descriptor of every printable source to
//! stdout as a JSON array. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use map_source::{parse_mapbook, IdAllocator, LayerDefaults, MapSourceRegistry, MapView};

#[derive(Parser, Debug)]
#[command(name = "mapbook-print")]
#[command(about = "Emit print descriptors for the map sources of a mapbook")]
struct Args {
    /// Mapbook XML file
    #[arg(short, long, env = "MAPBOOK_PATH")]
    mapbook: PathBuf,

    /// Settings file with a layer_options section
    #[arg(short, long, env = "MAPBOOK_SETTINGS", default_value = "config/mapbook.yaml")]
    settings: PathBuf,

    /// Map extent as minx,miny,maxx,maxy
    #[arg(long, default_value = "-180,-90,180,90")]
    extent: String,

    /// Scale denominator of the view
    #[arg(long, default_value = "1")]
    scale: f64,

    /// View size in pixels, WIDTHxHEIGHT
    #[arg(long, default_value = "800x600")]
    size: String,

    /// Map projection
    #[arg(long, default_value = "EPSG:4326")]
    projection: String,

    /// Only print the named sources (repeatable)
    #[arg(long = "source")]
    sources: Vec<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    let view = build_view(&args)?;

    let defaults = LayerDefaults::load(&args.settings)
        .with_context(|| format!("Failed to load settings: {:?}", args.settings))?
        .with_env_overrides();

    let xml = std::fs::read_to_string(&args.mapbook)
        .with_context(|| format!("Failed to read mapbook: {:?}", args.mapbook))?;
    let entries = parse_mapbook(&xml)
        .with_context(|| format!("Failed to parse mapbook: {:?}", args.mapbook))?;

    let entries: Vec<_> = if args.sources.is_empty() {
        entries
    } else {
        entries
            .into_iter()
            .filter(|e| args.sources.iter().any(|name| name == e.name()))
            .collect()
    };

    let ids = IdAllocator::new();
    let sources = MapSourceRegistry::default().build_all(&entries, &defaults, &ids);

    let prints: Vec<_> = sources
        .iter()
        .filter(|s| s.printable())
        .filter_map(|s| s.print(&view))
        .collect();

    if prints.is_empty() {
        warn!("No printable map sources found");
    }
    info!(
        sources = sources.len(),
        printed = prints.len(),
        "Built print descriptors"
    );

    println!("{}", serde_json::to_string_pretty(&prints)?);
    Ok(())
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn build_view(args: &Args) -> Result<MapView> {
    let (width, height) = parse_size(&args.size)?;
    MapView::parse(&args.extent, args.scale, width, height, &args.projection)
        .context("Invalid map view")
}

/// Parse a `WIDTHxHEIGHT` pixel size.
fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("Invalid size '{}', expected WIDTHxHEIGHT", s))?;
    let width = w.trim().parse().with_context(|| format!("Invalid width in '{}'", s))?;
    let height = h.trim().parse().with_context(|| format!("Invalid height in '{}'", s))?;
    Ok((width, height))
}
