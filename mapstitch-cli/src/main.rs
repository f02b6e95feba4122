//! mapstitch CLI - Command-line interface
//!
//! Downloads the tiles covering a bounding box and stitches them into a
//! single raster. Configuration comes from a JSON file (`--config`),
//! with a few common settings overridable on the command line.

mod error;

use clap::{Parser, ValueEnum};
use error::CliError;
use mapstitch::config::MosaicConfig;
use mapstitch::logging;
use mapstitch::orchestrator::MosaicOrchestrator;
use mapstitch::progress::ProgressEvent;
use mapstitch::provider::{ProviderConfig, ReqwestTileClient};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// File written by `--write-config`.
const DEFAULT_CONFIG_FILE: &str = "mapstitch.json";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    /// OpenStreetMap raster tiles (WGS84 grid)
    Osm,
    /// AutoNavi satellite imagery (GCJ02 grid)
    Amap,
    /// Baidu satellite imagery (BD09 grid)
    Baidu,
}

impl From<ProviderArg> for ProviderConfig {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Osm => ProviderConfig::Osm,
            ProviderArg::Amap => ProviderConfig::AMap,
            ProviderArg::Baidu => ProviderConfig::Baidu,
        }
    }
}

#[derive(Parser)]
#[command(name = "mapstitch")]
#[command(version = mapstitch::VERSION)]
#[command(about = "Download map tiles for a bounding box and stitch them into one raster", long_about = None)]
struct Args {
    /// Path to a JSON config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Write a default config file to the current directory and exit
    #[arg(long)]
    write_config: bool,

    /// Zoom level (clamped to the provider's supported range)
    #[arg(long)]
    zoom: Option<u8>,

    /// Map tile provider
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,

    /// Output directory for the mosaic and the tile cache
    #[arg(long)]
    output: Option<PathBuf>,

    /// Maximum concurrent tile downloads
    #[arg(long)]
    concurrency: Option<usize>,

    /// Keep the per-tile cache after stitching
    #[arg(long)]
    keep_tiles: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(err) = run(args).await {
        err.exit();
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    if args.write_config {
        let json = serde_json::to_string_pretty(&MosaicConfig::default())
            .map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(DEFAULT_CONFIG_FILE, json)
            .map_err(|e| CliError::Config(format!("cannot write {}: {}", DEFAULT_CONFIG_FILE, e)))?;
        println!("wrote default config to {}", DEFAULT_CONFIG_FILE);
        return Ok(());
    }

    let config = load_config(&args)?;

    let _guard = logging::init_logging("logs", "mapstitch.log")
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let client =
        Arc::new(ReqwestTileClient::new().map_err(|e| CliError::Client(e.to_string()))?);

    // Progress events render as in-place console lines, one per phase
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
    let printer = tokio::spawn(async move {
        let mut current_phase = None;
        while let Some(event) = rx.recv().await {
            if current_phase != Some(event.phase) {
                if current_phase.is_some() {
                    println!();
                }
                current_phase = Some(event.phase);
            }
            print!("\r{}", event);
            let _ = std::io::stdout().flush();
        }
        if current_phase.is_some() {
            println!();
        }
    });

    let started = Instant::now();
    let mut orchestrator = MosaicOrchestrator::new(config, client).with_progress(tx);
    let result = orchestrator.run().await;

    // Close the progress channel so the printer drains and exits
    drop(orchestrator);
    let _ = printer.await;

    let output = result.map_err(CliError::Run)?;
    println!(
        "mosaic written to {} in {:.1} s",
        output.display(),
        started.elapsed().as_secs_f64()
    );

    Ok(())
}

fn load_config(args: &Args) -> Result<MosaicConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::Config(format!("cannot read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&text).map_err(|e| {
                CliError::Config(format!("cannot parse {}: {}", path.display(), e))
            })?
        }
        None => MosaicConfig::default(),
    };

    if let Some(zoom) = args.zoom {
        config.zoom = zoom;
    }
    if let Some(provider) = args.provider {
        config.provider = provider.into();
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if args.keep_tiles {
        config.keep_tiles = true;
    }

    if !config.output_dir.is_dir() {
        return Err(CliError::Config(format!(
            "output directory {} does not exist",
            config.output_dir.display()
        )));
    }

    Ok(config)
}
