//! Exercises the full rearrangement/trajectory/packing pipeline against an
//! in-memory presentation sink and reports per-tick telemetry.
//!
//! Does not open a window, upload to a GPU, or sleep/loop on a wall clock —
//! those are the host-shim and demo-loop concerns the core leaves to an
//! external collaborator.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use dmd_tweezer_rearrange::config::{Config, PartialConfig};
use dmd_tweezer_rearrange::driver::{DriverConfig, DriverLoop};
use dmd_tweezer_rearrange::presentation::BufferSink;
use dmd_tweezer_rearrange::{config, Occupancy};

/// Run one rearrangement session against an in-memory sink and print
/// per-tick telemetry.
#[derive(Parser, Debug)]
#[command(name = "dmd-demo", about = "Rearrangement pipeline demo harness")]
struct Args {
    /// Number of occupancy rows.
    #[arg(long)]
    rows: usize,

    /// Number of occupancy columns.
    #[arg(long)]
    cols: usize,

    /// Row-major occupancy as a string of '0'/'1', length rows*cols.
    #[arg(long)]
    occupancy: String,

    /// Expected tweezer count, cross-checked against the '1's in `occupancy`.
    #[arg(long)]
    num_tweezers: usize,

    /// Optional TOML config file overriding the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the smoothing factor N.
    #[arg(long)]
    smoothing_factor: Option<u32>,

    /// Override the tweezer square half-side, in pixels.
    #[arg(long)]
    tweezer_radius: Option<i32>,

    /// Override the planner's max step budget.
    #[arg(long)]
    max_plan_steps: Option<usize>,

    /// Present DMD-remapped frames instead of raw packed ones.
    #[arg(long)]
    dmd_coords: bool,
}

fn parse_occupancy(rows: usize, cols: usize, raw: &str, num_tweezers: usize) -> Result<Occupancy> {
    if raw.len() != rows * cols {
        bail!(
            "occupancy string length {} does not match rows*cols={}",
            raw.len(),
            rows * cols
        );
    }
    let cells: Vec<u8> = raw
        .chars()
        .map(|ch| match ch {
            '0' => Ok(0u8),
            '1' => Ok(1u8),
            other => bail!("occupancy must be '0'/'1', found '{other}'"),
        })
        .collect::<Result<_>>()?;
    Ok(Occupancy::checked(rows, cols, cells, num_tweezers)?)
}

fn main() -> Result<()> {
    dmd_tweezer_rearrange::logging::init_tracing(None).context("installing tracing subscriber")?;

    let args = Args::parse();

    let mut partial = match &args.config {
        Some(path) => config::load_from(path).context("loading --config file")?,
        None => PartialConfig::default(),
    };
    if let Some(n) = args.smoothing_factor {
        partial.smoothing_factor = Some(n);
    }
    if let Some(rho) = args.tweezer_radius {
        partial.tweezer_radius = Some(rho);
    }
    if let Some(max) = args.max_plan_steps {
        partial.max_plan_steps = Some(max);
    }
    let cfg = Config::from_partial(partial).context("applying configuration")?;

    let occupancy = parse_occupancy(args.rows, args.cols, &args.occupancy, args.num_tweezers)?;

    let driver_cfg = DriverConfig {
        use_dmd_coords: args.dmd_coords,
        ..DriverConfig::default()
    };
    let mut driver = DriverLoop::new(cfg, driver_cfg, BufferSink::default())
        .context("initializing presentation sink")?;
    driver.load_plan(occupancy).context("planning rearrangement")?;
    driver.run(|| false).context("running pipeline")?;

    let frames = &driver.sink().frames;
    println!("presented {} frame(s)", frames.len());
    for (i, frame) in frames.iter().enumerate() {
        let lit = frame.bytes.iter().filter(|&&b| b != 0).count();
        println!("  tick {i}: {lit} non-zero byte(s) of {}", frame.bytes.len());
    }

    Ok(())
}
