// Command-line front end: warps one or many images with the same settings and
// writes `<stem>_pixelwarp.<ext>` / `<stem>_pixelwarp_smooth.<ext>` files into the
// output directory. Originals are never touched.

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use pixel_warp::batch_pipeline::BatchRunner;
use pixel_warp::core_modules::utils::image_helper::image_helper;
use pixel_warp::pipeline::MAX_ITERATIONS;
use pixel_warp::{Strategy, WarpConfig, WarpEngine};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Nearest-pixel remap: blocky, chunky plateaus.
    Discrete,
    /// Bilinear remap: smooth, elastic bends.
    Continuous,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Discrete => Strategy::Discrete,
            StrategyArg::Continuous => Strategy::Continuous,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pixel_warp", about = "Content-driven pixel warp for glitch art")]
struct Cli {
    /// Input images. Comma separated lists are accepted as well.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Resampling strategy.
    #[arg(long, value_enum, default_value = "discrete")]
    strategy: StrategyArg,

    /// Mask closing passes; higher merges more regions (chunkier warp).
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(0..=MAX_ITERATIONS as i64))]
    closing: u32,

    /// Maximum pixel travel of the continuous strategy.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(0..=MAX_ITERATIONS as i64))]
    dilation: u32,

    /// Directory receiving the warped files.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Files processed in parallel. Defaults to the number of CPUs.
    #[arg(long)]
    jobs: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut inputs = Vec::new();
    for raw in &cli.inputs {
        for path in image_helper::parse_paths(raw) {
            if path.exists() {
                inputs.push(path);
            } else {
                warn!("Skipping, file not found: {}", path.display());
            }
        }
    }
    if inputs.is_empty() {
        bail!("no input files found");
    }

    let engine = WarpEngine::new();
    let strategy = Strategy::from(cli.strategy);
    if strategy == Strategy::Continuous && !engine.has_continuous_backend() {
        bail!("continuous strategy needs the `ndarray-backend` feature; rerun with --strategy discrete");
    }

    let config = WarpConfig {
        strategy,
        closing_iterations: cli.closing,
        dilation_iterations: cli.dilation,
    };
    let jobs = cli.jobs.unwrap_or_else(num_cpus::get);

    let runner = BatchRunner::new(engine, config, cli.output_dir, jobs);
    let report = runner.run(inputs).await?;

    info!(
        "Done: {} written, {} failed, output in {}",
        report.succeeded(),
        report.failed(),
        runner.output_dir().display()
    );
    if report.succeeded() == 0 {
        bail!("every input failed");
    }
    Ok(())
}
