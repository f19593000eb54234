// THEORY:
// The warp engine is a pure, synchronous computation. This module is the layer
// around it that deals with many files at once: decode, warp, encode, repeated
// for every input with the same configuration.
//
// Key principles:
// 1.  **Blocking Work Off The Runtime**: Every file is handled end to end inside
//     `tokio::task::spawn_blocking`, because decoding, warping and encoding are all
//     CPU-bound.
// 2.  **Bounded Parallelism**: A semaphore sized to the job count caps how many
//     files are in flight, so a batch of hundreds of images does not decode them
//     all into memory at once.
// 3.  **Shared, Stateless Engine**: Workers share one `WarpEngine` through an `Arc`.
//     The engine holds no mutable state, so no locking is needed.
// 4.  **Failure Isolation**: A file that cannot be read, warped or written is
//     recorded as failed and the batch continues. Results come back in input order.

use crate::core_modules::blob_detector::blob_detector;
use crate::core_modules::utils::image_helper::image_helper;
use crate::pipeline::{WarpConfig, WarpEngine};
use anyhow::{Context, Result};
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// The result of one input file.
#[derive(Debug)]
pub struct BatchEntry {
    pub input: PathBuf,
    /// Written output path, or the rendered error chain.
    pub outcome: std::result::Result<PathBuf, String>,
}

/// Per-file outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

/// Runs one configuration over many files.
pub struct BatchRunner {
    engine: Arc<WarpEngine>,
    config: WarpConfig,
    output_dir: PathBuf,
    permits: Arc<Semaphore>,
}

impl BatchRunner {
    /// `jobs` is clamped to at least one.
    pub fn new(engine: WarpEngine, config: WarpConfig, output_dir: PathBuf, jobs: usize) -> Self {
        Self {
            engine: Arc::new(engine),
            config,
            output_dir,
            permits: Arc::new(Semaphore::new(jobs.max(1))),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Warps every input and writes the results into the output directory.
    pub async fn run(&self, inputs: Vec<PathBuf>) -> Result<BatchReport> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating output directory {}", self.output_dir.display()))?;

        info!(
            "Warping {} file(s) with {:?} (closing={}, dilation={})",
            inputs.len(),
            self.config.strategy,
            self.config.closing_iterations,
            self.config.dilation_iterations
        );

        let tasks = inputs.into_iter().map(|input| {
            let engine = Arc::clone(&self.engine);
            let permits = Arc::clone(&self.permits);
            let config = self.config;
            let output_dir = self.output_dir.clone();

            async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        let task_input = input.clone();
                        tokio::task::spawn_blocking(move || {
                            process_file(&engine, &config, &task_input, &output_dir)
                        })
                        .await
                        .context("warp worker panicked")
                        .and_then(|result| result)
                    }
                    Err(e) => Err(anyhow::Error::new(e).context("worker pool closed")),
                };

                match &outcome {
                    Ok(path) => info!("{} -> {}", input.display(), path.display()),
                    Err(e) => error!("{}: {e:#}", input.display()),
                }

                BatchEntry {
                    input,
                    outcome: outcome.map_err(|e| format!("{e:#}")),
                }
            }
        });

        let entries = join_all(tasks).await;
        let report = BatchReport { entries };
        if report.failed() > 0 {
            warn!("{} of {} file(s) failed", report.failed(), report.entries.len());
        }
        Ok(report)
    }
}

/// Decode, warp and encode a single file. Runs on a blocking worker.
pub fn process_file(
    engine: &WarpEngine,
    config: &WarpConfig,
    input: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let image = image_helper::open(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let raster = image_helper::raster_from_image(image)
        .with_context(|| format!("converting {}", input.display()))?;

    if log::log_enabled!(log::Level::Debug) {
        let mask = engine.build_mask(&raster, config.closing_iterations)?;
        let stats = blob_detector::mask_stats(&mask);
        debug!(
            "{}: {}x{} mask, {} blob(s), coverage {:.3}, mean blob {:.1}px",
            input.display(),
            raster.width(),
            raster.height(),
            stats.blob_count,
            stats.coverage,
            stats.mean_blob_size
        );
    }

    let warped = engine
        .warp(&raster, config)
        .with_context(|| format!("warping {}", input.display()))?;

    let output = image_helper::build_output_path(input, output_dir, config.strategy.output_suffix());
    image_helper::save(&output, warped)
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::raster::Raster;
    use crate::pipeline::Strategy;

    fn write_split_image(path: &Path) {
        // Left half dark, right half bright.
        let data = (0..16u32 * 8)
            .flat_map(|i| if i % 16 < 8 { [20u8, 20, 20] } else { [230u8, 230, 230] })
            .collect();
        let raster = Raster::new(16, 8, 3, data).unwrap();
        image_helper::save(path, raster).unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn batch_writes_suffixed_outputs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        write_split_image(&first);
        write_split_image(&second);

        let out_dir = dir.path().join("output");
        let runner = BatchRunner::new(WarpEngine::new(), WarpConfig::default(), out_dir.clone(), 2);
        let report = runner.run(vec![first.clone(), second.clone()]).await.unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.entries[0].input, first);
        assert_eq!(
            report.entries[1].outcome.as_ref().unwrap(),
            &out_dir.join("second_pixelwarp.png")
        );
        assert!(out_dir.join("first_pixelwarp.png").exists());
    }

    #[test_log::test(tokio::test)]
    async fn missing_file_fails_without_stopping_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        write_split_image(&good);
        let missing = dir.path().join("missing.png");

        let runner = BatchRunner::new(
            WarpEngine::new(),
            WarpConfig::default().with_strategy(Strategy::Continuous),
            dir.path().join("out"),
            1,
        );
        let report = runner.run(vec![missing, good]).await.unwrap();

        assert_eq!(report.failed(), 1);
        assert!(report.entries[0].outcome.is_err());
        assert!(report.entries[1].outcome.is_ok());
    }

    #[test_log::test]
    fn unavailable_backend_is_reported_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        write_split_image(&input);

        let err = process_file(
            &WarpEngine::without_continuous_backend(),
            &WarpConfig::default().with_strategy(Strategy::Continuous),
            &input,
            dir.path(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("unavailable"));
        assert!(!dir.path().join("in_pixelwarp_smooth.png").exists());
    }
}
