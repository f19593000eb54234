// THEORY:
// The `pipeline` module is the top-level API of the warp engine. It strings the
// stages together in dependency order and exposes a single call that turns a
// source raster plus a `WarpConfig` into a warped raster.
//
// Flow of one `warp` call:
// 1.  **Validate**: reject malformed rasters, and reject the continuous strategy up
//     front if its backend is missing. Nothing is computed for a rejected call.
// 2.  **Mask**: luminance -> mean-threshold mask -> K closing passes.
// 3.  **Shortcut**: a uniform mask has no transitions; the result is the source.
// 4.  **Plan**: exact feature transform, then either the index map (Discrete) or
//     the displacement field (Continuous), held as one `Resampling` value.
// 5.  **Resample**: evaluate the plan against the source.
//
// The engine is stateless apart from the backend capability detected at
// construction, so one instance can be shared by reference across threads.

use crate::core_modules::continuous_resample::{BACKEND_NAME, ContinuousBackend, DisplacementField};
use crate::core_modules::discrete_remap;
use crate::core_modules::distance_field::{self, IndexMap};
use crate::core_modules::error::{WarpError, WarpResult};
use crate::core_modules::grid::BinaryMask;
use crate::core_modules::raster::Raster;
use crate::core_modules::{luminance, mask, morphology};

/// Upper bound the front ends accept for either iteration count.
pub const MAX_ITERATIONS: u32 = 64;

/// Which resampling strategy a warp uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Nearest-source-pixel lookup through the index map. Blocky.
    #[default]
    Discrete,
    /// Bilinear sampling through a displacement field. Smooth.
    Continuous,
}

impl Strategy {
    /// File-name suffix that tells outputs of the two strategies apart.
    pub fn output_suffix(&self) -> &'static str {
        match self {
            Strategy::Discrete => "pixelwarp",
            Strategy::Continuous => "pixelwarp_smooth",
        }
    }
}

/// Caller-supplied parameters of one warp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpConfig {
    pub strategy: Strategy,
    /// Closing passes applied to the mask. Higher values merge blobs and give a
    /// coarser warp. Zero leaves the mask untouched.
    pub closing_iterations: u32,
    /// Maximum travel, in pixels, of the continuous strategy's sampling position.
    /// Zero disables displacement.
    pub dilation_iterations: u32,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Discrete,
            closing_iterations: 2,
            dilation_iterations: 4,
        }
    }
}

impl WarpConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_closing_iterations(mut self, iterations: u32) -> Self {
        self.closing_iterations = iterations;
        self
    }

    pub fn with_dilation_iterations(mut self, iterations: u32) -> Self {
        self.dilation_iterations = iterations;
        self
    }
}

/// A fully prepared resampling pass, ready to evaluate against the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Resampling {
    Discrete(IndexMap),
    Continuous(DisplacementField),
    /// The mask had no transitions; the output is the source.
    Identity,
}

/// The warp engine.
#[derive(Debug, Clone)]
pub struct WarpEngine {
    continuous: Option<ContinuousBackend>,
}

impl Default for WarpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WarpEngine {
    /// Builds an engine, detecting the continuous backend once.
    pub fn new() -> Self {
        Self {
            continuous: ContinuousBackend::detect(),
        }
    }

    /// Builds an engine that reports the continuous backend as unavailable.
    pub fn without_continuous_backend() -> Self {
        Self { continuous: None }
    }

    pub fn has_continuous_backend(&self) -> bool {
        self.continuous.is_some()
    }

    /// Luminance, mean threshold and `closing_iterations` closing passes.
    pub fn build_mask(&self, source: &Raster, closing_iterations: u32) -> WarpResult<BinaryMask> {
        let luminance = luminance::extract(source)?;
        let raw = mask::build(&luminance);
        Ok(morphology::close(&raw, closing_iterations))
    }

    /// Runs every stage up to, but not including, the final resampling.
    pub fn plan(&self, source: &Raster, config: &WarpConfig) -> WarpResult<Resampling> {
        self.check_backend(config.strategy)?;

        let smoothed = self.build_mask(source, config.closing_iterations)?;
        if smoothed.is_uniform() {
            return Ok(Resampling::Identity);
        }

        let features = distance_field::transform(&smoothed)?;
        Ok(match config.strategy {
            Strategy::Discrete => Resampling::Discrete(features.indices),
            Strategy::Continuous => Resampling::Continuous(DisplacementField::build(
                &features,
                config.dilation_iterations,
            )),
        })
    }

    /// Warps `source` according to `config`.
    ///
    /// The output always has the dimensions and channel count of `source`.
    pub fn warp(&self, source: &Raster, config: &WarpConfig) -> WarpResult<Raster> {
        match self.plan(source, config)? {
            Resampling::Identity => Ok(source.clone()),
            Resampling::Discrete(indices) => discrete_remap::remap(source, &indices),
            Resampling::Continuous(field) => {
                let backend = self.continuous.ok_or(WarpError::BackendUnavailable {
                    backend: BACKEND_NAME,
                })?;
                backend.resample(source, &field)
            }
        }
    }

    fn check_backend(&self, strategy: Strategy) -> WarpResult<()> {
        if strategy == Strategy::Continuous && self.continuous.is_none() {
            return Err(WarpError::BackendUnavailable {
                backend: BACKEND_NAME,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Raster {
        let data = (0..width * height)
            .flat_map(|i| {
                let v = (i * 255 / (width * height - 1)) as u8;
                [v, v / 2, 255 - v]
            })
            .collect();
        Raster::new(width, height, 3, data).unwrap()
    }

    #[test]
    fn continuous_without_backend_is_rejected() {
        let engine = WarpEngine::without_continuous_backend();
        let config = WarpConfig::default().with_strategy(Strategy::Continuous);
        assert_eq!(
            engine.warp(&gradient(4, 4), &config),
            Err(WarpError::BackendUnavailable {
                backend: BACKEND_NAME
            })
        );
    }

    #[test]
    fn discrete_still_works_without_backend() {
        let engine = WarpEngine::without_continuous_backend();
        let out = engine.warp(&gradient(5, 5), &WarpConfig::default()).unwrap();
        assert_eq!((out.width(), out.height(), out.channels()), (5, 5, 3));
    }

    #[test]
    fn invalid_channel_layout_is_rejected() {
        let engine = WarpEngine::new();
        let raster = Raster::new(2, 2, 2, vec![0; 8]).unwrap();
        assert!(matches!(
            engine.warp(&raster, &WarpConfig::default()),
            Err(WarpError::InvalidImage { .. })
        ));
    }

    #[test]
    fn uniform_raster_plans_identity() {
        let engine = WarpEngine::new();
        let raster = Raster::from_pixel(4, 4, &[90, 90, 90]).unwrap();
        assert_eq!(
            engine.plan(&raster, &WarpConfig::default()).unwrap(),
            Resampling::Identity
        );
    }

    #[test]
    fn suffixes_differ_per_strategy() {
        assert_ne!(
            Strategy::Discrete.output_suffix(),
            Strategy::Continuous.output_suffix()
        );
    }
}
