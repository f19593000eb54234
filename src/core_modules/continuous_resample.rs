// THEORY (Continuous Resampler):
// Strategy B. Instead of snapping every background pixel onto its nearest
// foreground pixel, it slides the sampling position part of the way there and
// reads the source with bilinear interpolation. The result bends smoothly where
// strategy A produces hard plateaus.
//
// Two steps:
// 1.  **Displacement Field**: For a pixel at distance `d` from the foreground, the
//     offset points along the negative distance gradient (straight at its
//     nearest foreground pixel, which the feature transform already knows) with
//     magnitude `min(d, D)`, where `D` is the dilation-iteration count: D passes of
//     a 3x3 dilation reach D pixels, and that is how far a pixel may travel.
//     Offsets are expressed in normalized sampling space, where `[-1, 1]` spans the
//     image from first to last pixel center, and clamped to `[-1, 1]`. D = 0 gives
//     a zero field.
// 2.  **Grid Sampling**: Output pixel = bilinear sample of the source at
//     `base + displacement`, with the sample position clamped to the image so
//     nothing wraps around. This step runs on the dense-array backend.
//
// The backend is a capability: `ContinuousBackend::detect` is checked once when
// the engine is built. Without it the strategy reports `BackendUnavailable`.

use crate::core_modules::distance_field::FeatureTransform;
use crate::core_modules::error::{WarpError, WarpResult};
use crate::core_modules::grid::Grid;
use crate::core_modules::raster::Raster;

/// Name reported in [`WarpError::BackendUnavailable`].
pub const BACKEND_NAME: &str = "ndarray";

/// Per-pixel offsets in normalized sampling space, each component in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementField {
    grid: Grid<[f32; 2]>,
}

impl DisplacementField {
    /// Builds the field from a feature transform and the dilation-iteration count.
    pub fn build(features: &FeatureTransform, dilation_iterations: u32) -> Self {
        let distances = &features.distances;
        let (width, height) = (distances.width(), distances.height());
        let reach = dilation_iterations as f32;
        let scale_x = normalization_scale(width);
        let scale_y = normalization_scale(height);

        let grid = Grid::from_fn(width, height, |x, y| {
            let d = *distances.get(x, y);
            if d == 0.0 || reach == 0.0 {
                return [0.0, 0.0];
            }
            let target = features.indices.get(x, y);
            let travel = d.min(reach) / d;
            let dx = (target.x as f32 - x as f32) * travel;
            let dy = (target.y as f32 - y as f32) * travel;
            [
                (dx * scale_x).clamp(-1.0, 1.0),
                (dy * scale_y).clamp(-1.0, 1.0),
            ]
        });

        Self { grid }
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [f32; 2] {
        *self.grid.get(x, y)
    }

    /// Largest absolute component anywhere in the field.
    pub fn max_magnitude(&self) -> f32 {
        self.grid
            .iter()
            .fold(0.0f32, |acc, [dx, dy]| acc.max(dx.abs()).max(dy.abs()))
    }
}

/// Pixels-to-normalized factor for one axis. A single-pixel axis has no extent
/// and therefore no displacement.
#[inline]
fn normalization_scale(extent: u32) -> f32 {
    if extent > 1 {
        2.0 / (extent - 1) as f32
    } else {
        0.0
    }
}

/// Normalized coordinate of pixel center `i` on an axis of `extent` pixels.
#[inline]
fn normalize(i: u32, extent: u32) -> f32 {
    if extent > 1 {
        2.0 * i as f32 / (extent - 1) as f32 - 1.0
    } else {
        0.0
    }
}

/// Pixel coordinate of normalized `g`, clamped to the image.
#[inline]
fn unnormalize(g: f32, extent: u32) -> f32 {
    let last = extent.saturating_sub(1) as f32;
    ((g + 1.0) * 0.5 * last).clamp(0.0, last)
}

/// Handle to the dense-array evaluation backend.
///
/// Obtainable only through [`ContinuousBackend::detect`], so holding one proves
/// the capability is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuousBackend {
    _detected: (),
}

impl ContinuousBackend {
    /// Returns the backend when this build carries it.
    pub fn detect() -> Option<Self> {
        if cfg!(feature = "ndarray-backend") {
            Some(Self { _detected: () })
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        BACKEND_NAME
    }
}

#[cfg(feature = "ndarray-backend")]
impl ContinuousBackend {
    /// Samples `source` at `base + displacement` with bilinear interpolation.
    pub fn resample(&self, source: &Raster, field: &DisplacementField) -> WarpResult<Raster> {
        use ndarray::{Array3, Axis, Zip};

        let (width, height) = (source.width(), source.height());
        if field.width() != width || field.height() != height {
            return Err(WarpError::invalid_image(format!(
                "displacement field {}x{} does not match raster {width}x{height}",
                field.width(),
                field.height()
            )));
        }
        let (w, h, c) = (width as usize, height as usize, source.channels() as usize);

        let src = Array3::from_shape_vec(
            (h, w, c),
            source.as_bytes().iter().map(|s| *s as f32).collect(),
        )
        .map_err(|e| WarpError::invalid_image(e.to_string()))?;

        let grid = Array3::from_shape_fn((h, w, 2), |(y, x, axis)| {
            let [dx, dy] = field.get(x as u32, y as u32);
            if axis == 0 {
                normalize(x as u32, width) + dx
            } else {
                normalize(y as u32, height) + dy
            }
        });

        let mut out = Array3::<f32>::zeros((h, w, c));
        Zip::from(out.lanes_mut(Axis(2)))
            .and(grid.lanes(Axis(2)))
            .for_each(|mut pixel, coord| {
                let sx = unnormalize(coord[0], width);
                let sy = unnormalize(coord[1], height);

                let x0 = sx.floor() as usize;
                let y0 = sy.floor() as usize;
                let x1 = (x0 + 1).min(w - 1);
                let y1 = (y0 + 1).min(h - 1);
                let fx = sx - x0 as f32;
                let fy = sy - y0 as f32;

                for ch in 0..c {
                    let p00 = src[[y0, x0, ch]];
                    let p10 = src[[y0, x1, ch]];
                    let p01 = src[[y1, x0, ch]];
                    let p11 = src[[y1, x1, ch]];

                    let top = p00 * (1.0 - fx) + p10 * fx;
                    let bottom = p01 * (1.0 - fx) + p11 * fx;
                    pixel[ch] = top * (1.0 - fy) + bottom * fy;
                }
            });

        let data = out
            .iter()
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        Raster::new(width, height, source.channels(), data)
    }
}

#[cfg(not(feature = "ndarray-backend"))]
impl ContinuousBackend {
    pub fn resample(&self, _source: &Raster, _field: &DisplacementField) -> WarpResult<Raster> {
        Err(WarpError::BackendUnavailable {
            backend: BACKEND_NAME,
        })
    }
}
