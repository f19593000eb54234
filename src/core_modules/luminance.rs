// THEORY (Luminance Extractor):
// The first stage of the warp collapses a color raster into one brightness value
// per pixel. It is a single-pixel heuristic: each output value depends only on the
// channels of the same pixel, never on neighbors.
//
// Brightness is the Rec. 601 luma weighting (0.299 R + 0.587 G + 0.114 B) on the
// raw 0..255 channel values, computed in f64. Gray rasters pass their single
// channel through; alpha is ignored.

use crate::core_modules::error::{WarpError, WarpResult};
use crate::core_modules::grid::{Grid, LuminanceMap};
use crate::core_modules::raster::{Raster, SUPPORTED_CHANNELS};

pub type Luminance = f64;

const RED_WEIGHT: Luminance = 0.299;
const GREEN_WEIGHT: Luminance = 0.587;
const BLUE_WEIGHT: Luminance = 0.114;

/// Rec. 601 luma of one pixel's samples.
#[inline]
pub fn pixel_luminance(samples: &[u8]) -> Luminance {
    match samples {
        [gray] => *gray as Luminance,
        [red, green, blue, ..] => {
            RED_WEIGHT * *red as Luminance
                + GREEN_WEIGHT * *green as Luminance
                + BLUE_WEIGHT * *blue as Luminance
        }
        _ => 0.0,
    }
}

/// Builds the luminance map of `raster`.
///
/// Fails with [`WarpError::InvalidImage`] when the channel count is not 1, 3 or 4.
pub fn extract(raster: &Raster) -> WarpResult<LuminanceMap> {
    if !raster.has_supported_layout() {
        return Err(WarpError::invalid_image(format!(
            "unsupported channel count {} (expected one of {:?})",
            raster.channels(),
            SUPPORTED_CHANNELS
        )));
    }

    let values: Vec<Luminance> = raster.pixels().map(pixel_luminance).collect();
    Grid::from_vec(raster.width(), raster.height(), values)
        .ok_or_else(|| WarpError::invalid_image("pixel count does not match dimensions"))
}
