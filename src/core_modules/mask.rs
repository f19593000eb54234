// THEORY (Mask Builder):
// The mask splits the image into foreground and background by thresholding the
// luminance map against its own global mean. A pixel is foreground when its
// luminance is greater than or equal to the mean, so ties resolve to foreground.
//
// The tie rule is what makes a perfectly uniform image produce an all-foreground
// mask, which the rest of the pipeline turns into the identity warp.

use crate::core_modules::grid::{BinaryMask, LuminanceMap};

/// Arithmetic mean of all luminance values. Returns 0.0 for an empty map.
///
/// The result is clamped into `[min, max]` of the map so that accumulated
/// rounding can never lift the mean of a uniform map above its only value.
pub fn mean_luminance(luminance: &LuminanceMap) -> f64 {
    if luminance.is_empty() {
        return 0.0;
    }
    let (min, max) = luminance
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let mean = luminance.iter().sum::<f64>() / luminance.len() as f64;
    mean.clamp(min, max)
}

/// Classifies every pixel against the global mean (`value >= mean`).
pub fn build(luminance: &LuminanceMap) -> BinaryMask {
    let mean = mean_luminance(luminance);
    luminance.map(|value| *value >= mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::grid::Grid;

    #[test]
    fn uniform_map_is_all_foreground() {
        let lum = Grid::filled(4, 4, 127.5);
        let mask = build(&lum);
        assert_eq!(mask.count_foreground(), 16);
    }

    #[test]
    fn uniform_map_with_inexact_value_is_all_foreground() {
        let value = 0.299 * 77.0 + 0.587 * 131.0 + 0.114 * 13.0;
        let lum = Grid::filled(7, 13, value);
        assert_eq!(mean_luminance(&lum), value);
        assert!(build(&lum).iter().all(|fg| *fg));
    }

    #[test]
    fn thresholds_against_mean() {
        let lum = Grid::from_vec(4, 1, vec![0.0, 10.0, 20.0, 30.0]).unwrap();
        // mean = 15
        let mask = build(&lum);
        assert_eq!(mask.as_slice(), &[false, false, true, true]);
    }

    #[test]
    fn value_equal_to_mean_is_foreground() {
        let lum = Grid::from_vec(3, 1, vec![0.0, 5.0, 10.0]).unwrap();
        let mask = build(&lum);
        assert_eq!(mask.as_slice(), &[false, true, true]);
    }
}
