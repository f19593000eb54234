// THEORY (Morphological Smoother):
// Raw mean-threshold masks are speckled: single pixels and thin filaments flip
// between foreground and background. The smoother runs K closing iterations
// (K dilations followed by K erosions) over the mask so that nearby blobs merge
// and isolated holes fill in. K directly controls how coarse the final warp looks.
//
// Key principles:
// 1.  **Fixed Neighborhood**: The structuring element is the 3x3 square
//     (8-connected), the same connectivity `blob_detector` labels with.
// 2.  **Bounded Domain**: Nothing outside the image is ever foreground, so
//     dilation cannot grow from beyond the border and there is no wraparound.
//     Erosion only examines in-bounds neighbors, which keeps closing extensive
//     (a foreground pixel is never lost) right up to the image edge.
// 3.  **K = 0 is a copy**: No passes, the mask is returned as given.

use crate::core_modules::grid::{BinaryMask, Grid};

/// Offsets of the 3x3 structuring element, center included.
const NEIGHBORHOOD: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// In-bounds neighbors of `(x, y)` under the 3x3 structuring element.
fn neighbors(mask: &BinaryMask, x: u32, y: u32) -> impl Iterator<Item = bool> + '_ {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    NEIGHBORHOOD.iter().filter_map(move |(dx, dy)| {
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx >= 0 && nx < w && ny >= 0 && ny < h {
            Some(*mask.get(nx as u32, ny as u32))
        } else {
            None
        }
    })
}

/// One dilation pass: a pixel becomes foreground if any neighbor is foreground.
pub fn dilate(mask: &BinaryMask) -> BinaryMask {
    Grid::from_fn(mask.width(), mask.height(), |x, y| {
        neighbors(mask, x, y).any(|fg| fg)
    })
}

/// One erosion pass: a pixel stays foreground only if every neighbor is foreground.
pub fn erode(mask: &BinaryMask) -> BinaryMask {
    Grid::from_fn(mask.width(), mask.height(), |x, y| {
        neighbors(mask, x, y).all(|fg| fg)
    })
}

/// Applies `iterations` closing passes: that many dilations, then that many erosions.
pub fn close(mask: &BinaryMask, iterations: u32) -> BinaryMask {
    let mut smoothed = mask.clone();
    for _ in 0..iterations {
        smoothed = dilate(&smoothed);
    }
    for _ in 0..iterations {
        smoothed = erode(&smoothed);
    }
    smoothed
}
