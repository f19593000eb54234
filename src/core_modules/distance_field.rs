// THEORY (Distance-Field Transformer):
// This is the stage that gives the warp its shape. For every pixel it finds the
// nearest foreground pixel of the smoothed mask under exact Euclidean distance and
// records both the distance and that pixel's coordinate. The coordinates form the
// `IndexMap` the discrete strategy samples through; the distances (and the offsets
// toward the recorded coordinate) drive the continuous strategy.
//
// Foreground pixels are their own nearest foreground pixel: distance 0, index maps
// to themselves. Background pixels are pulled onto the foreground side of the
// nearest mask transition. A mask with no foreground at all has nothing to pull
// toward and yields the identity map with an all-zero field.
//
// Algorithm: the separable exact transform of Felzenszwalb & Huttenlocher, with
// argmin tracking.
// 1.  **Column Pass**: For each column, a forward and a backward scan give the
//     vertical distance to the nearest foreground pixel in that column and its row.
// 2.  **Row Pass**: For each row, the squared distance is the lower envelope of the
//     parabolas `(x - q)^2 + g(q)^2` over all columns `q`. Walking the envelope
//     yields, per pixel, the winning column `q` and thereby the nearest pixel
//     `(q, row(q))`.
// Both passes are linear in the pixel count. Ties are broken by fixed scan order
// (lower row in the column pass, the earlier envelope segment in the row pass), so
// the output is a pure function of the mask.

use crate::core_modules::error::{WarpError, WarpResult};
use crate::core_modules::grid::{BinaryMask, DistanceField, Grid};

/// A source coordinate inside the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceIndex {
    pub x: u32,
    pub y: u32,
}

/// Per-pixel source coordinates for discrete resampling.
///
/// Every entry is guaranteed to lie within `[0, width) x [0, height)`; the check
/// happens once in [`IndexMap::new`], so lookups never need to re-validate.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMap {
    grid: Grid<SourceIndex>,
}

impl IndexMap {
    /// Validates that every entry is in bounds.
    pub fn new(grid: Grid<SourceIndex>) -> WarpResult<Self> {
        let (w, h) = (grid.width(), grid.height());
        if let Some(bad) = grid.iter().find(|i| i.x >= w || i.y >= h) {
            return Err(WarpError::invalid_image(format!(
                "index map entry ({}, {}) outside {w}x{h}",
                bad.x, bad.y
            )));
        }
        Ok(Self { grid })
    }

    /// The map where every pixel samples itself.
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            grid: Grid::from_fn(width, height, |x, y| SourceIndex { x, y }),
        }
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> SourceIndex {
        *self.grid.get(x, y)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceIndex> {
        self.grid.iter()
    }

    pub fn is_identity(&self) -> bool {
        let w = self.grid.width();
        self.grid.iter().enumerate().all(|(i, idx)| {
            idx.x == (i as u32 % w) && idx.y == (i as u32 / w)
        })
    }
}

/// Distance field and index map computed together from one mask.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTransform {
    pub distances: DistanceField,
    pub indices: IndexMap,
}

/// Sentinel for "no foreground seen in this column".
const NO_FEATURE: u32 = u32::MAX;

/// Computes the exact Euclidean feature transform of `mask`.
pub fn transform(mask: &BinaryMask) -> WarpResult<FeatureTransform> {
    let (width, height) = (mask.width(), mask.height());

    if mask.count_foreground() == 0 {
        return Ok(FeatureTransform {
            distances: Grid::filled(width, height, 0.0),
            indices: IndexMap::identity(width, height),
        });
    }

    let nearest_row = column_pass(mask);
    let (squared, nearest_col) = row_pass(&nearest_row, width, height);

    let distances = squared.map(|d2| (*d2 as f64).sqrt() as f32);
    let indices = Grid::from_fn(width, height, |x, y| {
        let q = *nearest_col.get(x, y);
        SourceIndex {
            x: q,
            y: *nearest_row.get(q, y),
        }
    });

    Ok(FeatureTransform {
        distances,
        indices: IndexMap::new(indices)?,
    })
}

/// For each pixel, the row of the nearest foreground pixel in the same column
/// (`NO_FEATURE` if the column is empty).
fn column_pass(mask: &BinaryMask) -> Grid<u32> {
    let (width, height) = (mask.width(), mask.height());
    let mut nearest = Grid::filled(width, height, NO_FEATURE);

    for x in 0..width {
        // Forward: nearest foreground at or above.
        let mut last = NO_FEATURE;
        for y in 0..height {
            if *mask.get(x, y) {
                last = y;
            }
            nearest.set(x, y, last);
        }
        // Backward: nearest foreground at or below, replaces only if strictly closer.
        let mut next = NO_FEATURE;
        for y in (0..height).rev() {
            if *mask.get(x, y) {
                next = y;
            }
            if next == NO_FEATURE {
                continue;
            }
            let current = *nearest.get(x, y);
            if current == NO_FEATURE || next - y < y - current {
                nearest.set(x, y, next);
            }
        }
    }
    nearest
}

/// Lower-envelope pass along rows. Returns squared distances and, per pixel, the
/// column whose vertical feature wins.
fn row_pass(nearest_row: &Grid<u32>, width: u32, height: u32) -> (Grid<u64>, Grid<u32>) {
    let w = width as usize;
    let mut squared = Grid::filled(width, height, 0u64);
    let mut winner = Grid::filled(width, height, 0u32);

    // Scratch buffers reused for every row.
    let mut g = vec![None::<i64>; w];
    let mut vertices = vec![0usize; w];
    let mut bounds = vec![0f64; w + 1];

    for y in 0..height {
        for (x, slot) in g.iter_mut().enumerate() {
            let row = *nearest_row.get(x as u32, y);
            *slot = (row != NO_FEATURE).then(|| (row as i64 - y as i64).pow(2));
        }

        let mut k = 0usize;
        let mut started = false;
        for q in 0..w {
            let Some(fq) = g[q] else { continue };
            if !started {
                vertices[0] = q;
                bounds[0] = f64::NEG_INFINITY;
                bounds[1] = f64::INFINITY;
                started = true;
                continue;
            }
            loop {
                let v = vertices[k];
                let s = intersection(q, fq, v, g[v].unwrap_or(0));
                // bounds[0] is -inf, so the envelope never pops below its first vertex.
                if k > 0 && s <= bounds[k] {
                    k -= 1;
                    continue;
                }
                k += 1;
                vertices[k] = q;
                bounds[k] = s;
                bounds[k + 1] = f64::INFINITY;
                break;
            }
        }

        // Every row has at least one populated column because the mask has
        // foreground and the column pass propagates it down the whole column.
        let mut segment = 0usize;
        for x in 0..w {
            while bounds[segment + 1] < x as f64 {
                segment += 1;
            }
            let v = vertices[segment];
            let dx = x as i64 - v as i64;
            let d2 = (dx * dx) as u64 + g[v].unwrap_or(0) as u64;
            squared.set(x as u32, y, d2);
            winner.set(x as u32, y, v as u32);
        }
    }

    (squared, winner)
}

/// Horizontal position where parabola rooted at `q` overtakes the one rooted at `v`.
#[inline]
fn intersection(q: usize, fq: i64, v: usize, fv: i64) -> f64 {
    let (q, v) = (q as i64, v as i64);
    ((fq + q * q) - (fv + v * v)) as f64 / (2 * (q - v)) as f64
}
