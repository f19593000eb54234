// THEORY:
// `Grid` is the shared container behind every intermediate structure of the warp
// engine: luminance maps, binary masks, distance fields and index maps. Each is a
// width x height lattice with one value per pixel, so they all use the same flat,
// row-major layout that the raster uses, and every derived grid carries its own
// dimensions.
//
// Key principles:
// 1.  **Flat Storage**: One `Vec<T>` indexed by `y * width + x`. No nested vectors.
// 2.  **Transient**: Grids are created per warp call and dropped once the output
//     raster exists. Nothing here is cached across calls.

/// A width x height lattice of values stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// Scalar brightness per pixel.
pub type LuminanceMap = Grid<f64>;
/// Foreground (`true`) / background (`false`) classification per pixel.
pub type BinaryMask = Grid<bool>;
/// Euclidean distance per pixel to the nearest foreground pixel.
pub type DistanceField = Grid<f32>;

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }
}

impl<T> Grid<T> {
    /// Builds a grid by evaluating `f(x, y)` for every cell in row-major order.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Wraps an existing row-major buffer. Returns `None` if the length does not
    /// match the dimensions.
    pub fn from_vec(width: u32, height: u32, cells: Vec<T>) -> Option<Self> {
        if cells.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> &T {
        &self.cells[self.index_of(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let i = self.index_of(x, y);
        self.cells[i] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    /// Applies `f` to every cell, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl Grid<bool> {
    /// True when every cell holds the same value (or the grid is empty).
    pub fn is_uniform(&self) -> bool {
        match self.cells.first() {
            Some(first) => self.cells.iter().all(|c| c == first),
            None => true,
        }
    }

    /// Number of foreground cells.
    pub fn count_foreground(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}
