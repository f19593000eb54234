// THEORY (Discrete Remapper):
// Strategy A. Every output pixel is a verbatim copy of the source pixel named by
// the index map. Because background pixels all point at the foreground edge
// nearest to them, long runs of output pixels repeat the same few source pixels,
// which gives the chunky, plateaued look of this strategy.
//
// Whole pixels are copied: all channels of an output pixel come from the same
// source pixel, so local color stays coherent and there is no channel split.

use crate::core_modules::distance_field::IndexMap;
use crate::core_modules::error::{WarpError, WarpResult};
use crate::core_modules::raster::Raster;

/// Resamples `source` through `indices` with nearest-pixel semantics.
pub fn remap(source: &Raster, indices: &IndexMap) -> WarpResult<Raster> {
    if indices.width() != source.width() || indices.height() != source.height() {
        return Err(WarpError::invalid_image(format!(
            "index map {}x{} does not match raster {}x{}",
            indices.width(),
            indices.height(),
            source.width(),
            source.height()
        )));
    }

    let mut data = Vec::with_capacity(source.as_bytes().len());
    for index in indices.iter() {
        data.extend_from_slice(source.pixel(index.x, index.y));
    }

    Raster::new(source.width(), source.height(), source.channels(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::distance_field::SourceIndex;
    use crate::core_modules::grid::Grid;

    #[test]
    fn identity_map_copies_source() {
        let data: Vec<u8> = (0..27).collect();
        let raster = Raster::new(3, 3, 3, data).unwrap();
        let out = remap(&raster, &IndexMap::identity(3, 3)).unwrap();
        assert_eq!(out, raster);
    }

    #[test]
    fn copies_whole_pixels() {
        let raster = Raster::new(2, 1, 4, vec![1, 2, 3, 4, 9, 8, 7, 6]).unwrap();
        let map = IndexMap::new(Grid::filled(2, 1, SourceIndex { x: 1, y: 0 })).unwrap();
        let out = remap(&raster, &map).unwrap();
        assert_eq!(out.as_bytes(), &[9, 8, 7, 6, 9, 8, 7, 6]);
    }

    #[test]
    fn rejects_mismatched_map() {
        let raster = Raster::new(2, 2, 1, vec![0; 4]).unwrap();
        assert!(remap(&raster, &IndexMap::identity(3, 2)).is_err());
    }
}
