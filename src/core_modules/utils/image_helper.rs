pub mod image_helper {
    use crate::core_modules::error::{WarpError, WarpResult};
    use crate::core_modules::raster::Raster;
    use image::error::{ParameterError, ParameterErrorKind};
    use image::{DynamicImage, GrayImage, ImageError, ImageFormat, RgbImage, RgbaImage};
    use std::path::{Path, PathBuf};

    /// Extension used when the input path has none.
    const DEFAULT_EXTENSION: &str = "png";

    /// Decodes the image at `path`.
    pub fn open(path: &Path) -> Result<DynamicImage, ImageError> {
        image::open(path)
    }

    /// Converts a decoded image into a raster the engine accepts.
    ///
    /// Gray, RGB and RGBA 8-bit images are taken as they are; every other layout is
    /// converted to RGBA when it carries alpha and to RGB otherwise.
    pub fn raster_from_image(image: DynamicImage) -> WarpResult<Raster> {
        let (width, height) = (image.width(), image.height());
        match image {
            DynamicImage::ImageLuma8(buf) => Raster::new(width, height, 1, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => Raster::new(width, height, 3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => Raster::new(width, height, 4, buf.into_raw()),
            other if other.color().has_alpha() => {
                Raster::new(width, height, 4, other.to_rgba8().into_raw())
            }
            other => Raster::new(width, height, 3, other.to_rgb8().into_raw()),
        }
    }

    /// Wraps a raster back into an `image` buffer without copying.
    pub fn raster_to_image(raster: Raster) -> WarpResult<DynamicImage> {
        let (width, height, channels) = (raster.width(), raster.height(), raster.channels());
        let data = raster.into_bytes();
        let image = match channels {
            1 => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
            _ => None,
        };
        image.ok_or_else(|| {
            WarpError::invalid_image(format!("cannot encode {channels}-channel raster"))
        })
    }

    /// Encodes `raster` to `path`, choosing the format from the extension.
    ///
    /// Alpha is dropped for formats that cannot store it (JPEG).
    pub fn save(path: &Path, raster: Raster) -> Result<(), ImageError> {
        let image = raster_to_image(raster).map_err(|_| {
            ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            ))
        })?;
        let image = match ImageFormat::from_path(path) {
            Ok(ImageFormat::Jpeg) if image.color().has_alpha() => {
                DynamicImage::ImageRgb8(image.to_rgb8())
            }
            _ => image,
        };
        image.save(path)
    }

    /// `<output_dir>/<stem>_<suffix>.<ext>`, keeping the input's extension.
    pub fn build_output_path(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("image"));
        let extension = input
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from(DEFAULT_EXTENSION));
        output_dir.join(format!("{stem}_{suffix}.{extension}"))
    }

    /// Splits a comma separated list of paths, trimming whitespace and quotes.
    pub fn parse_paths(raw: &str) -> Vec<PathBuf> {
        raw.split(',')
            .map(|part| part.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|part| !part.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}
