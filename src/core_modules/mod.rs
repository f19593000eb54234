pub mod blob_detector;
pub mod continuous_resample;
pub mod discrete_remap;
pub mod distance_field;
pub mod error;
pub mod grid;
pub mod luminance;
pub mod mask;
pub mod morphology;
pub mod raster;
pub mod utils;
