// THEORY:
// This file is the main entry point for the `pixel_warp` library crate.
// It defines the public API that external consumers (the `pixel_warp` binary,
// batch tooling, or any other glitch front end) build on.
//
// The primary goal is to export the `WarpEngine` and its configuration types
// (`WarpConfig`, `Strategy`) as the clean, high-level interface for the whole
// deformation stack. The individual stages live in `core_modules` and are public
// so that callers can inspect intermediate grids (masks, distance fields) when
// they need to, but nothing outside `pipeline` is required to warp an image.

pub mod batch_pipeline;
pub mod core_modules;
pub mod pipeline;

pub use core_modules::error::{WarpError, WarpResult};
pub use core_modules::raster::Raster;
pub use pipeline::{Strategy, WarpConfig, WarpEngine};
