//! Error taxonomy of the warp engine.
//!
//! Only two conditions are ever raised. Degenerate inputs (uniform masks,
//! all-zero distance fields, 1x1 images) are defined identity cases and never
//! surface here.

use thiserror::Error;

/// Errors returned by [`crate::WarpEngine::warp`] and the stages it drives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WarpError {
    /// The raster is malformed: unsupported channel count, zero dimension, or a
    /// buffer whose length does not match `width * height * channels`.
    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    /// The continuous strategy was requested but its dense-array backend is not
    /// present in this build or was disabled on the engine.
    #[error("continuous resampling backend `{backend}` is unavailable")]
    BackendUnavailable { backend: &'static str },
}

impl WarpError {
    pub(crate) fn invalid_image(reason: impl Into<String>) -> Self {
        WarpError::InvalidImage {
            reason: reason.into(),
        }
    }
}

/// Result type for warp operations.
pub type WarpResult<T> = Result<T, WarpError>;
