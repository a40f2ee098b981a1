//! Core types for PIV-style point tracking.
//!
//! This crate is intentionally small. It holds the single-channel intensity
//! image types consumed by the matcher, the pixel point alias and the logger.
//! It does *not* decode images or video; callers hand in grayscale samples.

mod image;
mod logger;

pub use image::{luma_bt601, GrayImage, GrayImageView, ImageError};

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, TraceFormat, TryInitError};

pub use logger::{init_with_level, TARGET_PREFIX};

/// Integer pixel coordinate: `x` is the column, `y` is the row.
pub type PixelPoint = nalgebra::Point2<i32>;
