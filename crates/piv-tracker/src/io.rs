//! Image-file input via the `image` crate.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use piv_tracker_core::{luma_bt601, GrayImage};
use piv_tracker_detector::{FrameSource, FramesError};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame sequence is empty")]
    EmptySequence,
    #[error(transparent)]
    Frames(#[from] FramesError),
}

/// Convert an 8-bit luma buffer.
pub fn gray_from_luma8(img: &image::GrayImage) -> GrayImage {
    GrayImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().iter().map(|&p| p as f32).collect(),
    }
}

/// Convert any decoded image to intensity.
///
/// 8-bit luma is taken as is, 16-bit luma is rescaled to `0..=255`, color is
/// reduced with BT.601 weights and alpha is ignored.
pub fn gray_from_dynamic(img: &DynamicImage) -> GrayImage {
    match img {
        DynamicImage::ImageLuma8(gray) => gray_from_luma8(gray),
        DynamicImage::ImageLuma16(gray) => GrayImage {
            width: gray.width() as usize,
            height: gray.height() as usize,
            data: gray.as_raw().iter().map(|&p| p as f32 / 257.0).collect(),
        },
        other => {
            let rgb = other.to_rgb8();
            GrayImage {
                width: rgb.width() as usize,
                height: rgb.height() as usize,
                data: rgb
                    .pixels()
                    .map(|px| luma_bt601(px[0], px[1], px[2]))
                    .collect(),
            }
        }
    }
}

/// Decode an image file into a grayscale frame.
pub fn load_gray(path: impl AsRef<Path>) -> Result<GrayImage, IoError> {
    let path = path.as_ref();
    let reader = ImageReader::open(path).map_err(|source| IoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| IoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(gray_from_dynamic(&decoded))
}

/// One image file per frame, decoded on demand.
#[derive(Clone, Debug)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    fps: f64,
    size: (usize, usize),
}

impl ImageSequence {
    /// The frame size is read from the first file's header.
    pub fn new(paths: Vec<PathBuf>, fps: f64) -> Result<Self, IoError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(FramesError::InvalidFps(fps).into());
        }
        let first = paths.first().ok_or(IoError::EmptySequence)?;
        let (w, h) = image::image_dimensions(first).map_err(|source| IoError::Decode {
            path: first.clone(),
            source,
        })?;
        Ok(Self {
            paths,
            fps,
            size: (w as usize, h as usize),
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSource for ImageSequence {
    fn frame_size(&self) -> (usize, usize) {
        self.size
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn frame(&self, index: usize) -> Option<Cow<'_, GrayImage>> {
        let path = self.paths.get(index)?;
        match load_gray(path) {
            Ok(img) => Some(Cow::Owned(img)),
            Err(err) => {
                log::warn!("frame {index}: {err}");
                None
            }
        }
    }
}
