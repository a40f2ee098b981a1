//! Frame supply for trajectory tracking.
//!
//! Decoding is the caller's job; a source only hands out grayscale frames of
//! one fixed size, by index or by timestamp.

use std::borrow::Cow;

use piv_tracker_core::GrayImage;

/// Random-access sequence of equally sized grayscale frames.
pub trait FrameSource {
    /// `(width, height)` shared by every frame.
    fn frame_size(&self) -> (usize, usize);

    /// Frames per second used to map timestamps to indices.
    fn fps(&self) -> f64;

    fn frame_count(&self) -> usize;

    /// Frame `index`, or `None` if it cannot be produced.
    fn frame(&self, index: usize) -> Option<Cow<'_, GrayImage>>;

    /// Index of the frame shown at `seconds`.
    fn index_at_time(&self, seconds: f64) -> Option<usize> {
        let idx = (seconds * self.fps()).round();
        if !idx.is_finite() || idx < 0.0 {
            return None;
        }
        let idx = idx as usize;
        (idx < self.frame_count()).then_some(idx)
    }

    /// Frame shown at `seconds`, or `None` past either end.
    fn frame_at_time(&self, seconds: f64) -> Option<Cow<'_, GrayImage>> {
        self.frame(self.index_at_time(seconds)?)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FramesError {
    #[error("frame {index} is {got_width}x{got_height}, expected {width}x{height}")]
    SizeMismatch {
        index: usize,
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },
    #[error("fps must be positive and finite (got {0})")]
    InvalidFps(f64),
}

/// Frames held in memory.
#[derive(Clone, Debug)]
pub struct InMemoryFrames {
    frames: Vec<GrayImage>,
    fps: f64,
}

impl InMemoryFrames {
    pub fn new(frames: Vec<GrayImage>, fps: f64) -> Result<Self, FramesError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(FramesError::InvalidFps(fps));
        }
        if let Some(first) = frames.first() {
            let (width, height) = first.dimensions();
            for (index, f) in frames.iter().enumerate() {
                if f.dimensions() != (width, height) {
                    return Err(FramesError::SizeMismatch {
                        index,
                        width,
                        height,
                        got_width: f.width,
                        got_height: f.height,
                    });
                }
            }
        }
        Ok(Self { frames, fps })
    }

    pub fn frames(&self) -> &[GrayImage] {
        &self.frames
    }
}

impl FrameSource for InMemoryFrames {
    fn frame_size(&self) -> (usize, usize) {
        self.frames.first().map_or((0, 0), GrayImage::dimensions)
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, index: usize) -> Option<Cow<'_, GrayImage>> {
        self.frames.get(index).map(Cow::Borrowed)
    }
}
