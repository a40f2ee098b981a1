//! Axis-aligned window cropping around a center point.

use piv_tracker_core::{GrayImage, GrayImageView, PixelPoint};

use crate::error::MatchError;
use crate::params::{PatternSize, SearchRange};

/// Pixels covered on each side of the center pixel (the center itself is
/// always included). Negative values shrink the window past the center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowExtent {
    pub up: i64,
    pub down: i64,
    pub left: i64,
    pub right: i64,
}

/// Rectangle in source image coordinates. `row0`/`col0` may be negative
/// before bounds checking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowRect {
    pub row0: i64,
    pub col0: i64,
    pub rows: usize,
    pub cols: usize,
}

impl WindowExtent {
    /// Template window: `half` pixels on every side.
    pub fn pattern(size: PatternSize) -> Self {
        let hh = size.half_height() as i64;
        let hw = size.half_width() as i64;
        Self {
            up: hh,
            down: hh,
            left: hw,
            right: hw,
        }
    }

    /// Search window: the template window grown by the search range on each
    /// side, independently per direction.
    pub fn search(size: PatternSize, dy_range: SearchRange, dx_range: SearchRange) -> Self {
        let hh = size.half_height() as i64;
        let hw = size.half_width() as i64;
        Self {
            up: hh - dy_range.min as i64,
            down: hh + dy_range.max as i64,
            left: hw - dx_range.min as i64,
            right: hw + dx_range.max as i64,
        }
    }

    pub fn rect_at(&self, center: PixelPoint) -> WindowRect {
        let rows = (self.up + self.down + 1).max(0) as usize;
        let cols = (self.left + self.right + 1).max(0) as usize;
        WindowRect {
            row0: center.y as i64 - self.up,
            col0: center.x as i64 - self.left,
            rows,
            cols,
        }
    }
}

impl WindowRect {
    /// True when the rectangle lies fully inside a `width` x `height` image.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.row0 >= 0
            && self.col0 >= 0
            && self.row0 + self.rows as i64 <= height as i64
            && self.col0 + self.cols as i64 <= width as i64
    }
}

/// Crop the window of `extent` around `center` out of `image`.
///
/// No padding: any part of the window outside the image is an
/// `OutOfBounds` error.
pub fn extract_window(
    image: &GrayImageView<'_>,
    center: PixelPoint,
    extent: WindowExtent,
) -> Result<GrayImage, MatchError> {
    let rect = extent.rect_at(center);
    crop(image, rect)
}

pub(crate) fn crop(image: &GrayImageView<'_>, rect: WindowRect) -> Result<GrayImage, MatchError> {
    if !rect.fits(image.width, image.height) {
        return Err(MatchError::OutOfBounds {
            row0: rect.row0,
            col0: rect.col0,
            rows: rect.rows,
            cols: rect.cols,
            width: image.width,
            height: image.height,
        });
    }

    let row0 = rect.row0 as usize;
    let col0 = rect.col0 as usize;
    let mut data = Vec::with_capacity(rect.rows * rect.cols);
    for r in row0..row0 + rect.rows {
        let start = r * image.width + col0;
        data.extend_from_slice(&image.data[start..start + rect.cols]);
    }

    Ok(GrayImage {
        width: rect.cols,
        height: rect.rows,
        data,
    })
}
