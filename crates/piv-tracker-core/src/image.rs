/// Errors produced when building images from raw buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image buffer length (expected {expected} samples, got {got})")]
    BufferSize { expected: usize, got: usize },
    #[error("invalid image dimensions (width={width}, height={height})")]
    Dimensions { width: usize, height: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [f32], // row-major, len = w*h
}

/// Owned single-channel intensity image.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

fn checked_len(width: usize, height: usize) -> Result<usize, ImageError> {
    width
        .checked_mul(height)
        .ok_or(ImageError::Dimensions { width, height })
}

/// ITU-R BT.601 luma of an RGB triple.
#[inline]
pub fn luma_bt601(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

impl GrayImage {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, ImageError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Image filled with a constant value.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build an image by evaluating `f(row, col)` at every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Convert 8-bit luma samples.
    pub fn from_u8(width: usize, height: usize, pixels: &[u8]) -> Result<Self, ImageError> {
        let expected = checked_len(width, height)?;
        if pixels.len() != expected {
            return Err(ImageError::BufferSize {
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data: pixels.iter().map(|&p| p as f32).collect(),
        })
    }

    /// Convert interleaved 8-bit RGB samples to luma.
    pub fn from_rgb8(width: usize, height: usize, pixels: &[u8]) -> Result<Self, ImageError> {
        let expected = checked_len(width, height)?
            .checked_mul(3)
            .ok_or(ImageError::Dimensions { width, height })?;
        if pixels.len() != expected {
            return Err(ImageError::BufferSize {
                expected,
                got: pixels.len(),
            });
        }
        let data = pixels
            .chunks_exact(3)
            .map(|px| luma_bt601(px[0], px[1], px[2]))
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.view().get(row, col)
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl<'a> GrayImageView<'a> {
    pub fn from_slice(width: usize, height: usize, data: &'a [f32]) -> Result<Self, ImageError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Row `row` as a slice, or `None` past the last row.
    #[inline]
    pub fn row(&self, row: usize) -> Option<&'a [f32]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.width;
        self.data.get(start..start + self.width)
    }

    pub fn to_image(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self.data.to_vec(),
        }
    }
}
