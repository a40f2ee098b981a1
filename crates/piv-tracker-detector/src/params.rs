use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Template window size in pixels. Both dimensions must be odd.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSize {
    pub height: usize,
    pub width: usize,
}

impl PatternSize {
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Rows above (and below) the center pixel: `(height - 1) / 2`.
    #[inline]
    pub fn half_height(&self) -> usize {
        self.height.saturating_sub(1) / 2
    }

    /// Columns left (and right) of the center pixel: `(width - 1) / 2`.
    #[inline]
    pub fn half_width(&self) -> usize {
        self.width.saturating_sub(1) / 2
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.height * self.width
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PatternSize {
    fn default() -> Self {
        Self::new(25, 25)
    }
}

/// Signed offset bounds (inclusive) on one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRange {
    pub min: i32,
    pub max: i32,
}

impl SearchRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Symmetric range `[-radius, radius]`.
    pub const fn symmetric(radius: i32) -> Self {
        Self::new(-radius, radius)
    }

    /// Number of candidate offsets on this axis.
    #[inline]
    pub fn candidates(&self) -> usize {
        (self.max as i64 - self.min as i64 + 1).max(0) as usize
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                axis,
                min: self.min,
                max: self.max,
            });
        }
        // The surface needs an interior cell for border rejection and the
        // three-point fit.
        if self.candidates() < 3 {
            return Err(ConfigError::RangeTooNarrow {
                axis,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for SearchRange {
    fn default() -> Self {
        Self::symmetric(5)
    }
}

/// Per-detector configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub pattern_size: PatternSize,
    /// Vertical offsets searched, relative to the pattern center.
    pub dy_range: SearchRange,
    /// Horizontal offsets searched, relative to the pattern center.
    pub dx_range: SearchRange,
    /// Correlation peaks below this value are rejected as weak matches.
    pub min_correlation: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            pattern_size: PatternSize::default(),
            dy_range: SearchRange::default(),
            dx_range: SearchRange::default(),
            min_correlation: 0.5,
        }
    }
}

impl DetectorParams {
    pub fn with_pattern_size(mut self, height: usize, width: usize) -> Self {
        self.pattern_size = PatternSize::new(height, width);
        self
    }

    pub fn with_ranges(mut self, dy_range: SearchRange, dx_range: SearchRange) -> Self {
        self.dy_range = dy_range;
        self.dx_range = dx_range;
        self
    }

    pub fn with_min_correlation(mut self, min_correlation: f64) -> Self {
        self.min_correlation = min_correlation;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let PatternSize { height, width } = self.pattern_size;
        if height % 2 == 0 || width % 2 == 0 {
            return Err(ConfigError::EvenPatternSize { height, width });
        }
        self.dy_range.validate("vertical")?;
        self.dx_range.validate("horizontal")?;
        if !self.min_correlation.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.min_correlation));
        }
        Ok(())
    }
}
