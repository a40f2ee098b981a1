use piv_tracker_core::PixelPoint;
use serde::{Deserialize, Serialize};

use crate::peak::RefinedPeak;

/// Sub-pixel motion of a point between two frames, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    pub dy: f64,
    pub dx: f64,
}

impl Displacement {
    pub const fn new(dy: f64, dx: f64) -> Self {
        Self { dy, dx }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.dy.is_finite() && self.dx.is_finite()
    }

    /// `point + (dx, dy)` rounded to the nearest pixel, or `None` if either
    /// component is non-finite.
    pub fn apply(&self, point: PixelPoint) -> Option<PixelPoint> {
        if !self.is_finite() {
            return None;
        }
        let x = (point.x as f64 + self.dx).round() as i32;
        let y = (point.y as f64 + self.dy).round() as i32;
        Some(PixelPoint::new(x, y))
    }
}

/// Accepted match of one point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// Pattern center in the reference frame.
    pub origin: PixelPoint,
    pub displacement: Displacement,
    /// Refined peak in correlation-surface coordinates.
    pub peak: RefinedPeak,
}

impl PatternMatch {
    /// Correlation score at the integer peak.
    #[inline]
    pub fn score(&self) -> f64 {
        self.peak.peak.score
    }

    /// Matched point in the target frame.
    pub fn target(&self) -> Option<PixelPoint> {
        self.displacement.apply(self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_rounds_to_nearest() {
        let p = PixelPoint::new(10, 20);
        assert_eq!(
            Displacement::new(-0.4, 2.6).apply(p),
            Some(PixelPoint::new(13, 20))
        );
        assert_eq!(
            Displacement::new(1.5, -1.5).apply(p),
            Some(PixelPoint::new(9, 22))
        );
    }

    #[test]
    fn non_finite_displacement_has_no_target() {
        let p = PixelPoint::new(1, 1);
        assert_eq!(Displacement::new(f64::NAN, 0.0).apply(p), None);
        assert_eq!(Displacement::new(0.0, f64::INFINITY).apply(p), None);
    }
}
