use piv_tracker_core::{GrayImageView, PixelPoint};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::correlation::zncc_surface;
use crate::error::{ConfigError, MatchError};
use crate::params::DetectorParams;
use crate::peak::{refine_peak, RefinedPeak};
use crate::types::{Displacement, PatternMatch};
use crate::window::{extract_window, WindowExtent};

/// Finds where the pattern around a point of frame A moved to in frame B.
///
/// Holds only immutable configuration, so one detector can serve any number
/// of frame pairs and threads.
#[derive(Clone, Debug)]
pub struct PatternDetector {
    params: DetectorParams,
    pattern_extent: WindowExtent,
    search_extent: WindowExtent,
}

impl PatternDetector {
    pub fn new(params: DetectorParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let pattern_extent = WindowExtent::pattern(params.pattern_size);
        let search_extent =
            WindowExtent::search(params.pattern_size, params.dy_range, params.dx_range);
        Ok(Self {
            params,
            pattern_extent,
            search_extent,
        })
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Matched point in frame B, or `None` when there is no trustworthy match.
    pub fn detect(
        &self,
        frame_a: &GrayImageView<'_>,
        frame_b: &GrayImageView<'_>,
        point: PixelPoint,
    ) -> Option<PixelPoint> {
        match self.match_point(frame_a, frame_b, point) {
            Ok(m) => m.target(),
            Err(reason) => {
                log::debug!("no match for ({}, {}): {reason}", point.x, point.y);
                None
            }
        }
    }

    /// Like [`detect`](Self::detect) but keeps the score and rejection reason.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame_a, frame_b), fields(x = point.x, y = point.y))
    )]
    pub fn match_point(
        &self,
        frame_a: &GrayImageView<'_>,
        frame_b: &GrayImageView<'_>,
        point: PixelPoint,
    ) -> Result<PatternMatch, MatchError> {
        let pattern = extract_window(frame_a, point, self.pattern_extent)?;
        let search = extract_window(frame_b, point, self.search_extent)?;

        let surface = zncc_surface(&search.view(), &pattern.view())?;
        let peak = refine_peak(&surface, self.params.min_correlation)?;
        let displacement = self.peak_to_displacement(&peak);
        if !displacement.is_finite() {
            return Err(MatchError::DegeneratePeak);
        }

        Ok(PatternMatch {
            origin: point,
            displacement,
            peak,
        })
    }

    /// Detect every point independently. Output order follows `points`.
    pub fn detect_many(
        &self,
        frame_a: &GrayImageView<'_>,
        frame_b: &GrayImageView<'_>,
        points: &[PixelPoint],
    ) -> Vec<Option<PixelPoint>> {
        #[cfg(feature = "rayon")]
        {
            points
                .par_iter()
                .map(|&p| self.detect(frame_a, frame_b, p))
                .collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            points
                .iter()
                .map(|&p| self.detect(frame_a, frame_b, p))
                .collect()
        }
    }

    /// Map a refined surface peak to the motion of the pattern center.
    ///
    /// Surface cell `(i, j)` places the template's top-left corner there, so
    /// its center sits `half` pixels further into the search window. The
    /// search window starts `half - range.min` pixels before the point.
    pub fn peak_to_displacement(&self, peak: &RefinedPeak) -> Displacement {
        let size = self.params.pattern_size;
        let (hh, hw) = (size.half_height() as f64, size.half_width() as f64);
        let center_row = peak.row + hh;
        let center_col = peak.col + hw;
        Displacement {
            dy: center_row - hh + self.params.dy_range.min as f64,
            dx: center_col - hw + self.params.dx_range.min as f64,
        }
    }
}
