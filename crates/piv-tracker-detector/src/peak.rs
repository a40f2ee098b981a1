//! Peak selection and three-point Gaussian sub-pixel refinement.

use serde::{Deserialize, Serialize};

use crate::correlation::CorrelationSurface;
use crate::error::MatchError;

/// Integer surface maximum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub row: usize,
    pub col: usize,
    pub score: f64,
}

/// Peak with sub-pixel surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefinedPeak {
    pub peak: Peak,
    pub row: f64,
    pub col: f64,
}

/// Global maximum over the finite cells of `surface`.
///
/// Ties keep the first cell in row-major order.
pub fn locate_peak(surface: &CorrelationSurface) -> Option<Peak> {
    let mut best: Option<Peak> = None;
    for (idx, &score) in surface.data.iter().enumerate() {
        if !score.is_finite() {
            continue;
        }
        if best.is_none_or(|b| score > b.score) {
            best = Some(Peak {
                row: idx / surface.cols,
                col: idx % surface.cols,
                score,
            });
        }
    }
    best
}

/// Offset `δ` of a log-parabola through three equally spaced samples.
///
/// The refined position is `center_index - δ`. Returns `None` when any
/// sample is non-positive or the three log-values are collinear.
#[inline]
pub fn gaussian_offset(minus: f64, center: f64, plus: f64) -> Option<f64> {
    let (lm, lc, lp) = (minus.ln(), center.ln(), plus.ln());
    let delta = 0.5 * (lp - lm) / (lp - 2.0 * lc + lm);
    delta.is_finite().then_some(delta)
}

/// Validate the surface maximum and refine it to sub-pixel precision.
///
/// Rejections, in order: no finite cell, score below `threshold`, peak on the
/// surface border, degenerate neighborhood.
pub fn refine_peak(
    surface: &CorrelationSurface,
    threshold: f64,
) -> Result<RefinedPeak, MatchError> {
    let peak = locate_peak(surface).ok_or(MatchError::DegeneratePeak)?;
    if peak.score < threshold {
        return Err(MatchError::WeakMatch {
            score: peak.score,
            threshold,
        });
    }
    if surface.is_border(peak.row, peak.col) {
        return Err(MatchError::AmbiguousMatch {
            row: peak.row,
            col: peak.col,
        });
    }

    let (i, j) = (peak.row, peak.col);
    let at = |r: usize, c: usize| surface.get(r, c).ok_or(MatchError::DegeneratePeak);
    let (north, south) = (at(i - 1, j)?, at(i + 1, j)?);
    let (west, east) = (at(i, j - 1)?, at(i, j + 1)?);

    let di = gaussian_offset(north, peak.score, south).ok_or(MatchError::DegeneratePeak)?;
    let dj = gaussian_offset(west, peak.score, east).ok_or(MatchError::DegeneratePeak)?;

    Ok(RefinedPeak {
        peak,
        row: i as f64 - di,
        col: j as f64 - dj,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gaussian_surface(rows: usize, cols: usize, ci: f64, cj: f64, sigma: f64) -> CorrelationSurface {
        CorrelationSurface::from_fn(rows, cols, |i, j| {
            let (di, dj) = (i as f64 - ci, j as f64 - cj);
            0.95 * (-(di * di + dj * dj) / (2.0 * sigma * sigma)).exp()
        })
    }

    #[test]
    fn gaussian_offset_is_exact_for_gaussian_samples() {
        let f = |x: f64| (-(x - 0.3f64).powi(2) / 1.5).exp();
        let delta = gaussian_offset(f(-1.0), f(0.0), f(1.0)).expect("finite");
        assert_relative_eq!(0.0 - delta, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn gaussian_offset_rejects_collinear_and_non_positive() {
        assert_eq!(gaussian_offset(0.8, 0.8, 0.8), None);
        assert_eq!(gaussian_offset(0.0, 0.9, 0.5), None);
        assert_eq!(gaussian_offset(-0.2, 0.9, 0.5), None);
    }

    #[test]
    fn refines_gaussian_bump_exactly() {
        let surface = gaussian_surface(11, 11, 4.3, 6.75, 1.4);
        let refined = refine_peak(&surface, 0.5).expect("refined");
        assert_eq!((refined.peak.row, refined.peak.col), (4, 7));
        assert_relative_eq!(refined.row, 4.3, epsilon = 1e-9);
        assert_relative_eq!(refined.col, 6.75, epsilon = 1e-9);
    }

    #[test]
    fn locate_skips_non_finite_cells() {
        let mut surface = gaussian_surface(5, 5, 2.0, 2.0, 1.0);
        surface.data[0] = f64::NAN;
        surface.data[1] = f64::INFINITY;
        let peak = locate_peak(&surface).expect("peak");
        assert_eq!((peak.row, peak.col), (2, 2));

        let empty = CorrelationSurface::from_fn(3, 3, |_, _| f64::NAN);
        assert_eq!(locate_peak(&empty), None);
        assert_eq!(refine_peak(&empty, 0.5), Err(MatchError::DegeneratePeak));
    }

    #[test]
    fn ties_resolve_to_first_cell() {
        let surface = CorrelationSurface::from_fn(4, 4, |i, j| if i >= 1 && j >= 2 { 0.9 } else { 0.1 });
        let peak = locate_peak(&surface).expect("peak");
        assert_eq!((peak.row, peak.col), (1, 2));
    }

    #[test]
    fn weak_peak_is_rejected() {
        let surface = CorrelationSurface::from_fn(5, 5, |i, j| if (i, j) == (2, 2) { 0.49 } else { 0.1 });
        assert!(matches!(
            refine_peak(&surface, 0.5),
            Err(MatchError::WeakMatch { threshold, .. }) if threshold == 0.5
        ));
        assert!(refine_peak(&surface, 0.4).is_ok());
    }

    #[test]
    fn border_peak_is_rejected_regardless_of_score() {
        for (ci, cj) in [(0.0, 3.0), (6.0, 3.0), (3.0, 0.0), (3.0, 6.0)] {
            let surface = gaussian_surface(7, 7, ci, cj, 1.2);
            assert!(
                matches!(
                    refine_peak(&surface, 0.5),
                    Err(MatchError::AmbiguousMatch { .. })
                ),
                "peak at ({ci}, {cj}) was accepted"
            );
        }
    }

    #[test]
    fn non_positive_or_undefined_neighbor_is_degenerate() {
        let mut surface = CorrelationSurface::from_fn(5, 5, |i, j| if (i, j) == (2, 2) { 0.9 } else { 0.2 });
        surface.data[5 + 2] = 0.0;
        assert_eq!(refine_peak(&surface, 0.5), Err(MatchError::DegeneratePeak));

        surface.data[5 + 2] = 0.2;
        surface.data[2 * 5 + 3] = f64::NAN;
        assert_eq!(refine_peak(&surface, 0.5), Err(MatchError::DegeneratePeak));
    }
}
