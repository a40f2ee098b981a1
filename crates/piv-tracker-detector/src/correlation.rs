//! Zero-mean normalized cross-correlation (ZNCC) surface.
//!
//! The template is normalized once to zero mean and unit energy. The search
//! window statistics under every template footprint come from summed-area
//! tables, and the raw dot product is a direct (non-flipped) correlation.
//! For template `T` with `N` samples and window `I`:
//!
//! `C_norm = (Σ I·T − μ_I·Σ T) / sqrt(Σ I² − N·μ_I²)`
//!
//! `Σ T` is kept even though it is zero up to rounding.
//!
//! A template or window whose centered energy is at most
//! [`FLAT_ENERGY_PER_SAMPLE`] per sample is flat: it scores NaN.

use piv_tracker_core::GrayImageView;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::MatchError;

/// Centered energy per sample (`Σ (v − μ)² / N`) at or below which a
/// template or window counts as flat.
pub const FLAT_ENERGY_PER_SAMPLE: f64 = 1e-5;

#[inline]
fn is_flat(energy: f64, n: f64) -> bool {
    !energy.is_finite() || energy <= FLAT_ENERGY_PER_SAMPLE * n
}

/// Correlation scores for every valid template placement, row-major.
///
/// Cell `(i, j)` scores the template with its top-left corner at search
/// window row `i`, column `j`. Cells may be non-finite where the window is
/// flat.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationSurface {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl CorrelationSurface {
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    #[inline]
    pub fn is_border(&self, row: usize, col: usize) -> bool {
        row == 0 || col == 0 || row + 1 >= self.rows || col + 1 >= self.cols
    }
}

/// Template normalized to zero mean and unit energy.
#[derive(Clone, Debug)]
pub struct NormalizedTemplate {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
    /// Sum of the normalized samples.
    pub sum: f64,
}

impl NormalizedTemplate {
    /// A flat template has no usable energy; its samples become NaN.
    pub fn new(template: &GrayImageView<'_>) -> Self {
        let n = template.data.len() as f64;
        let mean = template.data.iter().map(|&v| v as f64).sum::<f64>() / n;
        let centered: Vec<f64> = template.data.iter().map(|&v| v as f64 - mean).collect();
        let energy = centered.iter().map(|v| v * v).sum::<f64>();
        let norm = if is_flat(energy, n) {
            f64::NAN
        } else {
            energy.sqrt()
        };
        let data: Vec<f64> = centered.into_iter().map(|v| v / norm).collect();
        let sum = data.iter().sum();
        Self {
            rows: template.height,
            cols: template.width,
            data,
            sum,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Summed-area table with a zero top row and left column.
struct Integral {
    stride: usize,
    data: Vec<f64>,
}

impl Integral {
    fn build(image: &GrayImageView<'_>, f: impl Fn(f64) -> f64) -> Self {
        let stride = image.width + 1;
        let mut data = vec![0.0; stride * (image.height + 1)];
        for r in 0..image.height {
            let mut row_sum = 0.0;
            for c in 0..image.width {
                row_sum += f(image.data[r * image.width + c] as f64);
                data[(r + 1) * stride + c + 1] = data[r * stride + c + 1] + row_sum;
            }
        }
        Self { stride, data }
    }

    /// Sum over rows `r..r + h`, cols `c..c + w`.
    #[inline]
    fn box_sum(&self, r: usize, c: usize, h: usize, w: usize) -> f64 {
        let s = self.stride;
        self.data[(r + h) * s + c + w] - self.data[r * s + c + w] - self.data[(r + h) * s + c]
            + self.data[r * s + c]
    }
}

/// Compute the valid-mode ZNCC surface of `template` over `search`.
///
/// The surface has shape `search - template + 1` per axis.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "trace",
        skip(search, template),
        fields(
            search_rows = search.height,
            search_cols = search.width,
            template_rows = template.height,
            template_cols = template.width
        )
    )
)]
pub fn zncc_surface(
    search: &GrayImageView<'_>,
    template: &GrayImageView<'_>,
) -> Result<CorrelationSurface, MatchError> {
    if template.width == 0
        || template.height == 0
        || template.width > search.width
        || template.height > search.height
    {
        return Err(MatchError::TemplateLargerThanSearch {
            template_rows: template.height,
            template_cols: template.width,
            search_rows: search.height,
            search_cols: search.width,
        });
    }

    let tpl = NormalizedTemplate::new(template);
    Ok(zncc_with_template(search, &tpl))
}

/// Same as [`zncc_surface`] with a template that is already normalized.
///
/// The caller guarantees the template fits inside `search`.
pub fn zncc_with_template(
    search: &GrayImageView<'_>,
    tpl: &NormalizedTemplate,
) -> CorrelationSurface {
    let (h, w) = (tpl.rows, tpl.cols);
    let n = tpl.len() as f64;
    let rows = search.height + 1 - h;
    let cols = search.width + 1 - w;

    let sums = Integral::build(search, |v| v);
    let squares = Integral::build(search, |v| v * v);

    let mut data = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            let mut cc = 0.0;
            for a in 0..h {
                let img_row = &search.data[(i + a) * search.width + j..][..w];
                let tpl_row = &tpl.data[a * w..(a + 1) * w];
                cc += img_row
                    .iter()
                    .zip(tpl_row)
                    .map(|(&v, &t)| v as f64 * t)
                    .sum::<f64>();
            }

            let mean = sums.box_sum(i, j, h, w) / n;
            let sq_sum = squares.box_sum(i, j, h, w);
            let energy = sq_sum - n * mean * mean;
            if is_flat(energy, n) {
                data.push(f64::NAN);
            } else {
                data.push((cc - mean * tpl.sum) / energy.sqrt());
            }
        }
    }

    log::trace!("zncc surface {rows}x{cols} for template {h}x{w}");
    CorrelationSurface { rows, cols, data }
}
