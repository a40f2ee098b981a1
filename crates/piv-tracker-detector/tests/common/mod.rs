#![allow(dead_code)]

use piv_tracker_core::GrayImage;

pub const WIDTH: usize = 120;
pub const HEIGHT: usize = 100;

/// Gaussian intensity bump of height 200.
pub fn blob(r: f64, c: f64, cy: f64, cx: f64, sigma: f64) -> f64 {
    let (dy, dx) = (r - cy, c - cx);
    200.0 * (-(dy * dy + dx * dx) / (2.0 * sigma * sigma)).exp()
}

/// Scene of particles at `centers` (row, col), translated by `(shift_y, shift_x)`.
pub fn particles(centers: &[(f64, f64)], shift_y: f64, shift_x: f64) -> GrayImage {
    GrayImage::from_fn(WIDTH, HEIGHT, |r, c| {
        let (y, x) = (r as f64 - shift_y, c as f64 - shift_x);
        let value = 20.0
            + 0.3 * x
            + 0.2 * y
            + centers
                .iter()
                .map(|&(cy, cx)| blob(y, x, cy, cx, 3.5))
                .sum::<f64>();
        value as f32
    })
}

/// Non-periodic smooth texture, translated by `(shift_y, shift_x)`.
pub fn texture(shift_y: f64, shift_x: f64) -> GrayImage {
    GrayImage::from_fn(WIDTH, HEIGHT, |r, c| {
        let (y, x) = (r as f64 - shift_y, c as f64 - shift_x);
        let v = 110.0
            + 45.0 * (0.37 * y).sin()
            + 35.0 * (0.23 * x + 0.11 * y).cos()
            + 25.0 * (0.051 * x * y / 7.0).sin();
        v as f32
    })
}

/// Deterministic uniform noise in `[0, 255)`.
pub fn noise(seed: u64) -> GrayImage {
    let mut state = seed.max(1);
    GrayImage::from_fn(WIDTH, HEIGHT, |_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 255) as f32
    })
}
