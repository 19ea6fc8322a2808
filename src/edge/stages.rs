//! Individual Canny stages.
//!
//! All stages except [`link_weak_edges`] are row-local and run through
//! [`fill_rows`], so the sequential and the rayon paths are bit-identical.

use crate::edge::{CannyThresholds, STRONG_EDGE, WEAK_EDGE};
use crate::image::{GrayImage, ImageView};
use crate::util::rows::fill_rows;
use std::f64::consts::PI;

const GAUSS_3X3: [[f64; 3]; 3] = [
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
    [2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
];

/// Gradient sample produced by the Sobel stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Gradient {
    /// `sqrt(gx^2 + gy^2)`.
    pub magnitude: f64,
    /// `atan2(gy, gx)` in radians.
    pub direction: f64,
}

/// Per-pixel gradients of a smoothed image.
#[derive(Clone, Debug)]
pub struct Gradients {
    width: usize,
    height: usize,
    samples: Vec<Gradient>,
}

impl Gradients {
    /// Returns the field width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the field height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the gradient at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Gradient> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y * self.width + x).copied()
    }

    fn magnitude_or_zero(&self, x: isize, y: isize) -> f64 {
        if x < 0 || y < 0 {
            return 0.0;
        }
        self.get(x as usize, y as usize)
            .map_or(0.0, |sample| sample.magnitude)
    }
}

/// Smooths interior pixels with the normalized 3x3 binomial kernel.
///
/// The outermost ring is never written and keeps the source value.
pub fn gaussian_smooth(src: ImageView<'_, u8>, parallel: bool) -> GrayImage {
    let width = src.width();
    let height = src.height();
    let mut out = vec![0u8; width * height];

    fill_rows(&mut out, width, parallel, |y, row| {
        let Some(src_row) = src.row(y) else {
            return;
        };
        row.copy_from_slice(src_row);
        if y == 0 || y + 1 >= height {
            return;
        }
        let lines = [src.row(y - 1), Some(src_row), src.row(y + 1)];
        for x in 1..width.saturating_sub(1) {
            let mut value = 0.0f64;
            for (line, weights) in lines.iter().zip(GAUSS_3X3.iter()) {
                let Some(line) = line else { continue };
                for (kx, weight) in weights.iter().enumerate() {
                    value += f64::from(line[x + kx - 1]) * weight;
                }
            }
            row[x] = value.clamp(0.0, 255.0) as u8;
        }
    });

    GrayImage::from_parts(out, width, height)
}

/// Computes Sobel gradients for every pixel, reading zero outside the image.
pub fn sobel_gradients(smoothed: ImageView<'_, u8>, parallel: bool) -> Gradients {
    let width = smoothed.width();
    let height = smoothed.height();
    let mut samples = vec![Gradient::default(); width * height];

    fill_rows(&mut samples, width, parallel, |y, row| {
        let y = y as isize;
        for (x, sample) in row.iter_mut().enumerate() {
            let x = x as isize;
            let p = |dx: isize, dy: isize| smoothed.value_or_zero(x + dx, y + dy);

            let gx = -p(-1, -1) + p(1, -1) - 2.0 * p(-1, 0) + 2.0 * p(1, 0) - p(-1, 1) + p(1, 1);
            let gy = -p(-1, -1) - 2.0 * p(0, -1) - p(1, -1) + p(-1, 1) + 2.0 * p(0, 1) + p(1, 1);

            *sample = Gradient {
                magnitude: (gx * gx + gy * gy).sqrt(),
                direction: gy.atan2(gx),
            };
        }
    });

    Gradients {
        width,
        height,
        samples,
    }
}

/// Keeps a magnitude only where it is a local maximum along the gradient.
///
/// Directions are folded into `[0, 180]` degrees and quantized into the
/// 0/45/90/135 sectors; neighbours outside the image count as zero.
pub fn suppress_non_maxima(gradients: &Gradients, parallel: bool) -> Vec<f64> {
    let width = gradients.width;
    let mut out = vec![0.0f64; width * gradients.height];

    fill_rows(&mut out, width, parallel, |y, row| {
        for (x, value) in row.iter_mut().enumerate() {
            let sample = gradients.samples[y * width + x];
            let mut angle = sample.direction * 180.0 / PI;
            if angle < 0.0 {
                angle += 180.0;
            }

            let (dx, dy): (isize, isize) = if !(22.5..157.5).contains(&angle) {
                (1, 0)
            } else if angle < 67.5 {
                (-1, 1)
            } else if angle < 112.5 {
                (0, 1)
            } else {
                (-1, -1)
            };

            let (xi, yi) = (x as isize, y as isize);
            let q = gradients.magnitude_or_zero(xi + dx, yi + dy);
            let r = gradients.magnitude_or_zero(xi - dx, yi - dy);
            *value = if sample.magnitude >= q && sample.magnitude >= r {
                sample.magnitude
            } else {
                0.0
            };
        }
    });

    out
}

/// Classifies suppressed magnitudes as strong (255), weak (128) or none (0).
pub fn classify_hysteresis(
    suppressed: &[f64],
    width: usize,
    thresholds: CannyThresholds,
    parallel: bool,
) -> Vec<u8> {
    let mut out = vec![0u8; suppressed.len()];
    fill_rows(&mut out, width, parallel, |y, row| {
        let src = &suppressed[y * width..(y + 1) * width];
        for (value, &magnitude) in row.iter_mut().zip(src) {
            *value = if magnitude >= thresholds.high {
                STRONG_EDGE
            } else if magnitude >= thresholds.low {
                WEAK_EDGE
            } else {
                0
            };
        }
    });
    out
}

/// Promotes weak pixels touching a strong pixel and clears the rest.
///
/// One in-place row-major pass: a pixel promoted earlier in the scan counts as
/// strong for the pixels after it.
pub fn link_weak_edges(edges: &mut [u8], width: usize, height: usize) {
    for y in 0..height {
        for x in 0..width {
            if edges[y * width + x] != WEAK_EDGE {
                continue;
            }
            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(height - 1);
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(width - 1);
            let touches_strong =
                (y0..=y1).any(|ny| (x0..=x1).any(|nx| edges[ny * width + nx] == STRONG_EDGE));
            edges[y * width + x] = if touches_strong { STRONG_EDGE } else { 0 };
        }
    }
}
