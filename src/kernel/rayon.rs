//! Rayon-parallel NCC kernel (feature-gated).
//!
//! Window sums and sums of squares come from integer summed-area tables, so
//! each placement only pays for the cross term. Rows of the surface are
//! scored in parallel.

use crate::image::ImageView;
use crate::kernel::{normalize, surface_dims, Kernel};
use crate::search::CorrelationSurface;
use crate::template::TemplatePlan;
use rayon::prelude::*;

/// Integral-image NCC scored row-parallel.
pub struct NccIntegralPar;

/// Inclusive-exclusive summed-area tables over `u8` intensities.
struct IntegralTables {
    stride: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralTables {
    fn build(image: ImageView<'_, u8>) -> Self {
        let stride = image.width() + 1;
        let mut sum = vec![0u64; stride * (image.height() + 1)];
        let mut sum_sq = vec![0u64; sum.len()];

        for (y, row) in image.rows().enumerate() {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sum_sq[idx] = sum_sq[idx - stride] + row_sq;
            }
        }

        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    fn window(table: &[u64], stride: usize, x: usize, y: usize, w: usize, h: usize) -> u64 {
        let a = table[y * stride + x];
        let b = table[y * stride + x + w];
        let c = table[(y + h) * stride + x];
        let d = table[(y + h) * stride + x + w];
        d + a - b - c
    }

    /// Returns `(S1, n * S2 - S1^2)` for the window at `(x, y)`.
    fn window_stats(&self, x: usize, y: usize, w: usize, h: usize) -> (u64, u128) {
        let s1 = Self::window(&self.sum, self.stride, x, y, w, h);
        let s2 = Self::window(&self.sum_sq, self.stride, x, y, w, h);
        let n = (w * h) as u128;
        let s1_wide = u128::from(s1);
        (s1, n * u128::from(s2) - s1_wide * s1_wide)
    }
}

impl NccIntegralPar {
    fn score_with(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        tables: &IntegralTables,
        x: usize,
        y: usize,
    ) -> f64 {
        let tpl_width = plan.width();
        let tpl_height = plan.height();
        let (s1, var_num) = tables.window_stats(x, y, tpl_width, tpl_height);
        if var_num == 0 {
            return 0.0;
        }

        let zero_mean = plan.zero_mean();
        let mut cross = 0.0f64;
        for ty in 0..tpl_height {
            let img_row = image.row(y + ty).expect("row within bounds for score");
            let tpl_row = &zero_mean[ty * tpl_width..(ty + 1) * tpl_width];
            for (&value, &t) in img_row[x..x + tpl_width].iter().zip(tpl_row) {
                cross += f64::from(value) * t;
            }
        }

        let count = plan.len() as f64;
        let correlation = cross - s1 as f64 * plan.zero_mean_sum() / count;
        let window_norm = (var_num as f64 / count).sqrt();
        normalize(correlation, window_norm, plan.norm())
    }
}

impl Kernel for NccIntegralPar {
    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f64 {
        match surface_dims(image, plan) {
            Some((width, height)) if x < width && y < height && !plan.is_flat() => {
                let tables = IntegralTables::build(image);
                Self::score_with(image, plan, &tables, x, y)
            }
            _ => 0.0,
        }
    }

    fn surface(image: ImageView<'_, u8>, plan: &TemplatePlan) -> Option<CorrelationSurface> {
        let (width, height) = surface_dims(image, plan)?;
        let mut scores = vec![0.0f64; width * height];
        if plan.is_flat() {
            return Some(CorrelationSurface::from_parts(scores, width, height));
        }

        let tables = IntegralTables::build(image);
        scores
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, score) in row.iter_mut().enumerate() {
                    *score = Self::score_with(image, plan, &tables, x, y);
                }
            });

        Some(CorrelationSurface::from_parts(scores, width, height))
    }
}
