//! Scalar reference kernel.

use crate::image::ImageView;
use crate::kernel::{normalize, surface_dims, Kernel};
use crate::search::CorrelationSurface;
use crate::template::TemplatePlan;
use crate::util::rows::fill_rows;

/// Brute-force NCC: every placement recomputes its window mean and variance.
pub struct NccScalar;

impl NccScalar {
    fn score_unchecked(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f64 {
        let tpl_width = plan.width();
        let tpl_height = plan.height();
        let count = plan.len() as f64;

        let mut sum = 0.0f64;
        for ty in 0..tpl_height {
            let img_row = image.row(y + ty).expect("row within bounds for score");
            for &value in &img_row[x..x + tpl_width] {
                sum += f64::from(value);
            }
        }
        let window_mean = sum / count;

        let zero_mean = plan.zero_mean();
        let mut correlation = 0.0f64;
        let mut window_sq = 0.0f64;
        for ty in 0..tpl_height {
            let img_row = image.row(y + ty).expect("row within bounds for score");
            let tpl_row = &zero_mean[ty * tpl_width..(ty + 1) * tpl_width];
            for (&value, &t) in img_row[x..x + tpl_width].iter().zip(tpl_row) {
                let diff = f64::from(value) - window_mean;
                correlation += diff * t;
                window_sq += diff * diff;
            }
        }

        normalize(correlation, window_sq.sqrt(), plan.norm())
    }
}

impl Kernel for NccScalar {
    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f64 {
        match surface_dims(image, plan) {
            Some((width, height)) if x < width && y < height => {
                Self::score_unchecked(image, plan, x, y)
            }
            _ => 0.0,
        }
    }

    fn surface(image: ImageView<'_, u8>, plan: &TemplatePlan) -> Option<CorrelationSurface> {
        let (width, height) = surface_dims(image, plan)?;
        let mut scores = vec![0.0f64; width * height];
        if !plan.is_flat() {
            fill_rows(&mut scores, width, false, |y, row| {
                for (x, score) in row.iter_mut().enumerate() {
                    *score = Self::score_unchecked(image, plan, x, y);
                }
            });
        }
        Some(CorrelationSurface::from_parts(scores, width, height))
    }
}
