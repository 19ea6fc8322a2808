//! NCC kernel implementations.
//!
//! Both kernels compute the same score for a placement `(x, y)`:
//!
//! ```text
//! sum((I - mean_I) * (T - mean_T)) / (sqrt(sum((I - mean_I)^2)) * sqrt(sum((T - mean_T)^2)))
//! ```
//!
//! with 0 for flat windows or flat templates, clamped into `[-1, 1]`.

use crate::image::ImageView;
use crate::search::CorrelationSurface;
use crate::template::TemplatePlan;

/// Kernel trait for scoring and surface construction.
pub trait Kernel {
    /// Computes the score at a single placement (top-left coordinates).
    ///
    /// Placements that do not fit inside the image score 0.
    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f64;

    /// Scores every valid placement, or `None` when the template is larger
    /// than the image in either dimension.
    fn surface(image: ImageView<'_, u8>, plan: &TemplatePlan) -> Option<CorrelationSurface>;
}

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Surface dimensions, or `None` when the template does not fit.
pub(crate) fn surface_dims(image: ImageView<'_, u8>, plan: &TemplatePlan) -> Option<(usize, usize)> {
    let width = image.width().checked_sub(plan.width())? + 1;
    let height = image.height().checked_sub(plan.height())? + 1;
    Some((width, height))
}

/// Final normalization shared by the kernels.
#[inline]
pub(crate) fn normalize(correlation: f64, window_norm: f64, template_norm: f64) -> f64 {
    if window_norm > 0.0 && template_norm > 0.0 {
        (correlation / (window_norm * template_norm)).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
