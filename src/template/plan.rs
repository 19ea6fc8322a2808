//! Template plan precomputation for NCC scoring.

use crate::image::ImageView;

/// Precomputed statistics and zero-mean buffer for template matching.
///
/// A flat template is accepted; its norm is zero and every placement then
/// scores 0.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: f64,
    norm: f64,
    zero_mean: Vec<f64>,
    zero_mean_sum: f64,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> Self {
        let width = tpl.width();
        let height = tpl.height();
        let count = (width * height) as f64;

        let mut sum = 0.0f64;
        for row in tpl.rows() {
            for &value in row {
                sum += f64::from(value);
            }
        }
        let mean = sum / count;

        let mut zero_mean = Vec::with_capacity(width * height);
        let mut sum_sq = 0.0f64;
        let mut zero_mean_sum = 0.0f64;
        for row in tpl.rows() {
            for &value in row {
                let diff = f64::from(value) - mean;
                sum_sq += diff * diff;
                zero_mean_sum += diff;
                zero_mean.push(diff);
            }
        }

        Self {
            width,
            height,
            mean,
            norm: sum_sq.sqrt(),
            zero_mean,
            zero_mean_sum,
        }
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the mean intensity of the template.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns `sqrt(sum((t - mean)^2))`.
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Returns true when the template has no intensity variation.
    pub fn is_flat(&self) -> bool {
        self.norm == 0.0
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn zero_mean(&self) -> &[f64] {
        &self.zero_mean
    }

    /// Floating-point residue of `sum(t - mean)`, ideally zero.
    pub(crate) fn zero_mean_sum(&self) -> f64 {
        self.zero_mean_sum
    }

    /// Number of template pixels.
    pub(crate) fn len(&self) -> usize {
        self.zero_mean.len()
    }
}
