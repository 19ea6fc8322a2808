//! Canny-style edge extraction.
//!
//! The pipeline is fixed: 3x3 binomial smoothing, Sobel gradients,
//! four-sector non-maximum suppression, double-threshold classification and a
//! single linking pass. The output is a binary map with values in `{0, 255}`.
//!
//! Smoothing only writes interior pixels, so the outer ring keeps the source
//! values; gradients are then evaluated on the full frame with zero outside
//! the image. A piece cut out of a larger picture therefore produces an edge
//! ring along its own frame, which lines up with the slot outline in the
//! background's edge map.

mod stages;

pub use stages::{
    classify_hysteresis, gaussian_smooth, link_weak_edges, sobel_gradients, suppress_non_maxima,
    Gradient, Gradients,
};

use crate::image::{GrayImage, ImageView};
use crate::trace::trace_span;

/// Value of a confirmed edge pixel.
pub const STRONG_EDGE: u8 = 255;

/// Provisional value of a weak edge pixel before linking.
pub const WEAK_EDGE: u8 = 128;

/// Low/high magnitude thresholds for hysteresis classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CannyThresholds {
    /// Magnitudes at or above this are at least weak edges.
    pub low: f64,
    /// Magnitudes at or above this are strong edges.
    pub high: f64,
}

impl CannyThresholds {
    /// Creates a threshold pair.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Runs the full edge pipeline on a grayscale view.
pub fn canny(image: ImageView<'_, u8>, thresholds: CannyThresholds) -> GrayImage {
    canny_with(image, thresholds, false)
}

/// Row-parallel variant of [`canny`]; the output is bit-identical.
#[cfg(feature = "rayon")]
pub fn canny_par(image: ImageView<'_, u8>, thresholds: CannyThresholds) -> GrayImage {
    canny_with(image, thresholds, true)
}

pub(crate) fn canny_with(
    image: ImageView<'_, u8>,
    thresholds: CannyThresholds,
    parallel: bool,
) -> GrayImage {
    let width = image.width();
    let height = image.height();
    let _span = trace_span!(
        "canny",
        width = width,
        height = height,
        low = thresholds.low,
        high = thresholds.high
    )
    .entered();

    let smoothed = gaussian_smooth(image, parallel);
    let gradients = sobel_gradients(smoothed.view(), parallel);
    let suppressed = suppress_non_maxima(&gradients, parallel);
    let mut edges = classify_hysteresis(&suppressed, width, thresholds, parallel);
    link_weak_edges(&mut edges, width, height);

    GrayImage::from_parts(edges, width, height)
}
