//! Low-level building blocks for custom matching pipelines.
//!
//! These expose the individual edge stages, template plans, the kernel trait
//! and the gap helpers for callers who want to assemble their own pipeline
//! instead of going through `SlideMatcher`.

pub use crate::edge::{
    classify_hysteresis, gaussian_smooth, link_weak_edges, sobel_gradients, suppress_non_maxima,
    Gradient, Gradients, STRONG_EDGE, WEAK_EDGE,
};
pub use crate::gap::{best_row_at, column_edge_energy, strongest_column, DifferenceMask};
pub use crate::image::{abs_diff, crop_to_opaque_bounds, to_grayscale};
pub use crate::kernel::Kernel;
pub use crate::template::TemplatePlan;
pub use crate::kernel::scalar::NccScalar;

#[cfg(feature = "rayon")]
pub use crate::edge::canny_par;
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::NccIntegralPar;
