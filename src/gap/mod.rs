//! Gap finders that do not rely on correlation.
//!
//! [`compare_pixels`] diffs two same-sized rasters and reports the first
//! column with enough differing pixels. [`find_slot_by_gradient`] looks for
//! the slot's left edge in a single grayscale background.

mod compare;
mod slot;

pub use compare::{compare_pixels, DifferenceMask, GapResult};
pub use slot::{best_row_at, column_edge_energy, find_slot_by_gradient, strongest_column, SlotCandidate};

pub(crate) use slot::slot_search;
