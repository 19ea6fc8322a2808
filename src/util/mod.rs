//! Shared utility helpers.

pub mod error;
pub(crate) mod rows;

pub use error::{ImageRole, SlideMatchError, SlideMatchResult, StrategyScores};
