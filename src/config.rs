//! Tuned thresholds for every matching mode.
//!
//! The defaults reproduce the behaviour the matcher was calibrated with; the
//! sub-configs are accepted directly by the lower-level functions in
//! [`crate::gap`] and [`crate::strategy`].

use crate::edge::CannyThresholds;

/// Configuration for the pixel-difference gap finder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompareConfig {
    /// A pixel differs when the mean absolute RGB delta exceeds this value.
    pub diff_threshold: u8,
    /// Differing pixels a column needs before it is reported.
    pub min_count: usize,
    /// Added to the reported column.
    pub x_offset: u32,
    /// Subtracted from the row of the last counted hit (clamped at 0).
    pub y_backoff: u32,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            diff_threshold: 80,
            min_count: 5,
            x_offset: 2,
            y_backoff: 5,
        }
    }
}

/// Configuration for the vertical-gradient slot search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotConfig {
    /// A column is accepted only when its energy exceeds this value.
    pub min_energy: f64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self { min_energy: 10.0 }
    }
}

/// Configuration for the keypoint fallback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeypointConfig {
    /// Correspondences with a distance at or above this are dropped.
    pub max_distance: f32,
    /// Matches required both before and after distance filtering.
    pub min_matches: usize,
}

impl Default for KeypointConfig {
    fn default() -> Self {
        Self {
            max_distance: 0.7,
            min_matches: 4,
        }
    }
}

/// Configuration for [`crate::SlideMatcher`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchConfig {
    /// Edge thresholds for simple mode.
    pub simple_canny: CannyThresholds,
    /// Edge thresholds for standard mode.
    pub standard_canny: CannyThresholds,
    /// Inclusive acceptance score for simple and standard modes.
    pub match_min_score: f64,
    /// Exclusive acceptance score for the grayscale NCC strategy.
    pub gray_min_score: f64,
    /// Edge thresholds for the low-threshold edge strategy.
    pub edge_low_canny: CannyThresholds,
    /// Exclusive acceptance score for the low-threshold edge strategy.
    pub edge_low_min_score: f64,
    /// Edge thresholds for the mid-threshold edge strategy.
    pub edge_mid_canny: CannyThresholds,
    /// Exclusive acceptance score for the mid-threshold edge strategy.
    pub edge_mid_min_score: f64,
    pub slot: SlotConfig,
    pub compare: CompareConfig,
    pub keypoint: KeypointConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            simple_canny: CannyThresholds::new(100.0, 200.0),
            standard_canny: CannyThresholds::new(100.0, 200.0),
            match_min_score: 0.3,
            gray_min_score: 0.6,
            edge_low_canny: CannyThresholds::new(30.0, 80.0),
            edge_low_min_score: 0.3,
            edge_mid_canny: CannyThresholds::new(50.0, 150.0),
            edge_mid_min_score: 0.2,
            slot: SlotConfig::default(),
            compare: CompareConfig::default(),
            keypoint: KeypointConfig::default(),
        }
    }
}
