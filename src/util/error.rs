//! Error types for slidematch.

use std::fmt;
use thiserror::Error;

/// Result alias for slidematch operations.
pub type SlideMatchResult<T> = std::result::Result<T, SlideMatchError>;

/// Which of the two inputs an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageRole {
    /// The small cutout being aligned.
    Piece,
    /// The larger image containing the slot.
    Background,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Piece => f.write_str("piece"),
            ImageRole::Background => f.write_str("background"),
        }
    }
}

/// Best score reached by each Enhanced-mode strategy.
///
/// Scores of strategies that could not run (template larger than the
/// background after edge extraction, empty slot search range) are `0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrategyScores {
    /// Raw grayscale NCC maximum.
    pub gray: f64,
    /// Low-threshold edge NCC maximum.
    pub edge_low: f64,
    /// Mid-threshold edge NCC maximum.
    pub edge_mid: f64,
    /// Peak column edge energy of the slot search.
    pub slot_energy: f64,
}

impl fmt::Display for StrategyScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gray={:.4} edge_low={:.4} edge_mid={:.4} slot_energy={:.2}",
            self.gray, self.edge_low, self.edge_mid, self.slot_energy
        )
    }
}

/// Errors that can occur when running slidematch algorithms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SlideMatchError {
    /// Image dimensions must be non-zero.
    #[error("invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride must be at least the image width.
    #[error("invalid stride: width={width}, stride={stride}")]
    InvalidStride { width: usize, stride: usize },
    /// Input buffer is smaller than required.
    #[error("buffer too small: needed={needed}, got={got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// ROI does not fit inside the image.
    #[error(
        "roi out of bounds: x={x}, y={y}, width={width}, height={height}, image={img_width}x{img_height}"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Only RGB and RGBA rasters are supported.
    #[error("unsupported channel count: {channels} (expected 3 or 4)")]
    UnsupportedChannels { channels: usize },
    /// The image codec could not parse one of the inputs.
    #[error("failed to decode {role} image: {reason}")]
    Decode { role: ImageRole, reason: String },
    /// An image file could not be read.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// Background is narrower or shorter than the piece.
    #[error(
        "background {bg_width}x{bg_height} is smaller than piece {piece_width}x{piece_height}"
    )]
    DimensionTooSmall {
        bg_width: usize,
        bg_height: usize,
        piece_width: usize,
        piece_height: usize,
    },
    /// Background and piece dimensions differ (comparison mode).
    #[error(
        "comparison needs equal sizes, got background {bg_width}x{bg_height} and piece {piece_width}x{piece_height}"
    )]
    DimensionMismatch {
        bg_width: usize,
        bg_height: usize,
        piece_width: usize,
        piece_height: usize,
    },
    /// Best correlation score is below the mode's threshold.
    #[error("{mode} match score {score:.4} is below threshold {threshold:.4}")]
    LowConfidenceMatch {
        mode: &'static str,
        score: f64,
        threshold: f64,
    },
    /// Every Enhanced-mode strategy missed its threshold.
    #[error("all enhanced strategies failed ({scores})")]
    AllStrategiesFailed { scores: StrategyScores },
    /// Unknown mode or engine selector.
    #[error("unsupported mode or engine: {selector:?}")]
    UnsupportedMode { selector: String },
    /// The requested engine is not compiled into this build.
    #[error("{engine} engine is not available in this build")]
    BackendUnavailable { engine: &'static str },
}
