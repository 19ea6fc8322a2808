//! Keypoint fallback for enhanced mode.
//!
//! The crate ships no detector; callers plug one in through
//! [`FeatureMatcher`] and the offset is derived from its correspondences.

use crate::config::KeypointConfig;
use crate::image::ImageView;
use crate::strategy::MatchResult;

/// One matched keypoint pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correspondence {
    /// Keypoint position in the piece.
    pub piece: (f32, f32),
    /// Keypoint position in the background.
    pub background: (f32, f32),
    /// Descriptor distance; smaller is better.
    pub distance: f32,
}

/// External keypoint detector and matcher.
pub trait FeatureMatcher: Send + Sync {
    /// Detects keypoints in both images and returns matched pairs.
    fn correspondences(
        &self,
        piece: ImageView<'_, u8>,
        background: ImageView<'_, u8>,
    ) -> Vec<Correspondence>;
}

/// Averages the integer offsets of good correspondences.
///
/// Needs `cfg.min_matches` correspondences before and after dropping those
/// with `distance >= cfg.max_distance`. Points are truncated to integers and
/// the average truncates toward zero. The box takes the piece size as its
/// extent and reports a `target_y_offset` of 0.
pub fn keypoint_offset(
    correspondences: &[Correspondence],
    piece_width: usize,
    piece_height: usize,
    cfg: &KeypointConfig,
) -> Option<MatchResult> {
    if correspondences.len() < cfg.min_matches {
        return None;
    }

    let good: Vec<&Correspondence> = correspondences
        .iter()
        .filter(|c| c.distance < cfg.max_distance)
        .collect();
    if good.is_empty() || good.len() < cfg.min_matches {
        return None;
    }

    let (sum_x, sum_y) = good.iter().fold((0i64, 0i64), |(sx, sy), c| {
        let dx = c.background.0 as i64 - c.piece.0 as i64;
        let dy = c.background.1 as i64 - c.piece.1 as i64;
        (sx + dx, sy + dy)
    });
    let count = good.len() as i64;

    Some(MatchResult::from_placement(
        (sum_x / count) as i32,
        (sum_y / count) as i32,
        piece_width,
        piece_height,
        0,
    ))
}
