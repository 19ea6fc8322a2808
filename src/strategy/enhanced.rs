//! Enhanced mode: four strategies, one answer.

use crate::config::MatchConfig;
use crate::edge::CannyThresholds;
use crate::gap::slot_search;
use crate::image::GrayImage;
use crate::strategy::keypoint::{keypoint_offset, FeatureMatcher};
use crate::strategy::{best_placement, edge_placement, Engine, MatchResult, PreparedPiece};
use crate::trace::{trace_event, trace_span};
use crate::util::{SlideMatchError, SlideMatchResult, StrategyScores};

/// Runs grayscale NCC, two edge NCCs and the slot search in that order, then
/// the keypoint fallback if nothing passed.
pub(crate) fn run(
    piece: &PreparedPiece,
    background: &GrayImage,
    cfg: &MatchConfig,
    engine: Engine,
    feature_matcher: Option<&dyn FeatureMatcher>,
) -> SlideMatchResult<MatchResult> {
    let mut scores = StrategyScores::default();
    let mut accepted: Vec<MatchResult> = Vec::with_capacity(4);

    {
        let _span = trace_span!("enhanced_strategy", strategy = "gray").entered();
        if let Some(placement) = best_placement(background.view(), piece.gray.view(), engine) {
            scores.gray = placement.score;
            if placement.score > cfg.gray_min_score {
                accepted.push(piece.result_at(placement));
            }
        }
        trace_event!("strategy_score", score = scores.gray);
    }

    scores.edge_low = edge_strategy(
        "edge_low",
        piece,
        background,
        cfg.edge_low_canny,
        cfg.edge_low_min_score,
        engine,
        &mut accepted,
    );
    scores.edge_mid = edge_strategy(
        "edge_mid",
        piece,
        background,
        cfg.edge_mid_canny,
        cfg.edge_mid_min_score,
        engine,
        &mut accepted,
    );

    {
        let _span = trace_span!("enhanced_strategy", strategy = "slot").entered();
        let (energy, slot) = slot_search(background.view(), piece.gray.view(), &cfg.slot);
        scores.slot_energy = energy;
        if let Some(slot) = slot {
            accepted.push(MatchResult::from_placement(
                slot.x as i32,
                slot.y as i32,
                piece.gray.width(),
                piece.gray.height(),
                0,
            ));
        }
        trace_event!("strategy_score", score = energy);
    }

    if accepted.is_empty() {
        if let Some(matcher) = feature_matcher {
            let _span = trace_span!("enhanced_strategy", strategy = "keypoint").entered();
            let pairs = matcher.correspondences(piece.gray.view(), background.view());
            trace_event!("keypoint_pairs", count = pairs.len());
            if let Some(bbox) = keypoint_offset(
                &pairs,
                piece.gray.width(),
                piece.gray.height(),
                &cfg.keypoint,
            ) {
                accepted.push(bbox);
            }
        }
    }

    let selected = select(&accepted).ok_or(SlideMatchError::AllStrategiesFailed { scores })?;
    trace_event!(
        "enhanced_selected",
        x1 = selected.x1,
        y1 = selected.y1,
        candidates = accepted.len()
    );
    Ok(selected)
}

fn edge_strategy(
    name: &'static str,
    piece: &PreparedPiece,
    background: &GrayImage,
    thresholds: CannyThresholds,
    min_score: f64,
    engine: Engine,
    accepted: &mut Vec<MatchResult>,
) -> f64 {
    let _span = trace_span!("enhanced_strategy", strategy = name).entered();
    let Some(placement) =
        edge_placement(background.view(), piece.gray.view(), thresholds, engine)
    else {
        return 0.0;
    };
    trace_event!("strategy_score", score = placement.score);
    if placement.score > min_score {
        accepted.push(piece.result_at(placement));
    }
    placement.score
}

/// Smallest positive `x1`, first on ties; otherwise the first result.
fn select(accepted: &[MatchResult]) -> Option<MatchResult> {
    let mut best: Option<MatchResult> = None;
    for result in accepted.iter().filter(|r| r.x1 > 0) {
        if best.map_or(true, |b| result.x1 < b.x1) {
            best = Some(*result);
        }
    }
    best.or_else(|| accepted.first().copied())
}
