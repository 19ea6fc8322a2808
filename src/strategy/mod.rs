//! Matching modes and the [`SlideMatcher`] entry point.
//!
//! Every mode is a pure function of `(piece, background)`. The engine only
//! changes how the work is executed: the accelerated engine runs the Canny
//! stages and NCC rows on rayon and scores windows from summed-area tables,
//! and it is the only engine that consults a registered [`FeatureMatcher`].

mod enhanced;
mod keypoint;

pub use keypoint::{keypoint_offset, Correspondence, FeatureMatcher};

use crate::config::MatchConfig;
use crate::edge::{canny_with, CannyThresholds};
use crate::gap::{compare_pixels, GapResult};
use crate::image::{crop_to_opaque_bounds, to_grayscale, GrayImage, ImageView, RasterImage};
use crate::search::match_template;
use crate::trace::{trace_event, trace_span};
use crate::util::{SlideMatchError, SlideMatchResult};
use std::fmt;
use std::str::FromStr;

/// The four matching modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Grayscale, Canny(100, 200), NCC; no alpha crop.
    Simple,
    /// Like `Simple` with the piece cropped to its opaque bounds first.
    Standard,
    /// Four strategies with heuristic selection.
    Enhanced,
    /// Pixel difference between same-sized images.
    Comparison,
}

impl Mode {
    /// All modes in declaration order.
    pub const ALL: [Mode; 4] = [Mode::Simple, Mode::Standard, Mode::Enhanced, Mode::Comparison];

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Standard => "standard",
            Mode::Enhanced => "enhanced",
            Mode::Comparison => "comparison",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SlideMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Mode::Simple),
            "standard" => Ok(Mode::Standard),
            "enhanced" => Ok(Mode::Enhanced),
            "comparison" => Ok(Mode::Comparison),
            _ => Err(SlideMatchError::UnsupportedMode {
                selector: s.to_string(),
            }),
        }
    }
}

/// Execution engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Engine {
    /// Sequential brute-force kernels.
    #[default]
    Reference,
    /// Summed-area-table NCC and row-parallel stages (feature `rayon`).
    Accelerated,
}

impl Engine {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Reference => "reference",
            Engine::Accelerated => "accelerated",
        }
    }

    /// Fails with `BackendUnavailable` when the engine is not compiled in.
    pub fn ensure_available(self) -> SlideMatchResult<()> {
        match self {
            Engine::Reference => Ok(()),
            Engine::Accelerated if cfg!(feature = "rayon") => Ok(()),
            Engine::Accelerated => Err(SlideMatchError::BackendUnavailable {
                engine: self.as_str(),
            }),
        }
    }

    pub(crate) fn is_parallel(self) -> bool {
        cfg!(feature = "rayon") && self == Engine::Accelerated
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = SlideMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "default" => Ok(Engine::Reference),
            "accelerated" | "opencv" => Ok(Engine::Accelerated),
            _ => Err(SlideMatchError::UnsupportedMode {
                selector: s.to_string(),
            }),
        }
    }
}

/// Piece placement in background coordinates.
///
/// `target_y_offset` is the row at which the piece's opaque region starts
/// (0 when no crop happened).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MatchResult {
    pub target_y_offset: i32,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl MatchResult {
    pub(crate) fn from_placement(
        x: i32,
        y: i32,
        width: usize,
        height: usize,
        target_y_offset: i32,
    ) -> Self {
        Self {
            target_y_offset,
            x1: x,
            y1: y,
            x2: x + width as i32,
            y2: y + height as i32,
        }
    }
}

/// Result of [`SlideMatcher::run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SlideOutcome {
    /// Bounding box from a matching mode.
    Bbox(MatchResult),
    /// Gap coordinate from comparison mode.
    Gap(GapResult),
}

impl SlideOutcome {
    pub fn as_bbox(&self) -> Option<&MatchResult> {
        match self {
            SlideOutcome::Bbox(bbox) => Some(bbox),
            SlideOutcome::Gap(_) => None,
        }
    }

    pub fn as_gap(&self) -> Option<&GapResult> {
        match self {
            SlideOutcome::Gap(gap) => Some(gap),
            SlideOutcome::Bbox(_) => None,
        }
    }
}

/// Best placement of a template inside a background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Placement {
    pub score: f64,
    pub x: usize,
    pub y: usize,
}

/// Grayscale piece after the optional alpha crop.
pub(crate) struct PreparedPiece {
    pub gray: GrayImage,
    pub target_y_offset: i32,
}

impl PreparedPiece {
    fn uncropped(piece: &RasterImage) -> Self {
        Self {
            gray: to_grayscale(piece),
            target_y_offset: 0,
        }
    }

    /// Crops to the opaque bounds when the piece carries alpha. A fully
    /// transparent piece keeps its pixels and reports its height as offset.
    fn cropped(piece: &RasterImage) -> Self {
        if !piece.has_alpha() {
            return Self::uncropped(piece);
        }
        let crop = crop_to_opaque_bounds(piece);
        Self {
            gray: to_grayscale(&crop.image),
            target_y_offset: crop.row_offset as i32,
        }
    }

    fn result_at(&self, placement: Placement) -> MatchResult {
        MatchResult::from_placement(
            placement.x as i32,
            placement.y as i32,
            self.gray.width(),
            self.gray.height(),
            self.target_y_offset,
        )
    }
}

/// Runs NCC and returns the first maximum, or `None` when the template does
/// not fit.
pub(crate) fn best_placement(
    background: ImageView<'_, u8>,
    template: ImageView<'_, u8>,
    engine: Engine,
) -> Option<Placement> {
    let ext = match_template(background, template, engine)?.extremes();
    Some(Placement {
        score: ext.max_val,
        x: ext.max_x,
        y: ext.max_y,
    })
}

/// Canny on both images, then [`best_placement`] on the edge maps.
pub(crate) fn edge_placement(
    background: ImageView<'_, u8>,
    template: ImageView<'_, u8>,
    thresholds: CannyThresholds,
    engine: Engine,
) -> Option<Placement> {
    let parallel = engine.is_parallel();
    let bg_edges = canny_with(background, thresholds, parallel);
    let tpl_edges = canny_with(template, thresholds, parallel);
    best_placement(bg_edges.view(), tpl_edges.view(), engine)
}

fn ensure_fits(piece: &RasterImage, background: &RasterImage) -> SlideMatchResult<()> {
    if background.width() < piece.width() || background.height() < piece.height() {
        return Err(SlideMatchError::DimensionTooSmall {
            bg_width: background.width(),
            bg_height: background.height(),
            piece_width: piece.width(),
            piece_height: piece.height(),
        });
    }
    Ok(())
}

/// Entry point for every mode.
///
/// ```no_run
/// use slidematch::{Engine, Mode, RasterImage, SlideMatcher};
///
/// # fn demo(piece: &RasterImage, background: &RasterImage) -> slidematch::SlideMatchResult<()> {
/// let matcher = SlideMatcher::new(Engine::Reference)?;
/// let outcome = matcher.run(Mode::Enhanced, piece, background)?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
pub struct SlideMatcher {
    engine: Engine,
    cfg: MatchConfig,
    feature_matcher: Option<Box<dyn FeatureMatcher>>,
}

impl fmt::Debug for SlideMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlideMatcher")
            .field("engine", &self.engine)
            .field("cfg", &self.cfg)
            .field("feature_matcher", &self.feature_matcher.is_some())
            .finish()
    }
}

impl SlideMatcher {
    /// Creates a matcher with the default configuration.
    pub fn new(engine: Engine) -> SlideMatchResult<Self> {
        engine.ensure_available()?;
        Ok(Self {
            engine,
            cfg: MatchConfig::default(),
            feature_matcher: None,
        })
    }

    /// Overrides the matching configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Registers the keypoint matcher used as the last resort in enhanced
    /// mode on the accelerated engine.
    pub fn with_feature_matcher<M: FeatureMatcher + 'static>(mut self, matcher: M) -> Self {
        self.feature_matcher = Some(Box::new(matcher));
        self
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Runs `mode` and wraps the result.
    pub fn run(
        &self,
        mode: Mode,
        piece: &RasterImage,
        background: &RasterImage,
    ) -> SlideMatchResult<SlideOutcome> {
        let _span = trace_span!("slide_match", mode = mode.as_str(), engine = self.engine.as_str())
            .entered();
        let outcome = match mode {
            Mode::Simple => SlideOutcome::Bbox(self.simple(piece, background)?),
            Mode::Standard => SlideOutcome::Bbox(self.standard(piece, background)?),
            Mode::Enhanced => SlideOutcome::Bbox(self.enhanced(piece, background)?),
            Mode::Comparison => SlideOutcome::Gap(self.compare(piece, background)?),
        };
        Ok(outcome)
    }

    /// Edge NCC without alpha crop; accepts a maximum at or above
    /// `match_min_score`.
    pub fn simple(&self, piece: &RasterImage, background: &RasterImage) -> SlideMatchResult<MatchResult> {
        ensure_fits(piece, background)?;
        let prepared = PreparedPiece::uncropped(piece);
        self.edge_match(Mode::Simple, &prepared, background, self.cfg.simple_canny)
    }

    /// Edge NCC on the alpha-cropped piece; accepts a maximum at or above
    /// `match_min_score`.
    pub fn standard(&self, piece: &RasterImage, background: &RasterImage) -> SlideMatchResult<MatchResult> {
        ensure_fits(piece, background)?;
        let prepared = PreparedPiece::cropped(piece);
        self.edge_match(Mode::Standard, &prepared, background, self.cfg.standard_canny)
    }

    /// Runs the four enhanced strategies and picks one result.
    pub fn enhanced(&self, piece: &RasterImage, background: &RasterImage) -> SlideMatchResult<MatchResult> {
        ensure_fits(piece, background)?;
        let prepared = PreparedPiece::cropped(piece);
        let bg_gray = to_grayscale(background);
        let feature_matcher = match self.engine {
            Engine::Accelerated => self.feature_matcher.as_deref(),
            Engine::Reference => None,
        };
        enhanced::run(&prepared, &bg_gray, &self.cfg, self.engine, feature_matcher)
    }

    /// Pixel-difference comparison of two same-sized images.
    pub fn compare(&self, piece: &RasterImage, background: &RasterImage) -> SlideMatchResult<GapResult> {
        compare_pixels(piece, background, &self.cfg.compare)
    }

    fn edge_match(
        &self,
        mode: Mode,
        prepared: &PreparedPiece,
        background: &RasterImage,
        thresholds: CannyThresholds,
    ) -> SlideMatchResult<MatchResult> {
        let bg_gray = to_grayscale(background);
        let placement = edge_placement(bg_gray.view(), prepared.gray.view(), thresholds, self.engine)
            .ok_or_else(|| SlideMatchError::DimensionTooSmall {
                bg_width: bg_gray.width(),
                bg_height: bg_gray.height(),
                piece_width: prepared.gray.width(),
                piece_height: prepared.gray.height(),
            })?;

        trace_event!("edge_match", score = placement.score, x = placement.x, y = placement.y);
        let threshold = self.cfg.match_min_score;
        if placement.score < threshold {
            return Err(SlideMatchError::LowConfidenceMatch {
                mode: mode.as_str(),
                score: placement.score,
                threshold,
            });
        }
        Ok(prepared.result_at(placement))
    }
}

#[cfg(feature = "image-io")]
impl SlideMatcher {
    /// Decodes both images from encoded bytes, then runs `mode`.
    pub fn run_bytes(
        &self,
        mode: Mode,
        piece: &[u8],
        background: &[u8],
    ) -> SlideMatchResult<SlideOutcome> {
        use crate::image::io::decode_raster;
        use crate::util::ImageRole;

        let piece = decode_raster(piece, ImageRole::Piece)?;
        let background = decode_raster(background, ImageRole::Background)?;
        self.run(mode, &piece, &background)
    }

    /// Loads both images from disk, then runs `mode`.
    pub fn run_paths<P, Q>(&self, mode: Mode, piece: P, background: Q) -> SlideMatchResult<SlideOutcome>
    where
        P: AsRef<std::path::Path>,
        Q: AsRef<std::path::Path>,
    {
        use crate::image::io::load_raster;
        use crate::util::ImageRole;

        let piece = load_raster(piece, ImageRole::Piece)?;
        let background = load_raster(background, ImageRole::Background)?;
        self.run(mode, &piece, &background)
    }
}
