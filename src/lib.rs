//! slidematch locates where a slider-puzzle piece belongs in its background.
//!
//! The pipeline is grayscale conversion with an optional alpha crop, a
//! Canny-style edge extractor, dense NCC template matching, and a heuristic
//! selection across several strategies. A pixel-difference gap finder covers
//! the case where a clean and a slotted copy of the background are available.
//! The accelerated engine (feature `rayon`) runs the same modes with
//! row-parallel stages and summed-area-table NCC.
//!
//! ```no_run
//! use slidematch::{Engine, Mode, RasterImage, SlideMatcher};
//!
//! # fn demo() -> slidematch::SlideMatchResult<()> {
//! let background = RasterImage::filled_rgb(100, 100, [0, 0, 0])?;
//! let piece = RasterImage::filled_rgb(10, 10, [255, 255, 255])?;
//! let matcher = SlideMatcher::new(Engine::Reference)?;
//! let bbox = matcher.standard(&piece, &background)?;
//! println!("slot at x={} y={}", bbox.x1, bbox.y1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod edge;
pub mod gap;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod search;
pub mod strategy;
pub mod template;
mod trace;
pub mod util;

pub use config::{CompareConfig, KeypointConfig, MatchConfig, SlotConfig};
pub use edge::{canny, CannyThresholds};
pub use gap::{compare_pixels, find_slot_by_gradient, GapResult, SlotCandidate};
pub use image::{GrayImage, ImageView, OpaqueCrop, RasterImage};
pub use search::{find_extremes, match_template, CorrelationSurface, Extremes};
pub use strategy::{
    keypoint_offset, Correspondence, Engine, FeatureMatcher, MatchResult, Mode, SlideMatcher,
    SlideOutcome,
};
pub use util::{ImageRole, SlideMatchError, SlideMatchResult, StrategyScores};

#[cfg(feature = "image-io")]
pub use image::io::{decode_raster, load_raster};
