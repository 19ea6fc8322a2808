//! Pixel-difference gap detection between two same-sized rasters.

use crate::config::CompareConfig;
use crate::image::{abs_diff, GrayImage, RasterImage};
use crate::trace::trace_event;
use crate::util::{SlideMatchError, SlideMatchResult};

/// Gap coordinate reported by the comparison scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GapResult {
    pub x: u32,
    pub y: u32,
}

/// Binary map of pixels whose mean RGB delta exceeds the threshold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifferenceMask {
    mask: GrayImage,
}

impl DifferenceMask {
    /// Marks every pixel where `(|dR| + |dG| + |dB|) / 3 > threshold`.
    ///
    /// Alpha is ignored. Both rasters must have identical dimensions.
    pub fn build(piece: &RasterImage, background: &RasterImage, threshold: u8) -> SlideMatchResult<Self> {
        ensure_same_size(piece, background)?;

        let width = piece.width();
        let height = piece.height();
        let mut data = Vec::with_capacity(width * height);
        let lhs = piece.data().chunks_exact(piece.channels());
        let rhs = background.data().chunks_exact(background.channels());
        for (a, b) in lhs.zip(rhs) {
            let total = u16::from(abs_diff(a[0], b[0]))
                + u16::from(abs_diff(a[1], b[1]))
                + u16::from(abs_diff(a[2], b[2]));
            data.push(if total / 3 > u16::from(threshold) { 255 } else { 0 });
        }

        Ok(Self {
            mask: GrayImage::from_parts(data, width, height),
        })
    }

    pub fn width(&self) -> usize {
        self.mask.width()
    }

    pub fn height(&self) -> usize {
        self.mask.height()
    }

    /// Returns true when `(x, y)` is marked as different.
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y).is_some_and(|v| v != 0)
    }

    /// Returns the mask as a `{0, 255}` grayscale image.
    pub fn as_image(&self) -> &GrayImage {
        &self.mask
    }

    /// Scans columns left to right and rows top to bottom; the first column
    /// whose hit count reaches `cfg.min_count` yields the gap. `y` is taken
    /// at the hit that completes the count. No such column gives `(0, 0)`.
    pub fn locate(&self, cfg: &CompareConfig) -> GapResult {
        for x in 0..self.width() {
            let mut count = 0usize;
            let mut start_y = None;
            for y in 0..self.height() {
                if self.is_set(x, y) {
                    count += 1;
                }
                if start_y.is_none() && count >= cfg.min_count {
                    start_y = Some((y as u32).saturating_sub(cfg.y_backoff));
                }
            }
            if let Some(y) = start_y {
                let gap = GapResult {
                    x: x as u32 + cfg.x_offset,
                    y,
                };
                trace_event!("gap_column", x = gap.x, y = gap.y, hits = count);
                return gap;
            }
        }
        GapResult::default()
    }
}

/// Locates the slot by comparing two same-sized rasters pixel by pixel.
pub fn compare_pixels(
    piece: &RasterImage,
    background: &RasterImage,
    cfg: &CompareConfig,
) -> SlideMatchResult<GapResult> {
    let mask = DifferenceMask::build(piece, background, cfg.diff_threshold)?;
    Ok(mask.locate(cfg))
}

fn ensure_same_size(piece: &RasterImage, background: &RasterImage) -> SlideMatchResult<()> {
    if piece.width() != background.width() || piece.height() != background.height() {
        return Err(SlideMatchError::DimensionMismatch {
            bg_width: background.width(),
            bg_height: background.height(),
            piece_width: piece.width(),
            piece_height: piece.height(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{compare_pixels, DifferenceMask, GapResult};
    use crate::config::CompareConfig;
    use crate::image::RasterImage;
    use crate::util::SlideMatchError;

    fn with_block(width: usize, height: usize, x0: usize, y0: usize, size: usize) -> RasterImage {
        RasterImage::from_fn(width, height, 3, |x, y| {
            if (x0..x0 + size).contains(&x) && (y0..y0 + size).contains(&y) {
                [150, 150, 150, 255]
            } else {
                [30, 30, 30, 255]
            }
        })
        .unwrap()
    }

    #[test]
    fn threshold_is_exclusive_on_the_integer_mean() {
        let a = RasterImage::filled_rgb(1, 1, [0, 0, 0]).unwrap();
        // (80 + 80 + 82) / 3 == 80: not different.
        let b = RasterImage::filled_rgb(1, 1, [80, 80, 82]).unwrap();
        assert!(!DifferenceMask::build(&a, &b, 80).unwrap().is_set(0, 0));
        // (81 + 81 + 81) / 3 == 81: different.
        let c = RasterImage::filled_rgb(1, 1, [81, 81, 81]).unwrap();
        assert!(DifferenceMask::build(&a, &c, 80).unwrap().is_set(0, 0));
    }

    #[test]
    fn first_qualifying_column_wins() {
        let bg = RasterImage::filled_rgb(40, 30, [30, 30, 30]).unwrap();
        let piece = with_block(40, 30, 12, 8, 7);
        let gap = compare_pixels(&piece, &bg, &CompareConfig::default()).unwrap();
        // Fifth hit in column 12 is at row 12.
        assert_eq!(gap, GapResult { x: 14, y: 7 });
    }

    #[test]
    fn hits_near_the_top_clamp_y_to_zero() {
        let bg = RasterImage::filled_rgb(10, 10, [0, 0, 0]).unwrap();
        let piece = with_block(10, 10, 3, 0, 6);
        let gap = compare_pixels(&piece, &bg, &CompareConfig::default()).unwrap();
        assert_eq!(gap, GapResult { x: 5, y: 0 });
    }

    #[test]
    fn short_columns_are_skipped() {
        let bg = RasterImage::filled_rgb(10, 10, [0, 0, 0]).unwrap();
        let piece = with_block(10, 10, 2, 2, 4);
        let gap = compare_pixels(&piece, &bg, &CompareConfig::default()).unwrap();
        assert_eq!(gap, GapResult::default());
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let a = RasterImage::filled_rgb(79, 80, [0, 0, 0]).unwrap();
        let b = RasterImage::filled_rgb(80, 80, [0, 0, 0]).unwrap();
        assert_eq!(
            compare_pixels(&a, &b, &CompareConfig::default()),
            Err(SlideMatchError::DimensionMismatch {
                bg_width: 80,
                bg_height: 80,
                piece_width: 79,
                piece_height: 80,
            })
        );
    }

    #[test]
    fn rgba_and_rgb_inputs_compare_on_color_only() {
        let a = RasterImage::filled_rgba(6, 6, [10, 10, 10, 0]).unwrap();
        let b = RasterImage::filled_rgb(6, 6, [10, 10, 10]).unwrap();
        let mask = DifferenceMask::build(&a, &b, 80).unwrap();
        assert!(mask.as_image().data().iter().all(|&v| v == 0));
    }
}
