//! Correlation surfaces and extremum search.

/// Dense NCC scores for every placement of a template, row-major.
///
/// Dimensions are `(bg_width - tpl_width + 1) x (bg_height - tpl_height + 1)`
/// and always at least 1x1.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationSurface {
    width: usize,
    height: usize,
    scores: Vec<f64>,
}

impl CorrelationSurface {
    pub(crate) fn from_parts(scores: Vec<f64>, width: usize, height: usize) -> Self {
        debug_assert_eq!(scores.len(), width * height);
        Self {
            width,
            height,
            scores,
        }
    }

    /// Number of horizontal placements.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of vertical placements.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Score of the placement with top-left corner `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.scores.get(y * self.width + x).copied()
    }

    /// All scores in row-major order.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Shorthand for [`find_extremes`].
    pub fn extremes(&self) -> Extremes {
        find_extremes(self)
    }
}

/// Maximum and minimum of a surface with their placements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extremes {
    pub max_val: f64,
    pub max_x: usize,
    pub max_y: usize,
    pub min_val: f64,
    pub min_x: usize,
    pub min_y: usize,
}

/// Scans rows top to bottom and columns left to right with strict
/// comparisons, so the first placement in row-major order wins ties.
pub fn find_extremes(surface: &CorrelationSurface) -> Extremes {
    let first = surface.scores.first().copied().unwrap_or(0.0);
    let mut ext = Extremes {
        max_val: first,
        max_x: 0,
        max_y: 0,
        min_val: first,
        min_x: 0,
        min_y: 0,
    };

    for (y, row) in surface.scores.chunks(surface.width.max(1)).enumerate() {
        for (x, &score) in row.iter().enumerate() {
            if score > ext.max_val {
                ext.max_val = score;
                ext.max_x = x;
                ext.max_y = y;
            }
            if score < ext.min_val {
                ext.min_val = score;
                ext.min_x = x;
                ext.min_y = y;
            }
        }
    }

    ext
}
