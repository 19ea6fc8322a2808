//! Slot search driven by vertical gradient energy.
//!
//! The slot's left edge shows up as the column with the strongest vertical
//! intensity changes; the row is then picked by a raw (un-normalized) mean
//! dot product, which favours bright windows.

use crate::config::SlotConfig;
use crate::image::ImageView;

/// Column and row picked by the slot search, with the column's energy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotCandidate {
    pub x: usize,
    pub y: usize,
    pub energy: f64,
}

/// Mean absolute vertical gradient `|bg(x, y+1) - bg(x, y-1)|` per column.
///
/// Only interior columns and rows contribute; the first and last columns
/// (and every column of an image shorter than three rows) stay at zero.
pub fn column_edge_energy(background: ImageView<'_, u8>) -> Vec<f64> {
    let width = background.width();
    let height = background.height();
    let mut energy = vec![0.0f64; width];
    if width < 3 || height < 3 {
        return energy;
    }

    let rows: Vec<&[u8]> = background.rows().collect();
    for (x, slot) in energy.iter_mut().enumerate().take(width - 1).skip(1) {
        let mut total = 0.0f64;
        for y in 1..height - 1 {
            let top = f64::from(rows[y - 1][x]);
            let bottom = f64::from(rows[y + 1][x]);
            total += (bottom - top).abs();
        }
        *slot = total / (height - 2) as f64;
    }
    energy
}

/// Returns the row whose template-sized window at column `x` maximizes
/// `sum(bg * tmpl) / count`; the first maximum wins and `0` is returned when
/// no window overlaps the background.
///
/// Windows that run past the right edge are clipped and averaged over the
/// overlapping pixels only.
pub fn best_row_at(background: ImageView<'_, u8>, template: ImageView<'_, u8>, x: usize) -> usize {
    let tpl_height = template.height();
    if background.height() < tpl_height || x >= background.width() {
        return 0;
    }
    let overlap = template.width().min(background.width() - x);

    let mut best_y = 0;
    let mut best_score = -1.0f64;
    for y in 0..=background.height() - tpl_height {
        let Ok(window) = background.roi(x, y, overlap, tpl_height) else {
            continue;
        };
        let mut score = 0.0f64;
        for (bg_row, tpl_row) in window.rows().zip(template.rows()) {
            for (&b, &t) in bg_row.iter().zip(tpl_row) {
                score += f64::from(b) * f64::from(t);
            }
        }
        score /= (overlap * tpl_height) as f64;
        if score > best_score {
            best_score = score;
            best_y = y;
        }
    }
    best_y
}

/// Strongest column in `[tpl_width / 2, bg_width - tpl_width - tpl_width / 2)`.
///
/// Strict comparison starting from `(0, 0.0)`, so an empty range or an
/// all-zero profile yields column 0 with energy 0.
pub fn strongest_column(energy: &[f64], tpl_width: usize) -> (usize, f64) {
    let start = tpl_width / 2;
    let end = energy.len().saturating_sub(tpl_width + tpl_width / 2);

    let mut best = (0usize, 0.0f64);
    for (x, &value) in energy.iter().enumerate().take(end).skip(start) {
        if value > best.1 {
            best = (x, value);
        }
    }
    best
}

/// Searches the background for the slot's column and row.
///
/// Returns `None` when the template does not fit or the strongest column's
/// energy does not exceed `cfg.min_energy`.
pub fn find_slot_by_gradient(
    background: ImageView<'_, u8>,
    template: ImageView<'_, u8>,
    cfg: &SlotConfig,
) -> Option<SlotCandidate> {
    slot_search(background, template, cfg).1
}

/// Like [`find_slot_by_gradient`] but also reports the winning column's
/// energy when it is rejected.
pub(crate) fn slot_search(
    background: ImageView<'_, u8>,
    template: ImageView<'_, u8>,
    cfg: &SlotConfig,
) -> (f64, Option<SlotCandidate>) {
    if background.width() < template.width() || background.height() < template.height() {
        return (0.0, None);
    }

    let energy = column_edge_energy(background);
    let (x, best_energy) = strongest_column(&energy, template.width());
    if best_energy <= cfg.min_energy {
        return (best_energy, None);
    }

    let y = best_row_at(background, template, x);
    (
        best_energy,
        Some(SlotCandidate {
            x,
            y,
            energy: best_energy,
        }),
    )
}
