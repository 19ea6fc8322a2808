//! Row-wise fill helper shared by the per-pixel stages.
//!
//! Every stage that writes one output row from read-only inputs goes through
//! [`fill_rows`], so the sequential and the rayon paths run the same row
//! closure and produce identical buffers.

/// Fills `out` row by row, in parallel when `parallel` is set and the `rayon`
/// feature is compiled in.
pub(crate) fn fill_rows<T, F>(out: &mut [T], width: usize, parallel: bool, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if width == 0 {
        return;
    }

    #[cfg(feature = "rayon")]
    {
        if parallel {
            use rayon::prelude::*;
            out.par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
            return;
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    for (y, row) in out.chunks_mut(width).enumerate() {
        f(y, row);
    }
}

#[cfg(test)]
mod tests {
    use super::fill_rows;

    #[test]
    fn fill_rows_visits_every_row_once() {
        let width = 3;
        let mut out = vec![0usize; width * 4];
        fill_rows(&mut out, width, false, |y, row| {
            for (x, value) in row.iter_mut().enumerate() {
                *value = y * 10 + x;
            }
        });
        assert_eq!(out, vec![0, 1, 2, 10, 11, 12, 20, 21, 22, 30, 31, 32]);
    }

    #[test]
    fn parallel_flag_gives_same_buffer() {
        let width = 7;
        let fill = |y: usize, row: &mut [u32]| {
            for (x, value) in row.iter_mut().enumerate() {
                *value = (x as u32).wrapping_mul(31) ^ (y as u32);
            }
        };
        let mut seq = vec![0u32; width * 9];
        let mut par = vec![0u32; width * 9];
        fill_rows(&mut seq, width, false, fill);
        fill_rows(&mut par, width, true, fill);
        assert_eq!(seq, par);
    }
}
