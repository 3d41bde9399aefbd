//! Run detection over hex cells
//!
//! Palette indexed image blocks embedded in opaque data tend to show up as long
//! stretches of small values (first hex digit `0`) with the occasional accent.
//! [`filter_runs`] keeps those stretches and blanks out short ones, which makes
//! the blocks stand out when the cells are drawn.

use itertools::Itertools;

use crate::symbol::Symbol;

/// Value written over cells of a run that is too short to keep
pub const SENTINEL: &str = "0000";

fn starts_run(cell: &str) -> bool {
    cell.starts_with('0')
}

/// Replaces every run of `'0'`-leading cells shorter than `threshold` with [`SENTINEL`]
///
/// A run is a maximal stretch of cells whose first character is `'0'`. Runs are
/// kept or erased as a whole; a run that reaches the end of `cells` is judged like
/// any other. Cells outside of runs are passed through unchanged. With
/// `threshold <= 0` every run qualifies and the output equals the input.
///
/// The output always has the same length as `cells`.
#[must_use]
pub fn filter_runs<S: AsRef<str>>(cells: &[S], threshold: i64) -> Vec<String> {
    let min_len = usize::try_from(threshold).unwrap_or(0);
    let mut out = vec![SENTINEL.to_owned(); cells.len()];
    let mut run_start: Option<usize> = None;

    let close_run = |out: &mut [String], start: usize, end: usize| {
        if end - start >= min_len {
            for (slot, cell) in out[start..end].iter_mut().zip(&cells[start..end]) {
                cell.as_ref().clone_into(slot);
            }
        }
    };

    for (i, cell) in cells.iter().enumerate() {
        if starts_run(cell.as_ref()) {
            run_start.get_or_insert(i);
        } else {
            if let Some(start) = run_start.take() {
                close_run(&mut out[..], start, i);
            }
            cell.as_ref().clone_into(&mut out[i]);
        }
    }
    if let Some(start) = run_start {
        close_run(&mut out[..], start, cells.len());
    }
    out
}

/// Joins consecutive symbols into four digit cells, two symbols per cell
///
/// An odd trailing symbol becomes a two digit cell of its own.
#[must_use]
pub fn pair_cells(symbols: &[Symbol]) -> Vec<String> {
    symbols
        .iter()
        .chunks(2)
        .into_iter()
        .map(|pair| pair.map(Symbol::as_str).collect::<String>())
        .collect()
}
