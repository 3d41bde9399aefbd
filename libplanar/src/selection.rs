use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{debug, info};

use crate::{
    symbol::{encode, Symbol},
    Error,
};

/// Returns the flattened address of grid cell (`row`, `col`)
#[must_use]
pub const fn cell_to_offset(row: usize, col: usize, row_width: usize) -> usize {
    row * row_width + col
}

/// How a newly picked cell changes the current [`Selection`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SelectionMode {
    /// Collapse the selection to the picked cell
    #[default]
    Replace,
    /// Grow the selection up to the picked cell
    Extend,
    /// Select a run-threshold long block starting at the picked cell
    Block,
}

/// An inclusive range of cells, `start <= stop` always holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    start: usize,
    stop: usize,
}

impl Selection {
    /// Creates a selection covering `a..=b` (or `b..=a`)
    #[must_use]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            stop: a.max(b),
        }
    }

    /// Creates a selection of a single cell
    #[must_use]
    pub const fn point(at: usize) -> Self {
        Self {
            start: at,
            stop: at,
        }
    }

    /// First selected cell
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Last selected cell (inclusive)
    #[must_use]
    pub const fn stop(&self) -> usize {
        self.stop
    }

    /// Number of selected cells
    #[must_use]
    pub const fn len(&self) -> usize {
        self.stop - self.start + 1
    }

    /// A selection always covers at least one cell
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Applies a newly picked cell to the selection
    ///
    /// - [`SelectionMode::Replace`] collapses to `point`
    /// - [`SelectionMode::Extend`] moves the stop to `point`; if `point` lies before
    ///   the start, the old start becomes the stop and `point` the new start
    /// - [`SelectionMode::Block`] selects `threshold` cells starting at `point`
    ///   (a single cell for `threshold <= 1`)
    #[must_use]
    pub fn extend(self, point: usize, mode: SelectionMode, threshold: i64) -> Self {
        match mode {
            SelectionMode::Replace => Self::point(point),
            SelectionMode::Extend if point < self.start => Self {
                start: point,
                stop: self.start,
            },
            SelectionMode::Extend => Self {
                start: self.start,
                stop: point,
            },
            SelectionMode::Block => {
                let len = usize::try_from(threshold).unwrap_or(0).max(1);
                Self {
                    start: point,
                    stop: point.saturating_add(len - 1),
                }
            }
        }
    }
}

/// Applies `point` to an optional current selection, see [`Selection::extend`]
///
/// Without a current selection every mode starts from `point` itself.
#[must_use]
pub fn extend_selection(
    current: Option<Selection>,
    point: usize,
    mode: SelectionMode,
    threshold: i64,
) -> Selection {
    current
        .unwrap_or_else(|| Selection::point(point))
        .extend(point, mode, threshold)
}

/// Maps a selection of cells back to the raw bytes behind it
///
/// Every cell stands for `multiplier` symbols (2 when cells are palette words), so
/// symbols `start * multiplier .. (stop + 1) * multiplier` are exported.
///
/// # Errors
///
/// Returns [`Error::SelectionOutOfBounds`] if the scaled range does not fit in
/// `symbols`, and [`Error::Validation`] for a zero multiplier
pub fn export_range(
    symbols: &[Symbol],
    selection: Selection,
    multiplier: usize,
) -> Result<Vec<u8>, Error> {
    if multiplier == 0 {
        return Err(Error::Validation("multiplier must be at least 1".into()));
    }
    let out_of_bounds = || Error::SelectionOutOfBounds {
        start: selection.start,
        stop: selection.stop,
        multiplier,
        len: symbols.len(),
    };
    let begin = selection
        .start
        .checked_mul(multiplier)
        .ok_or_else(out_of_bounds)?;
    let end = selection
        .stop
        .checked_add(1)
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(out_of_bounds)?;
    let range = symbols.get(begin..end).ok_or_else(out_of_bounds)?;
    debug!("Exporting symbols {begin}..{end}");
    Ok(encode(range))
}

/// Writes the bytes behind `selection` to `path`, replacing any existing file
///
/// # Errors
///
/// Fails like [`export_range`], or with [`Error::Io`] if the file cannot be written
pub fn write_range(
    path: impl AsRef<Path>,
    symbols: &[Symbol],
    selection: Selection,
    multiplier: usize,
) -> Result<usize, Error> {
    let bytes = export_range(symbols, selection, multiplier)?;
    let f = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path.as_ref())?;
    let mut f = BufWriter::new(f);
    f.write_all(&bytes)?;
    f.flush()?;
    info!(
        "Wrote {} bytes to {}",
        bytes.len(),
        path.as_ref().display()
    );
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::decode;

    #[test]
    fn cell_offsets_are_row_major() {
        assert_eq!(cell_to_offset(0, 0, 16), 0);
        assert_eq!(cell_to_offset(2, 3, 16), 35);
        assert_eq!(cell_to_offset(1, 0, 1), 1);
    }

    #[test]
    fn replace_collapses() {
        let s = Selection::new(3, 9).extend(5, SelectionMode::Replace, 32);
        assert_eq!(s, Selection::point(5));
    }

    #[test]
    fn extend_grows_forward() {
        let s = Selection::point(4).extend(10, SelectionMode::Extend, 0);
        assert_eq!((s.start(), s.stop()), (4, 10));
        let s = s.extend(7, SelectionMode::Extend, 0);
        assert_eq!((s.start(), s.stop()), (4, 7));
    }

    #[test]
    fn extend_backwards_swaps() {
        let s = Selection::new(4, 10).extend(1, SelectionMode::Extend, 0);
        assert_eq!((s.start(), s.stop()), (1, 4));
        assert!(s.start() <= s.stop());
    }

    #[test]
    fn block_uses_threshold_as_length() {
        let s = extend_selection(None, 6, SelectionMode::Block, 8);
        assert_eq!((s.start(), s.stop(), s.len()), (6, 13, 8));
        let s = extend_selection(Some(s), 2, SelectionMode::Block, 0);
        assert_eq!(s, Selection::point(2));
    }

    #[test]
    fn modes_parse_from_strings() {
        assert_eq!("extend".parse::<SelectionMode>().unwrap(), SelectionMode::Extend);
        assert_eq!("Block".parse::<SelectionMode>().unwrap(), SelectionMode::Block);
        assert_eq!(SelectionMode::Replace.to_string(), "replace");
    }

    #[test]
    fn export_reproduces_sub_range() {
        let bytes: Vec<u8> = (0..32).collect();
        let symbols = decode(&bytes);
        for multiplier in 1..=2 {
            let s = Selection::new(3, 7);
            let out = export_range(&symbols, s, multiplier).unwrap();
            assert_eq!(out, &bytes[3 * multiplier..8 * multiplier]);
            assert_eq!(decode(&out), &symbols[3 * multiplier..8 * multiplier]);
        }
    }

    #[test]
    fn export_rejects_scaled_overflow() {
        let symbols = decode(&[0; 10]);
        assert!(export_range(&symbols, Selection::new(0, 9), 1).is_ok());
        assert!(matches!(
            export_range(&symbols, Selection::new(0, 9), 2),
            Err(Error::SelectionOutOfBounds { len: 10, .. })
        ));
        assert!(export_range(&symbols, Selection::point(10), 1).is_err());
        assert!(export_range(&symbols, Selection::point(usize::MAX / 2), 4).is_err());
        assert!(matches!(
            export_range(&symbols, Selection::point(0), 0),
            Err(Error::Validation(_))
        ));
    }
}
