//! Grid views of a symbol sequence
//!
//! Every [`DisplayMode`] has its own pure layout function. [`render`] picks one
//! based on the mode and a [`ViewConfig`]; [`cell_color`] decides how a cell of
//! that mode is painted.

use itertools::Itertools;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::trace;

use crate::{
    config::{Layout, ViewConfig},
    image::palette::{decode_color, Rgb},
    runs::{filter_runs, pair_cells},
    session::ColorCache,
    symbol::Symbol,
    Error,
};

/// The different ways a symbol sequence can be laid out
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisplayMode {
    /// One cell per symbol, colored by value
    #[default]
    Hex,
    /// One cell per bit, black or white
    Bit,
    /// One cell per two symbols, read as a color word and run filtered
    Palette,
}

impl DisplayMode {
    /// Size of a cell relative to the configured cell size
    #[must_use]
    pub const fn scale(self) -> f32 {
        match self {
            Self::Hex => 1.0,
            Self::Bit => 0.2,
            Self::Palette => 0.5,
        }
    }

    /// Number of symbols a selected cell stands for when exporting
    #[must_use]
    pub const fn multiplier(self) -> usize {
        match self {
            Self::Hex | Self::Bit => 1,
            Self::Palette => 2,
        }
    }
}

/// A single row of a [`Grid`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Row counter shown next to the row, `row_index * row_width`
    pub label: usize,
    /// Cell texts
    pub cells: Vec<String>,
}

/// Rows of cells ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// The mode the grid was laid out for
    pub mode: DisplayMode,
    /// The rows, top to bottom
    pub rows: Vec<Row>,
}

impl Grid {
    fn from_cells(mode: DisplayMode, cells: impl Iterator<Item = String>, row_width: usize) -> Self {
        let rows = cells
            .chunks(row_width)
            .into_iter()
            .enumerate()
            .map(|(i, row)| Row {
                label: i * row_width,
                cells: row.collect(),
            })
            .collect();
        Self { mode, rows }
    }

    /// Cell size multiplier of the grid's mode
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.mode.scale()
    }

    /// Returns the number of cells in the longest row
    #[must_use]
    pub fn max_row_len(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Returns the cell at (`row`, `col`)
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.cells.get(col))
            .map(String::as_str)
    }
}

/// End of the displayed part of `len` symbols; `limit == 0` shows everything
const fn limit_end(len: usize, limit: usize) -> usize {
    if limit == 0 || limit > len {
        len
    } else {
        limit
    }
}

/// Lays out symbols `offset..limit` in rows of `row_width` cells
#[must_use]
pub fn hex_grid(symbols: &[Symbol], row_width: usize, offset: usize, limit: usize) -> Grid {
    let end = limit_end(symbols.len(), limit);
    let shown = symbols.get(offset..end).unwrap_or_default();
    Grid::from_cells(
        DisplayMode::Hex,
        shown.iter().map(ToString::to_string),
        row_width.max(1),
    )
}

/// Expands symbols `..limit` to their bits, most significant first, and lays the
/// bits out from bit `offset` in rows of `row_width` cells
#[must_use]
pub fn bit_grid(symbols: &[Symbol], row_width: usize, offset: usize, limit: usize) -> Grid {
    let end = limit_end(symbols.len(), limit);
    let bits = symbols[..end]
        .iter()
        .flat_map(|s| (0..8).rev().map(move |b| (s.byte() >> b) & 1))
        .skip(offset)
        .map(|bit| bit.to_string());
    Grid::from_cells(DisplayMode::Bit, bits, row_width.max(1))
}

/// Pairs symbols `offset..limit` into color words, run filters them with
/// `threshold` and lays them out in rows of `row_width` cells
///
/// Words start on even symbols, an odd `offset` is rounded down.
#[must_use]
pub fn palette_grid(
    symbols: &[Symbol],
    row_width: usize,
    offset: usize,
    limit: usize,
    threshold: i64,
) -> Grid {
    let end = limit_end(symbols.len(), limit);
    let shown = symbols.get(offset - offset % 2..end).unwrap_or_default();
    let words = filter_runs(&pair_cells(shown), threshold);
    Grid::from_cells(DisplayMode::Palette, words.into_iter(), row_width.max(1))
}

/// Lays out `symbols` the way `mode` and `config` ask for
///
/// # Errors
///
/// Returns [`Error::Validation`] if `config` is invalid
pub fn render(mode: DisplayMode, symbols: &[Symbol], config: &ViewConfig) -> Result<Grid, Error> {
    let Layout {
        row_width,
        offset,
        limit,
    } = config.layout()?;
    trace!("Rendering {mode} grid, width {row_width}, offset {offset}, limit {limit}");
    Ok(match mode {
        DisplayMode::Hex => hex_grid(symbols, row_width, offset, limit),
        DisplayMode::Bit => bit_grid(symbols, row_width, offset, limit),
        DisplayMode::Palette => {
            palette_grid(symbols, row_width, offset, limit, config.run_threshold)
        }
    })
}

/// Returns the color a cell of `mode` is painted with
///
/// - hex cells use the color cache, black for values never seen
/// - bit cells are black for `0`, white otherwise
/// - palette cells starting with `0` are read as a color word, anything else
///   (including malformed words) is black
#[must_use]
pub fn cell_color(mode: DisplayMode, cell: &str, colors: &ColorCache) -> Rgb {
    match mode {
        DisplayMode::Hex => colors.get(cell).unwrap_or(Rgb::BLACK),
        DisplayMode::Bit if cell == "0" => Rgb::BLACK,
        DisplayMode::Bit => Rgb::WHITE,
        DisplayMode::Palette => cell
            .strip_prefix('0')
            .and_then(|code| decode_color(code).ok())
            .unwrap_or(Rgb::BLACK),
    }
}
