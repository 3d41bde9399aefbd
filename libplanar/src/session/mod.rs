//! The state of one inspection session
//!
//! A [`Session`] owns the file being looked at together with everything derived
//! from it. Loading a file builds the complete replacement first and swaps it
//! in as a unit, so nothing computed from the previous file can be observed
//! afterwards.

mod color;
mod keys;

pub use color::{ColorAssigner, ColorCache, FixedColor, RandomColors};
pub use keys::{step_value, Key, KeyEvent, Modifier};

use std::{
    borrow::Cow,
    fmt::Debug,
    path::{Path, PathBuf},
};

use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::{
    config::{FrameGeometry, ViewConfig},
    image::{bitplane::composite, frame::Frame, palette::Rgb},
    selection::{cell_to_offset, export_range, extend_selection, write_range, Selection, SelectionMode},
    symbol::{decode, filter_pairs, has_filler_high_bytes, Symbol},
    view::{cell_color, render, DisplayMode, Grid},
    Error,
};

/// When to drop the filler high byte of every 16-bit value
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FilterPolicy {
    /// Never filter
    #[default]
    Off,
    /// Always filter
    On,
    /// Filter when no even-indexed byte of the file is non-zero
    Auto,
}

/// Numeric fields of [`ViewConfig`] that can be stepped with keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ConfigField {
    /// [`ViewConfig::row_width`]
    RowWidth,
    /// [`ViewConfig::offset`]
    Offset,
    /// [`ViewConfig::limit`]
    Limit,
}

/// A file and everything derived from it
#[derive(Debug, Default)]
struct Loaded {
    path: Option<PathBuf>,
    bytes: Vec<u8>,
    symbols: Vec<Symbol>,
    filler_high_bytes: bool,
    frame: Option<(FrameGeometry, Frame<u8>)>,
}

impl Loaded {
    fn new(path: Option<PathBuf>, bytes: Vec<u8>) -> Self {
        let symbols = decode(&bytes);
        let filler_high_bytes = !symbols.is_empty() && has_filler_high_bytes(&symbols);
        if filler_high_bytes {
            info!("Every high byte is 00, the byte pair filter probably applies");
        }
        Self {
            path,
            bytes,
            symbols,
            filler_high_bytes,
            frame: None,
        }
    }
}

/// One active file plus the view state around it
pub struct Session {
    loaded: Loaded,
    config: ViewConfig,
    mode: DisplayMode,
    filter: FilterPolicy,
    selection: Option<Selection>,
    colors: ColorCache,
    assigner: Box<dyn ColorAssigner>,
    last_dir: Option<PathBuf>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.loaded.path)
            .field("len", &self.loaded.bytes.len())
            .field("config", &self.config)
            .field("mode", &self.mode)
            .field("filter", &self.filter)
            .field("selection", &self.selection)
            .field("colors", &self.colors.len())
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RandomColors::default())
    }
}

impl Session {
    /// Creates an empty session that colors new values with `assigner`
    pub fn new(assigner: impl ColorAssigner + 'static) -> Self {
        Self {
            loaded: Loaded::default(),
            config: ViewConfig::default(),
            mode: DisplayMode::default(),
            filter: FilterPolicy::default(),
            selection: None,
            colors: ColorCache::default(),
            assigner: Box::new(assigner),
            last_dir: None,
        }
    }

    /// Reads `path` and makes it the active file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read. The previous file stays
    /// active in that case.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        self.last_dir = path.parent().map(Path::to_path_buf);
        self.install(Loaded::new(Some(path.to_path_buf()), bytes));
        Ok(())
    }

    /// Makes `bytes` the active file
    pub fn load_bytes(&mut self, bytes: Vec<u8>) {
        self.install(Loaded::new(None, bytes));
    }

    fn install(&mut self, loaded: Loaded) {
        let added = self
            .colors
            .assign_missing(loaded.symbols.iter(), self.assigner.as_mut());
        debug!("Assigned {added} new colors, {} known", self.colors.len());
        self.loaded = loaded;
        self.selection = None;
    }

    /// Path of the active file, if it was loaded from one
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.loaded.path.as_deref()
    }

    /// Directory of the last file loaded, the natural place to look for the next
    #[must_use]
    pub fn current_dir(&self) -> Option<&Path> {
        self.last_dir.as_deref()
    }

    /// Raw bytes of the active file
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.loaded.bytes
    }

    /// Symbols of the active file, unfiltered
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.loaded.symbols
    }

    /// Returns `true` if the views currently drop every even-indexed symbol
    #[must_use]
    pub const fn pairs_filtered(&self) -> bool {
        match self.filter {
            FilterPolicy::Off => false,
            FilterPolicy::On => true,
            FilterPolicy::Auto => self.loaded.filler_high_bytes,
        }
    }

    /// Symbols as the views see them, after the byte pair filter
    #[must_use]
    pub fn view_symbols(&self) -> Cow<'_, [Symbol]> {
        if self.pairs_filtered() {
            Cow::Owned(filter_pairs(&self.loaded.symbols))
        } else {
            Cow::Borrowed(&self.loaded.symbols)
        }
    }

    /// The current configuration
    #[must_use]
    pub const fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Replaces the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] and keeps the previous configuration if
    /// `config` is invalid
    pub fn set_config(&mut self, config: ViewConfig) -> Result<(), Error> {
        if let Err(e) = config.validate() {
            warn!("Rejected configuration: {e}");
            return Err(e);
        }
        self.config = config;
        Ok(())
    }

    /// Steps one numeric configuration field, see [`step_value`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the stepped value is out of range; the
    /// configuration is unchanged then
    pub fn step(&mut self, field: ConfigField, event: KeyEvent) -> Result<i64, Error> {
        let mut config = self.config;
        let value = match field {
            ConfigField::RowWidth => &mut config.row_width,
            ConfigField::Offset => &mut config.offset,
            ConfigField::Limit => &mut config.limit,
        };
        *value = step_value(*value, event);
        let stepped = *value;
        self.set_config(config)?;
        Ok(stepped)
    }

    /// The current display mode
    #[must_use]
    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Switches the display mode
    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    /// The current byte pair filter policy
    #[must_use]
    pub const fn filter_policy(&self) -> FilterPolicy {
        self.filter
    }

    /// Switches the byte pair filter policy
    pub fn set_filter_policy(&mut self, filter: FilterPolicy) {
        self.filter = filter;
    }

    /// Lays out the active file in the current mode
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the configuration is invalid
    pub fn grid(&self) -> Result<Grid, Error> {
        render(self.mode, &self.view_symbols(), &self.config)
    }

    /// Color of a cell of the current mode
    #[must_use]
    pub fn cell_color(&self, cell: &str) -> Rgb {
        cell_color(self.mode, cell, &self.colors)
    }

    /// Known value colors
    #[must_use]
    pub const fn colors(&self) -> &ColorCache {
        &self.colors
    }

    /// Forgets all value colors; values get new ones on the next load
    pub fn clear_colors(&mut self) {
        self.colors.clear();
    }

    /// Maps grid cell (`row`, `col`) to the cell address used by selections
    ///
    /// In hex mode this is a symbol index, in bit mode the symbol holding the bit
    /// and in palette mode the index of the two-symbol word (rounded down to a
    /// word boundary when the offset is odd).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the configuration is invalid
    pub fn point_at(&self, row: usize, col: usize) -> Result<usize, Error> {
        let layout = self.config.layout()?;
        let cell = cell_to_offset(row, col, layout.row_width);
        Ok(match self.mode {
            DisplayMode::Hex => layout.offset + cell,
            DisplayMode::Bit => (layout.offset + cell) / 8,
            DisplayMode::Palette => layout.offset / 2 + cell,
        })
    }

    /// Applies a picked cell to the selection and returns the new selection
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the configuration is invalid
    pub fn select(&mut self, row: usize, col: usize, mode: SelectionMode) -> Result<Selection, Error> {
        let point = self.point_at(row, col)?;
        let selection = extend_selection(self.selection, point, mode, self.config.run_threshold);
        debug!("Selection {}..={}", selection.start(), selection.stop());
        self.selection = Some(selection);
        Ok(selection)
    }

    /// Selects displayed cells `first..=last`, counted row by row from the top left
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the configuration is invalid or `last` is
    /// past the last displayed cell
    pub fn select_cells(&mut self, first: usize, last: usize) -> Result<Selection, Error> {
        let shown: usize = self.grid()?.rows.iter().map(|r| r.cells.len()).sum();
        if first.max(last) >= shown {
            return Err(Error::Validation(format!(
                "cell {} is not displayed, there are {shown} cells",
                first.max(last)
            )));
        }
        let selection = Selection::new(self.point_at(0, first)?, self.point_at(0, last)?);
        debug!("Selection {}..={}", selection.start(), selection.stop());
        self.selection = Some(selection);
        Ok(selection)
    }

    /// Sets the selection directly
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// The current selection
    #[must_use]
    pub const fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn require_selection(&self) -> Result<Selection, Error> {
        self.selection
            .ok_or_else(|| Error::Validation("nothing is selected".into()))
    }

    /// Raw bytes behind the current selection
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without a selection, or fails like
    /// [`export_range`]
    pub fn export_selection(&self) -> Result<Vec<u8>, Error> {
        export_range(
            &self.view_symbols(),
            self.require_selection()?,
            self.mode.multiplier(),
        )
    }

    /// Writes the raw bytes behind the current selection to `path`
    ///
    /// # Errors
    ///
    /// See [`Self::export_selection`] and [`write_range`]
    pub fn write_selection(&self, path: impl AsRef<Path>) -> Result<usize, Error> {
        write_range(
            path,
            &self.view_symbols(),
            self.require_selection()?,
            self.mode.multiplier(),
        )
    }

    /// Decodes the active file as a planar frame using the configured geometry
    ///
    /// The frame is kept until the file or the geometry changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an invalid geometry, or the format errors
    /// of [`composite`]
    pub fn frame(&mut self) -> Result<&Frame<u8>, Error> {
        let geometry = self.config.frame()?;
        let cached = self.loaded.frame.take().filter(|(g, _)| *g == geometry);
        let entry = match cached {
            Some(entry) => entry,
            None => {
                debug!("Compositing {geometry:?}");
                let frame = composite(
                    &self.loaded.bytes,
                    geometry.planes,
                    geometry.width,
                    geometry.height,
                )?;
                (geometry, frame)
            }
        };
        Ok(&self.loaded.frame.insert(entry).1)
    }

    /// Decodes the active file as a planar frame and resolves it with `palette`
    ///
    /// # Errors
    ///
    /// See [`Self::frame`] and [`Frame::to_rgb`]
    pub fn render_frame(&mut self, palette: &[Rgb]) -> Result<Frame<Rgb>, Error> {
        self.frame()?.to_rgb(palette)
    }

    /// Writes the plain text configuration dump to `path`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written
    pub fn dump_config_to(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        std::fs::write(path.as_ref(), self.config.dump())?;
        info!("Wrote settings dump to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(FixedColor(Rgb::new(1, 2, 3)))
    }

    #[test]
    fn load_colors_every_value() {
        let mut s = session();
        s.load_bytes(vec![0x00, 0x10, 0x10]);
        assert_eq!(s.colors().len(), 2);
        assert_eq!(s.cell_color("10"), Rgb::new(1, 2, 3));
        assert_eq!(s.cell_color("20"), Rgb::BLACK);
    }

    #[test]
    fn colors_survive_loads() {
        let mut s = Session::new(RandomColors::seeded(3));
        s.load_bytes(vec![0xAB]);
        let before = s.colors().get("AB");
        s.load_bytes(vec![0xAB, 0xCD]);
        assert_eq!(s.colors().get("AB"), before);
        assert_eq!(s.colors().len(), 2);
        s.clear_colors();
        assert!(s.colors().is_empty());
    }

    #[test]
    fn invalid_config_keeps_last_valid() {
        let mut s = session();
        let good = ViewConfig::builder().row_width(8).build();
        s.set_config(good).unwrap();
        let bad = ViewConfig::builder().row_width(0).build();
        assert!(s.set_config(bad).is_err());
        assert_eq!(s.config(), &good);
    }

    #[test]
    fn stepping_fields() {
        let mut s = session();
        let up = KeyEvent::new(Key::Up, Modifier::Control);
        assert_eq!(s.step(ConfigField::RowWidth, up).unwrap(), 32);
        assert_eq!(s.config().row_width, 32);
        let down = KeyEvent::new(Key::Down, Modifier::Shift);
        assert!(s.step(ConfigField::Offset, down).is_err());
        assert_eq!(s.config().offset, 0);
    }

    #[test]
    fn auto_filter_follows_file() {
        let mut s = session();
        s.set_filter_policy(FilterPolicy::Auto);
        s.load_bytes(vec![0x00, 0x05, 0x00, 0x06]);
        assert!(s.pairs_filtered());
        assert_eq!(&*s.view_symbols(), &decode(&[0x05, 0x06])[..]);
        s.load_bytes(vec![0x01, 0x05, 0x00, 0x06]);
        assert!(!s.pairs_filtered());
        assert_eq!(s.view_symbols().len(), 4);
    }

    #[test]
    fn select_and_export_in_palette_mode() {
        let mut s = session();
        s.load_bytes((0..16).collect());
        s.set_mode(DisplayMode::Palette);
        s.set_config(ViewConfig::builder().row_width(4).build()).unwrap();
        s.select(0, 1, SelectionMode::Replace).unwrap();
        let sel = s.select(0, 2, SelectionMode::Extend).unwrap();
        assert_eq!((sel.start(), sel.stop()), (1, 2));
        assert_eq!(s.export_selection().unwrap(), [2, 3, 4, 5]);
    }

    fn sixteen_bytes(mode: DisplayMode, offset: i64) -> Session {
        let mut s = session();
        s.load_bytes((0..16).collect());
        s.set_mode(mode);
        s.set_config(
            ViewConfig::builder()
                .row_width(4)
                .offset(offset)
                .run_threshold(0)
                .build(),
        )
        .unwrap();
        s
    }

    #[test]
    fn odd_palette_offset_exports_the_shown_word() {
        let mut s = sixteen_bytes(DisplayMode::Palette, 1);
        let shown = s.grid().unwrap().cell(0, 0).unwrap().to_owned();
        s.select(0, 0, SelectionMode::Replace).unwrap();
        assert_eq!(shown, "0001");
        assert_eq!(s.export_selection().unwrap(), [0x00, 0x01]);

        let shown = s.grid().unwrap().cell(1, 2).unwrap().to_owned();
        s.select(1, 2, SelectionMode::Replace).unwrap();
        assert_eq!(shown, "0C0D");
        assert_eq!(s.export_selection().unwrap(), [0x0C, 0x0D]);
    }

    #[test]
    fn hex_offset_exports_the_shown_symbol() {
        let mut s = sixteen_bytes(DisplayMode::Hex, 5);
        assert_eq!(s.grid().unwrap().cell(1, 1), Some("0A"));
        s.select(1, 1, SelectionMode::Replace).unwrap();
        s.select(1, 3, SelectionMode::Extend).unwrap();
        assert_eq!(s.export_selection().unwrap(), [0x0A, 0x0B, 0x0C]);
    }

    #[test]
    fn selecting_displayed_cells_follows_the_view() {
        let mut s = sixteen_bytes(DisplayMode::Hex, 4);
        let sel = s.select_cells(1, 2).unwrap();
        assert_eq!((sel.start(), sel.stop()), (5, 6));
        assert_eq!(s.export_selection().unwrap(), [5, 6]);
        assert!(matches!(s.select_cells(0, 12), Err(Error::Validation(_))));

        let mut s = sixteen_bytes(DisplayMode::Palette, 3);
        s.select_cells(0, 1).unwrap();
        assert_eq!(s.export_selection().unwrap(), [2, 3, 4, 5]);
    }

    #[test]
    fn export_without_selection_fails() {
        let mut s = session();
        s.load_bytes(vec![1, 2, 3]);
        assert!(matches!(s.export_selection(), Err(Error::Validation(_))));
    }

    #[test]
    fn loading_drops_frame_and_selection() {
        let mut s = session();
        s.set_config(
            ViewConfig::builder()
                .planes(1)
                .frame_width(8)
                .frame_height(1)
                .build(),
        )
        .unwrap();
        s.load_bytes(vec![0xF0]);
        assert_eq!(s.frame().unwrap().pixels(), [1, 1, 1, 1, 0, 0, 0, 0]);
        s.set_selection(Some(Selection::point(0)));
        s.load_bytes(vec![0x0F]);
        assert_eq!(s.selection(), None);
        assert_eq!(s.frame().unwrap().pixels(), [0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn geometry_change_recomposites() {
        let mut s = session();
        s.load_bytes(vec![0b1100_0000, 0b1000_0000]);
        let one = ViewConfig::builder().planes(1).frame_width(16).frame_height(1).build();
        s.set_config(one).unwrap();
        assert_eq!(s.frame().unwrap().width(), 16);
        let two = ViewConfig::builder().planes(2).frame_width(8).frame_height(1).build();
        s.set_config(two).unwrap();
        assert_eq!(&s.frame().unwrap().pixels()[..2], [3, 2]);
    }

    #[test]
    fn oversized_frame_is_an_error() {
        let mut s = session();
        s.load_bytes(vec![0; 2]);
        let huge = ViewConfig::builder()
            .planes(1)
            .frame_width(i64::MAX)
            .frame_height(4)
            .build();
        s.set_config(huge).unwrap();
        assert!(matches!(s.frame(), Err(Error::Validation(_))));
    }

    #[test]
    fn frame_errors_surface() {
        let mut s = session();
        s.load_bytes(vec![0; 7]);
        assert!(s.frame().unwrap_err().is_format());
    }
}
