use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
/// Possible `libplanar` errors
pub enum Error {
    /// Error returned when a file cannot be read or written
    #[error("i/o error")]
    Io(#[from] io::Error),
    /// Error returned when a planar buffer cannot be split into equal planes
    #[error("buffer of {len} bytes cannot be split into {planes} equal bitplanes")]
    PlaneLength {
        /// buffer length in bytes
        len: usize,
        /// requested number of bitplanes
        planes: usize,
    },
    /// Error returned when a single bitplane is too short for the requested raster
    #[error("bitplane of {plane_len} bytes cannot cover {pixels} pixels")]
    ShortPlane {
        /// length of one bitplane in bytes
        plane_len: usize,
        /// pixel count of the raster (width * height)
        pixels: usize,
    },
    /// Error returned when a pixel refers to a color the palette does not have
    #[error("palette index {index} out of range for a palette of {len} colors")]
    PaletteIndex {
        /// the offending index
        index: usize,
        /// number of colors in the palette
        len: usize,
    },
    /// Error returned for malformed or out-of-range caller configuration
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// Error returned when a scaled selection falls outside of the symbol sequence
    #[error("selection {start}..={stop} (x{multiplier}) is outside of {len} symbols")]
    SelectionOutOfBounds {
        /// first selected cell
        start: usize,
        /// last selected cell
        stop: usize,
        /// symbols per selected cell
        multiplier: usize,
        /// length of the symbol sequence
        len: usize,
    },
    /// Error returned when a string is not a two digit hex symbol
    #[error("invalid hex symbol {0:?}")]
    InvalidSymbol(String),
    /// Error returned when a string is not a three digit color code
    #[error("invalid color code {0:?}")]
    InvalidColorCode(String),
}

impl Error {
    /// Returns `true` for errors caused by the decoded data itself rather than by
    /// i/o or by caller configuration
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(
            self,
            Self::PlaneLength { .. } | Self::ShortPlane { .. } | Self::PaletteIndex { .. }
        )
    }
}
