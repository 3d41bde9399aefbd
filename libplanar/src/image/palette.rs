use std::{fmt::Display, path::Path};

use tracing::{debug, warn};

use crate::{runs::pair_cells, symbol::decode, Error};

/// An 8-bit per channel color
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rgb {
    /// red channel
    pub r: u8,
    /// green channel
    pub g: u8,
    /// blue channel
    pub b: u8,
}

impl Rgb {
    /// Black
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);

    /// Creates a new [`Rgb`]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(value: Rgb) -> Self {
        [value.r, value.g, value.b]
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Palette used by 5-bitplane 320x200 asset frames when no palette file is given
pub const DEFAULT_PALETTE: [Rgb; 35] = {
    const BLACK: Rgb = Rgb::new(0, 0, 0);
    const DARK_GRAY: Rgb = Rgb::new(48, 48, 48);
    const GRAY: Rgb = Rgb::new(64, 64, 64);
    const DARK_RED: Rgb = Rgb::new(96, 0, 0);
    const RED: Rgb = Rgb::new(160, 0, 0);
    const SCARLET: Rgb = Rgb::new(209, 1, 0);
    [
        BLACK, DARK_GRAY, GRAY, DARK_RED, RED, SCARLET, //
        BLACK, DARK_GRAY, GRAY, DARK_RED, RED, SCARLET, //
        BLACK, DARK_GRAY, GRAY, DARK_RED, RED, SCARLET, //
        BLACK, DARK_GRAY, GRAY, DARK_RED, RED, SCARLET, //
        BLACK, DARK_GRAY, GRAY, DARK_RED, RED, SCARLET, //
        DARK_GRAY, GRAY, DARK_RED, RED, SCARLET,
    ]
};

fn nibble(digit: u8) -> Option<u8> {
    char::from(digit)
        .to_digit(16)
        .and_then(|d| u8::try_from(d).ok())
}

/// Decodes a three hex digit color code (`RGB`, one digit per channel)
///
/// Each digit is replicated into both nibbles of its channel, so `"D01"` becomes
/// `(0xDD, 0x00, 0x11)`. This is not the same as scaling 4 bits to 8 bits.
///
/// # Errors
///
/// Returns [`Error::InvalidColorCode`] if `code` is not exactly three hex digits
pub fn decode_color(code: &str) -> Result<Rgb, Error> {
    let invalid = || Error::InvalidColorCode(code.to_owned());
    let [r, g, b] = <[u8; 3]>::try_from(code.as_bytes()).map_err(|_| invalid())?;
    let channel = |digit| nibble(digit).map(|d| (d << 4) | d).ok_or_else(invalid);
    Ok(Rgb::new(channel(r)?, channel(g)?, channel(b)?))
}

/// Decodes a list of color codes, keeping their order (slot `i` holds color `i`)
///
/// # Errors
///
/// Fails on the first code [`decode_color`] rejects
pub fn decode_palette<S: AsRef<str>>(codes: &[S]) -> Result<Vec<Rgb>, Error> {
    codes.iter().map(|c| decode_color(c.as_ref())).collect()
}

/// Decodes a palette stored as raw color words, two bytes per color
///
/// Each pair of bytes is read as four hex digits; the last three are the color
/// code, the first digit is ignored. A trailing odd byte is dropped.
#[must_use]
pub fn palette_from_bytes(bytes: &[u8]) -> Vec<Rgb> {
    if bytes.len() % 2 != 0 {
        warn!("Palette data has an odd length, dropping last byte");
    }
    pair_cells(&decode(&bytes[..bytes.len() - bytes.len() % 2]))
        .iter()
        .filter_map(|word| decode_color(&word[1..]).ok())
        .collect()
}

/// Reads and decodes a palette file, see [`palette_from_bytes`]
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read
pub fn load_palette_file<P: AsRef<Path>>(path: P) -> Result<Vec<Rgb>, Error> {
    let bytes = std::fs::read(path.as_ref())?;
    let palette = palette_from_bytes(&bytes);
    debug!(
        "Read {} colors from {}",
        palette.len(),
        path.as_ref().display()
    );
    Ok(palette)
}
