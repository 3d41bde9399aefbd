use std::fmt::Display;

use tracing::debug;

use crate::Error;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// A single byte rendered as two uppercase hex digits
///
/// A [`Symbol`] keeps the byte it was created from, so the mapping back to raw
/// data never needs to re-parse its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    byte: u8,
    text: [u8; 2],
}

impl Symbol {
    /// Creates the symbol for `byte`
    #[must_use]
    pub const fn new(byte: u8) -> Self {
        Self {
            byte,
            text: [
                HEX_DIGITS[(byte >> 4) as usize],
                HEX_DIGITS[(byte & 0x0F) as usize],
            ],
        }
    }

    /// Returns the byte this symbol represents
    #[must_use]
    pub const fn byte(self) -> u8 {
        self.byte
    }

    /// Returns the two digit hex text of this symbol, e.g. `"0A"`
    #[must_use]
    pub fn as_str(&self) -> &str {
        // only ever built from HEX_DIGITS
        std::str::from_utf8(&self.text).unwrap_or_default()
    }

    /// Returns `true` if the first hex digit is `'0'`, i.e. the byte is below `0x10`
    #[must_use]
    pub const fn is_near_zero(self) -> bool {
        self.text[0] == b'0'
    }
}

impl From<u8> for Symbol {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Symbol> for u8 {
    fn from(value: Symbol) -> Self {
        value.byte
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps every byte of `buffer` to its [`Symbol`], preserving order
///
/// The result always has the same length as `buffer`.
#[must_use]
pub fn decode(buffer: &[u8]) -> Vec<Symbol> {
    buffer.iter().copied().map(Symbol::new).collect()
}

/// Maps symbols back to the bytes they were decoded from
#[must_use]
pub fn encode(symbols: &[Symbol]) -> Vec<u8> {
    symbols.iter().map(|s| s.byte()).collect()
}

/// Parses two hex digits (either case) into a byte
///
/// # Errors
///
/// Returns [`Error::InvalidSymbol`] if `text` is not exactly two hex digits
pub fn parse_symbol(text: &str) -> Result<u8, Error> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidSymbol(text.to_owned()));
    }
    u8::from_str_radix(text, 16).map_err(|_| Error::InvalidSymbol(text.to_owned()))
}

/// Drops every even-indexed symbol, keeping positions 1, 3, 5, ...
///
/// This assumes the file stores 16-bit values whose high byte is filler. Whether
/// that holds is up to the caller, see [`has_filler_high_bytes`].
#[must_use]
pub fn filter_pairs<T: Clone>(symbols: &[T]) -> Vec<T> {
    symbols.iter().skip(1).step_by(2).cloned().collect()
}

/// Returns `true` if every even-indexed symbol is `00`
///
/// A single counterexample is enough to reject the byte-pair heuristic. An empty
/// sequence has no counterexample.
#[must_use]
pub fn has_filler_high_bytes(symbols: &[Symbol]) -> bool {
    let counterexample = symbols
        .iter()
        .step_by(2)
        .position(|s| s.byte() != 0);
    if let Some(i) = counterexample {
        debug!("High byte at symbol {} is not filler", i * 2);
    }
    counterexample.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_maps_to_two_uppercase_digits() {
        let all: Vec<u8> = (0..=u8::MAX).collect();
        let symbols = decode(&all);
        assert_eq!(symbols.len(), all.len());
        for (byte, symbol) in all.iter().zip(&symbols) {
            assert_eq!(symbol.as_str(), format!("{byte:02X}"));
            assert_eq!(parse_symbol(symbol.as_str()).unwrap(), *byte);
        }
        assert_eq!(encode(&symbols), all);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert!(decode(&[]).is_empty());
        assert!(filter_pairs::<Symbol>(&[]).is_empty());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_symbol("0").is_err());
        assert!(parse_symbol("0G").is_err());
        assert!(parse_symbol("+1").is_err());
        assert!(parse_symbol("123").is_err());
        assert_eq!(parse_symbol("ff").unwrap(), 0xFF);
    }

    #[test]
    fn filter_keeps_odd_positions() {
        let symbols = decode(&[0x00, 0x12, 0x00, 0x34, 0x00]);
        let filtered = filter_pairs(&symbols);
        assert_eq!(filtered, decode(&[0x12, 0x34]));
        assert_eq!(filtered.len(), symbols.len() / 2);
    }

    #[test]
    fn filler_heuristic_needs_one_counterexample() {
        assert!(has_filler_high_bytes(&decode(&[0x00, 0xFF, 0x00, 0x01])));
        assert!(!has_filler_high_bytes(&decode(&[0x00, 0xFF, 0x01, 0x01])));
        assert!(has_filler_high_bytes(&[]));
    }

    #[test]
    fn near_zero_is_first_digit_zero() {
        assert!(Symbol::new(0x0F).is_near_zero());
        assert!(!Symbol::new(0x10).is_near_zero());
    }
}
