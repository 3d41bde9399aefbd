#![allow(clippy::module_name_repetitions)]

/// Bitplane deinterleaving
pub mod bitplane;
/// Raster frames of palette indices or colors
pub mod frame;
/// Compact color codes and palettes
pub mod palette;

pub use bitplane::{composite, Planes};
pub use frame::Frame;
pub use palette::{decode_color, decode_palette, Rgb, DEFAULT_PALETTE};
