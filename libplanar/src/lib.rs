//! # libplanar
//!
//!
//! This library provides the decoding core for inspecting undocumented binary game assets, in
//! particular the planar (bitplane interleaved) images used by Amiga era titles.
//!
//! It does not know any file format. Files are treated as headerless byte blobs and the caller
//! decides how to look at them: as a grid of hex symbols, as a grid of bits, as color words, or as
//! a number of bitplanes making up a fixed size frame. Encoding frames to image files is left to
//! the caller as well; see the `planview` crate for a command line front end using the [`image`](https://docs.rs/image)
//! crate.
//!
//! ### Planar images
//!
//! A planar image of `n` bitplanes stores `n` full resolution one-bit layers one after the other.
//! Pixel `p` takes bit `p` (most significant bit first within each byte) of every plane; plane 0
//! contributes the most significant bit of the resulting palette index.
//!
//! Colors are stored as three hex digits, one per channel, and each digit is replicated into both
//! nibbles of its channel (`D01` is `#DD0011`).
//!
//! ### Usage
//!
//! #### Converting a planar frame to a png image
//!
//! ```rust
//! use image::{codecs::png::PngEncoder, ImageEncoder};
//! use libplanar::image::{composite, DEFAULT_PALETTE};
//!
//! fn main() -> anyhow::Result<()> {
//!     // 5 bitplanes of a 16x2 frame, 4 bytes each
//!     let planar: Vec<u8> = (0..20).collect();
//!
//!     let frame = composite(&planar, 5, 16, 2)?;
//!     let as_rgb = frame.to_rgb(&DEFAULT_PALETTE)?.to_rgb8_bytes();
//!
//!     let mut png = Vec::new();
//!     PngEncoder::new(&mut png).write_image(
//!         &as_rgb,
//!         frame.width() as u32,
//!         frame.height() as u32,
//!         image::ExtendedColorType::Rgb8,
//!     )?;
//!     Ok(())
//! }
//! ```
//!
//! #### Looking for embedded image blocks
//!
//! Palette indexed blocks show up as long runs of small values. The palette view pairs symbols
//! into color words and blanks out runs shorter than the configured threshold:
//!
//! ```rust
//! use libplanar::{view::{render, DisplayMode}, symbol::decode, ViewConfig};
//!
//! let symbols = decode(&[0x00, 0x00, 0x00, 0x50, 0xFF, 0x00, 0x00, 0x00]);
//! let config = ViewConfig::builder().row_width(4).run_threshold(2).build();
//! let grid = render(DisplayMode::Palette, &symbols, &config).unwrap();
//! assert_eq!(grid.rows[0].cells, ["0000", "0050", "FF00", "0000"]);
//! ```
//!

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

mod config;
mod error;
/// Module containing planar frame types and color handling
pub mod image;
pub mod runs;
/// Selections of cells and export of the bytes behind them
pub mod selection;
pub mod session;
/// Byte to hex symbol mapping
pub mod symbol;
pub mod view;

pub use config::{FrameGeometry, Layout, ViewConfig};
pub use error::Error;
pub use image::Frame;
pub use image::Rgb;
pub use session::Session;
pub use symbol::Symbol;
pub use view::DisplayMode;
