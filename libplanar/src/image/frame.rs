use crate::{image::palette::Rgb, Error};

/// A row-major `width * height` raster
///
/// `Frame<u8>` holds palette indices as produced by
/// [`crate::image::bitplane::composite`]; `Frame<Rgb>` holds the colors those
/// indices resolve to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Frame<T> {
    /// The width of the frame
    width: usize,
    /// The height of the frame
    height: usize,
    /// Frame pixels
    pixels: Vec<T>,
}

impl<T> Frame<T> {
    /// Only called with `pixels.len() == width * height`
    pub(crate) const fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wraps row-major `pixels` as a `width * height` frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the number of pixels does not match the
    /// dimensions
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<T>) -> Result<Self, Error> {
        if width.checked_mul(height) != Some(pixels.len()) {
            return Err(Error::Validation(format!(
                "{} pixels do not make a {width}x{height} frame",
                pixels.len()
            )));
        }
        Ok(Self::new(width, height, pixels))
    }

    /// Returns the width of the frame
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the frame
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns all pixels, row by row
    #[must_use]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    /// Returns the pixel at (`x`, `y`), or `None` outside of the frame
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.pixels.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Returns an entire row of the frame
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y < self.height {
            let start_index = y * self.width;
            self.pixels.get(start_index..start_index + self.width)
        } else {
            None
        }
    }
}

impl Frame<u8> {
    /// Resolves every palette index to its color
    ///
    /// # Errors
    ///
    /// Returns [`Error::PaletteIndex`] for the first index that `palette` has no
    /// color for. No partial frame is produced.
    pub fn to_rgb(&self, palette: &[Rgb]) -> Result<Frame<Rgb>, Error> {
        let pixels = self
            .pixels
            .iter()
            .map(|&i| {
                palette.get(usize::from(i)).copied().ok_or(Error::PaletteIndex {
                    index: usize::from(i),
                    len: palette.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Frame::new(self.width, self.height, pixels))
    }

    /// Returns the highest palette index used by the frame
    #[must_use]
    pub fn max_index(&self) -> Option<u8> {
        self.pixels.iter().copied().max()
    }
}

impl Frame<Rgb> {
    /// Flattens the frame into `[r, g, b, r, g, b, ...]`, the layout image encoders expect
    #[must_use]
    pub fn to_rgb8_bytes(&self) -> Vec<u8> {
        self.pixels.iter().copied().flat_map(<[u8; 3]>::from).collect()
    }
}
