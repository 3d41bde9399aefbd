use bon::Builder;

use crate::{image::bitplane::MAX_PLANES, Error};

/// Integer configuration supplied by whatever drives the view
///
/// Values are kept signed so that nonsense input (like a negative row width)
/// can be represented and rejected by [`ViewConfig::validate`] instead of
/// wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct ViewConfig {
    /// Cells per grid row
    #[builder(default = 16)]
    pub row_width: i64,
    /// Edge length of a cell in pixels, before the mode's scale is applied
    #[builder(default = 20)]
    pub cell_size: i64,
    /// First symbol (bit, in bit mode) shown
    #[builder(default = 0)]
    pub offset: i64,
    /// Number of symbols shown, 0 for all of them
    #[builder(default = 0)]
    pub limit: i64,
    /// Minimum run length kept by the run filter in palette mode
    #[builder(default = 32)]
    pub run_threshold: i64,
    /// Number of bitplanes in a planar frame
    #[builder(default = 5)]
    pub planes: i64,
    /// Planar frame width in pixels
    #[builder(default = 320)]
    pub frame_width: i64,
    /// Planar frame height in pixels
    #[builder(default = 200)]
    pub frame_height: i64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Validated grid layout parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Cells per row, never 0
    pub row_width: usize,
    /// First symbol shown
    pub offset: usize,
    /// Number of symbols shown, 0 for all
    pub limit: usize,
}

/// Validated planar frame parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Number of bitplanes, `1..=8`
    pub planes: usize,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

fn positive(name: &str, value: i64) -> Result<usize, Error> {
    match usize::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::Validation(format!("{name} must be positive, got {value}"))),
    }
}

fn non_negative(name: &str, value: i64) -> Result<usize, Error> {
    usize::try_from(value)
        .map_err(|_| Error::Validation(format!("{name} must not be negative, got {value}")))
}

impl ViewConfig {
    /// Checks every field
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first field out of range
    pub fn validate(&self) -> Result<(), Error> {
        self.layout()?;
        positive("cell size", self.cell_size)?;
        self.frame()?;
        Ok(())
    }

    /// Returns the grid layout part of the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if row width is not positive or offset/limit
    /// are negative
    pub fn layout(&self) -> Result<Layout, Error> {
        Ok(Layout {
            row_width: positive("row width", self.row_width)?,
            offset: non_negative("offset", self.offset)?,
            limit: non_negative("limit", self.limit)?,
        })
    }

    /// Returns the planar frame part of the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a plane count outside of `1..=8` or a
    /// frame dimension that is not positive
    pub fn frame(&self) -> Result<FrameGeometry, Error> {
        let planes = positive("plane count", self.planes)?;
        if planes > MAX_PLANES {
            return Err(Error::Validation(format!(
                "plane count must be at most {MAX_PLANES}, got {planes}"
            )));
        }
        Ok(FrameGeometry {
            planes,
            width: positive("frame width", self.frame_width)?,
            height: positive("frame height", self.frame_height)?,
        })
    }

    /// Plain text dump of the current row width and offset
    #[must_use]
    pub fn dump(&self) -> String {
        format!("Width: {}\nOffset: {}", self.row_width, self.offset)
    }
}
