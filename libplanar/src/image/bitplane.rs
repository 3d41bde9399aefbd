use tracing::{debug, trace};

use crate::{image::frame::Frame, Error};

/// Most bitplanes a pixel index can be built from
pub const MAX_PLANES: usize = 8;

/// A planar buffer split into its bitplanes
///
/// Each plane covers the whole raster row-major, one bit per pixel, most
/// significant bit first within every byte.
#[derive(Debug, Clone, Copy)]
pub struct Planes<'a> {
    planes: [&'a [u8]; MAX_PLANES],
    count: usize,
}

impl<'a> Planes<'a> {
    /// Splits `buffer` into `count` equally sized planes
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `count` is not within `1..=8`
    /// - [`Error::PlaneLength`] if the buffer length is not a multiple of `count`
    pub fn split(buffer: &'a [u8], count: usize) -> Result<Self, Error> {
        if !(1..=MAX_PLANES).contains(&count) {
            return Err(Error::Validation(format!(
                "plane count must be between 1 and {MAX_PLANES}, got {count}"
            )));
        }
        if buffer.len() % count != 0 {
            return Err(Error::PlaneLength {
                len: buffer.len(),
                planes: count,
            });
        }
        let plane_len = buffer.len() / count;
        let mut planes: [&[u8]; MAX_PLANES] = [&[]; MAX_PLANES];
        for (slot, plane) in planes.iter_mut().zip(buffer.chunks_exact(plane_len.max(1))) {
            *slot = plane;
        }
        Ok(Self { planes, count })
    }

    /// Number of planes
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Length of a single plane in bytes
    #[must_use]
    pub fn plane_len(&self) -> usize {
        self.planes[0].len()
    }

    /// Returns plane `k`
    #[must_use]
    pub fn plane(&self, k: usize) -> Option<&'a [u8]> {
        (k < self.count).then(|| self.planes[k])
    }

    /// Returns bit `pixel` of plane `k` (0 or 1)
    #[inline]
    fn bit(&self, k: usize, pixel: usize) -> u8 {
        (self.planes[k][pixel / 8] >> (7 - pixel % 8)) & 1
    }

    /// Builds the palette index of every pixel of a `width * height` raster
    ///
    /// `order` lists plane numbers from most to least significant bit. Plane
    /// `order[0]` contributes the highest bit of each index.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `order` names a plane that does not exist, has
    ///   more than [`MAX_PLANES`] entries, or `width * height` overflows
    /// - [`Error::ShortPlane`] if a plane has fewer than `ceil(width * height / 8)` bytes
    pub fn composite_ordered(
        &self,
        order: &[usize],
        width: usize,
        height: usize,
    ) -> Result<Frame<u8>, Error> {
        if order.len() > MAX_PLANES {
            return Err(Error::Validation(format!(
                "an index holds at most {MAX_PLANES} planes, got an order of {}",
                order.len()
            )));
        }
        if let Some(&k) = order.iter().find(|&&k| k >= self.count) {
            return Err(Error::Validation(format!(
                "plane {k} does not exist, there are {} planes",
                self.count
            )));
        }
        let pixels = width
            .checked_mul(height)
            .ok_or_else(|| Error::Validation(format!("a {width}x{height} frame is too large")))?;
        if self.plane_len() < pixels.div_ceil(8) {
            return Err(Error::ShortPlane {
                plane_len: self.plane_len(),
                pixels,
            });
        }
        trace!("Compositing {pixels} pixels from plane order {order:?}");

        let indices = (0..pixels)
            .map(|p| {
                order
                    .iter()
                    .fold(0u8, |value, &k| (value << 1) | self.bit(k, p))
            })
            .collect();
        Ok(Frame::new(width, height, indices))
    }

    /// Builds the palette index of every pixel, plane 0 contributing the highest bit
    ///
    /// # Errors
    ///
    /// See [`Self::composite_ordered`]
    pub fn composite(&self, width: usize, height: usize) -> Result<Frame<u8>, Error> {
        let order: Vec<usize> = (0..self.count).collect();
        self.composite_ordered(&order, width, height)
    }
}

/// Decodes a planar buffer of `plane_count` bitplanes into a `width * height`
/// frame of palette indices in `0..2^plane_count`
///
/// Plane 0 is the first `len / plane_count` bytes of `buffer` and contributes the
/// most significant bit.
///
/// # Errors
///
/// - [`Error::PlaneLength`] if `buffer.len()` is not divisible by `plane_count`
/// - [`Error::ShortPlane`] if the planes are too short for the raster
/// - [`Error::Validation`] if `plane_count` is not within `1..=8`
pub fn composite(
    buffer: &[u8],
    plane_count: usize,
    width: usize,
    height: usize,
) -> Result<Frame<u8>, Error> {
    let planes = Planes::split(buffer, plane_count)?;
    debug!(
        "Split {} bytes into {} planes of {} bytes",
        buffer.len(),
        planes.count(),
        planes.plane_len()
    );
    planes.composite(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_plane_is_msb_first() {
        let frame = composite(&[0b1011_0000], 1, 8, 1).unwrap();
        assert_eq!(frame.pixels(), [1, 0, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn plane_zero_is_high_bit() {
        let frame = composite(&[0b1000_0000, 0b1100_0000], 2, 8, 1).unwrap();
        assert_eq!(frame.pixels(), [3, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn every_single_plane_byte() {
        for byte in 0..=u8::MAX {
            let frame = composite(&[byte], 1, 8, 1).unwrap();
            for (x, &p) in frame.pixels().iter().enumerate() {
                assert_eq!(p, (byte >> (7 - x)) & 1, "byte {byte:#010b} pixel {x}");
            }
        }
    }

    #[test]
    fn every_two_plane_byte_pair() {
        for hi in 0..=u8::MAX {
            for lo in 0..=u8::MAX {
                let frame = composite(&[hi, lo], 2, 8, 1).unwrap();
                for (x, &p) in frame.pixels().iter().enumerate() {
                    let expected = (((hi >> (7 - x)) & 1) << 1) | ((lo >> (7 - x)) & 1);
                    assert_eq!(p, expected, "planes {hi:#04x} {lo:#04x} pixel {x}");
                }
            }
        }
    }

    #[test]
    fn pixels_cross_byte_boundaries_row_major() {
        // 4x3 raster, 12 pixels, 2 bytes per plane
        let frame = composite(&[0b0000_0001, 0b1000_0000], 1, 4, 3).unwrap();
        assert_eq!(frame.row(0), Some(&[0, 0, 0, 0][..]));
        assert_eq!(frame.row(1), Some(&[0, 0, 0, 1][..]));
        assert_eq!(frame.row(2), Some(&[1, 0, 0, 0][..]));
    }

    #[test]
    fn five_planes_build_five_bit_indices() {
        let buffer = [0x80, 0x00, 0x80, 0x00, 0x80];
        let frame = composite(&buffer, 5, 8, 1).unwrap();
        assert_eq!(frame.pixels()[0], 0b10101);
        assert!(frame.pixels()[1..].iter().all(|&p| p == 0));
    }

    #[test]
    fn indices_stay_below_two_to_the_plane_count() {
        let buffer = [0xFF; 3 * 4];
        let frame = composite(&buffer, 3, 8, 4).unwrap();
        assert!(frame.pixels().iter().all(|&p| p == 7));
    }

    #[test]
    fn custom_order_swaps_significance() {
        let planes = Planes::split(&[0b1000_0000, 0b1100_0000], 2).unwrap();
        let frame = planes.composite_ordered(&[1, 0], 8, 1).unwrap();
        assert_eq!(&frame.pixels()[..2], [3, 2]);
        assert!(planes.composite_ordered(&[2], 8, 1).is_err());
    }

    #[test]
    fn repeated_planes_past_eight_are_rejected() {
        let planes = Planes::split(&[0xFF, 0x00], 2).unwrap();
        let err = planes.composite_ordered(&[0; 9], 8, 1).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let frame = planes.composite_ordered(&[0; 8], 8, 1).unwrap();
        assert!(frame.pixels().iter().all(|&p| p == 0xFF));
    }

    #[test]
    fn huge_dimensions_are_rejected_not_wrapped() {
        let err = composite(&[0; 2], 1, usize::MAX, 2).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(matches!(
            composite(&[0; 2], 2, usize::MAX / 2 + 1, 2),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn uneven_buffer_is_a_format_error() {
        let err = composite(&[0; 7], 2, 8, 1).unwrap_err();
        assert!(matches!(err, Error::PlaneLength { len: 7, planes: 2 }));
        assert!(err.is_format());
    }

    #[test]
    fn short_planes_are_rejected() {
        let err = composite(&[0; 2], 2, 16, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortPlane {
                plane_len: 1,
                pixels: 16
            }
        ));
    }

    #[test]
    fn plane_count_out_of_range() {
        assert!(matches!(composite(&[0; 9], 9, 8, 1), Err(Error::Validation(_))));
        assert!(matches!(composite(&[], 0, 0, 0), Err(Error::Validation(_))));
    }

    #[test]
    fn empty_raster() {
        let frame = composite(&[], 4, 0, 0).unwrap();
        assert!(frame.pixels().is_empty());
    }
}
