//! Canonical 8-bit ARGB raster.
//!
//! Every stage of the pipeline consumes and produces [`PixelBuffer`]s. A pixel
//! is a packed `0xAARRGGBB` word wrapped in [`Argb`]; channel values are
//! straight (unpremultiplied) unless the buffer's premultiplied flag says
//! otherwise.

use std::fmt;

use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};

/// A single packed ARGB pixel (`0xAARRGGBB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Argb(
    /// Packed `0xAARRGGBB` word.
    pub u32,
);

impl Argb {
    /// Fully transparent black, `0x00000000`.
    pub const TRANSPARENT: Self = Self(0);

    /// Pack four channels into a pixel.
    #[must_use]
    pub const fn from_channels(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Alpha channel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Channels in `[a, r, g, b]` order.
    #[must_use]
    pub const fn channels(self) -> [u8; 4] {
        [self.alpha(), self.red(), self.green(), self.blue()]
    }

    /// Same color with the alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self(self.0 & 0x00FF_FFFF | (alpha as u32) << 24)
    }

    /// Unweighted luminance: `(R + G + B) / 3`, truncating.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn luminance(self) -> u8 {
        let sum = u16::from(self.red()) + u16::from(self.green()) + u16::from(self.blue());
        (sum / 3) as u8
    }
}

impl From<u32> for Argb {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Argb> for u32 {
    fn from(value: Argb) -> Self {
        value.0
    }
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// A dense, row-major ARGB raster with non-zero dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Argb>,
    premultiplied: bool,
}

impl PixelBuffer {
    /// Create a fully transparent buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, Argb::TRANSPARENT)
    }

    /// Create a buffer where every pixel is `pixel`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either dimension is zero.
    pub fn filled(width: u32, height: u32, pixel: Argb) -> Result<Self> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![pixel; len],
            premultiplied: false,
        })
    }

    /// Wrap an existing row-major pixel vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either dimension is zero, or
    /// [`Error::InvalidArgument`] if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Argb>) -> Result<Self> {
        let len = pixel_count(width, height)?;
        if pixels.len() != len {
            return Err(Error::invalid_argument(format!(
                "expected {len} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            premultiplied: false,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the color channels are premultiplied by alpha.
    ///
    /// This is metadata only; no stage of the pipeline premultiplies.
    #[must_use]
    pub fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    /// Set the premultiplied-alpha metadata flag.
    pub fn set_premultiplied(&mut self, premultiplied: bool) {
        self.premultiplied = premultiplied;
    }

    /// All pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[Argb] {
        &self.pixels
    }

    /// All pixels, row-major, mutable.
    pub fn pixels_mut(&mut self) -> &mut [Argb] {
        &mut self.pixels
    }

    /// Iterate over rows of the raster.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, Argb> {
        self.pixels.chunks_exact(self.width as usize)
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Argb {
        self.pixels[self.index(x, y)]
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Argb) {
        let idx = self.index(x, y);
        self.pixels[idx] = pixel;
    }

    /// Copy into an `image` crate RGBA raster (channels copied verbatim).
    #[must_use]
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [a, r, g, b] = self.get_pixel(x, y).channels();
            Rgba([r, g, b, a])
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x},{y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimension(width, height));
    }
    Ok(width as usize * height as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_pack_and_unpack() {
        let px = Argb::from_channels(0x12, 0x34, 0x56, 0x78);
        assert_eq!(px, Argb(0x1234_5678));
        assert_eq!(px.channels(), [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(px.with_alpha(0xFF), Argb(0xFF34_5678));
    }

    #[test]
    fn luminance_truncates() {
        assert_eq!(Argb(0xFFFF_0000).luminance(), 85);
        assert_eq!(Argb(0xFF01_0101).luminance(), 1);
        assert_eq!(Argb(0x00FF_FF01).luminance(), 170);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 5),
            Err(Error::InvalidDimension { width: 0, height: 5 })
        ));
        assert!(PixelBuffer::new(5, 0).is_err());
    }

    #[test]
    fn from_pixels_checks_length() {
        let err = PixelBuffer::from_pixels(2, 2, vec![Argb::TRANSPARENT; 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(PixelBuffer::from_pixels(2, 2, vec![Argb::TRANSPARENT; 4]).is_ok());
    }

    #[test]
    fn set_and_get_are_row_major() {
        let mut buf = PixelBuffer::new(3, 2).unwrap();
        buf.set_pixel(2, 1, Argb(0xFF00_00FF));
        assert_eq!(buf.pixels()[5], Argb(0xFF00_00FF));
        assert_eq!(buf.rows().count(), 2);
    }

    #[test]
    fn rgba_view_reorders_channels() {
        let buf = PixelBuffer::filled(1, 1, Argb(0x80FF_2010)).unwrap();
        let img = buf.to_rgba_image();
        assert_eq!(img.get_pixel(0, 0).0, [0xFF, 0x20, 0x10, 0x80]);
    }
}
