//! Conversion of arbitrary decoded rasters into the canonical ARGB buffer.
//!
//! Conversion is dispatched on the source's [`PixelEncoding`]: a few common
//! 8-bit layouts have a direct channel-remapping path, and everything else is
//! read back pixel by pixel through the format-agnostic
//! [`GenericImageView`] accessor.

use image::{DynamicImage, GenericImageView, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};

use crate::error::{Error, Result};
use crate::pixel::{Argb, PixelBuffer};

/// A source raster handed to the pipeline.
#[derive(Debug, Clone)]
pub enum Raster {
    /// Already in the canonical layout.
    Argb(PixelBuffer),
    /// Any decoded image from the `image` crate.
    Image(DynamicImage),
}

impl From<PixelBuffer> for Raster {
    fn from(buffer: PixelBuffer) -> Self {
        Self::Argb(buffer)
    }
}

impl From<DynamicImage> for Raster {
    fn from(image: DynamicImage) -> Self {
        Self::Image(image)
    }
}

impl Raster {
    /// The encoding tag used to pick a conversion path.
    #[must_use]
    pub fn encoding(&self) -> PixelEncoding {
        match self {
            Self::Argb(_) => PixelEncoding::Argb32,
            Self::Image(img) => PixelEncoding::of_image(img),
        }
    }

    /// `(width, height)` of the source.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Argb(buffer) => buffer.dimensions(),
            Self::Image(image) => image.dimensions(),
        }
    }
}

/// Source pixel layouts with a dedicated conversion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelEncoding {
    /// Packed `0xAARRGGBB`, the canonical layout.
    Argb32,
    /// Byte-planar `R, G, B, A`.
    Rgba8,
    /// Byte-planar `R, G, B` without alpha.
    Rgb8,
    /// 8-bit gray without alpha.
    L8,
    /// 8-bit gray with alpha.
    La8,
    /// Anything else (16-bit, float); converted through the generic accessor.
    Other,
}

impl PixelEncoding {
    /// Encoding tag of a decoded image.
    #[must_use]
    pub fn of_image(img: &DynamicImage) -> Self {
        match img {
            DynamicImage::ImageRgba8(_) => Self::Rgba8,
            DynamicImage::ImageRgb8(_) => Self::Rgb8,
            DynamicImage::ImageLuma8(_) => Self::L8,
            DynamicImage::ImageLumaA8(_) => Self::La8,
            _ => Self::Other,
        }
    }
}

/// Conversion from a decoded image to the canonical buffer.
type Converter = fn(&DynamicImage) -> Result<PixelBuffer>;

/// Converter for an encoding tag; [`PixelEncoding::Other`] falls back to the
/// generic accessor path.
fn converter(encoding: PixelEncoding) -> Converter {
    match encoding {
        PixelEncoding::Rgba8 => rgba8_path,
        PixelEncoding::Rgb8 => rgb8_path,
        PixelEncoding::L8 => luma8_path,
        PixelEncoding::La8 => luma_alpha8_path,
        PixelEncoding::Argb32 | PixelEncoding::Other => from_generic,
    }
}

/// Convert `source` into a new canonical ARGB buffer of the same dimensions.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`] if the source has a zero dimension.
pub fn normalize(source: &Raster) -> Result<PixelBuffer> {
    let encoding = source.encoding();
    let (width, height) = source.dimensions();
    tracing::trace!(?encoding, width, height, "normalizing raster");

    match source {
        Raster::Argb(buffer) => Ok(copy_argb(buffer)),
        Raster::Image(img) => normalize_image(img),
    }
}

/// Convert a decoded image into a new canonical ARGB buffer.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`] if the image has a zero dimension.
pub fn normalize_image(img: &DynamicImage) -> Result<PixelBuffer> {
    converter(PixelEncoding::of_image(img))(img)
}

fn rgba8_path(img: &DynamicImage) -> Result<PixelBuffer> {
    img.as_rgba8().map_or_else(|| from_generic(img), from_rgba8)
}

fn rgb8_path(img: &DynamicImage) -> Result<PixelBuffer> {
    img.as_rgb8().map_or_else(|| from_generic(img), from_rgb8)
}

fn luma8_path(img: &DynamicImage) -> Result<PixelBuffer> {
    img.as_luma8().map_or_else(|| from_generic(img), from_luma8)
}

fn luma_alpha8_path(img: &DynamicImage) -> Result<PixelBuffer> {
    img.as_luma_alpha8()
        .map_or_else(|| from_generic(img), from_luma_alpha8)
}

/// Structural copy of a buffer that is already canonical.
///
/// Channel values and the premultiplied flag are copied verbatim.
#[must_use]
pub fn copy_argb(buffer: &PixelBuffer) -> PixelBuffer {
    buffer.clone()
}

/// Reorder byte-planar RGBA into ARGB.
fn from_rgba8(img: &RgbaImage) -> Result<PixelBuffer> {
    let pixels = img
        .as_raw()
        .chunks_exact(4)
        .map(|c| Argb::from_channels(c[3], c[0], c[1], c[2]))
        .collect();
    PixelBuffer::from_pixels(img.width(), img.height(), pixels)
}

fn from_rgb8(img: &RgbImage) -> Result<PixelBuffer> {
    let pixels = img
        .as_raw()
        .chunks_exact(3)
        .map(|c| Argb::from_channels(0xFF, c[0], c[1], c[2]))
        .collect();
    PixelBuffer::from_pixels(img.width(), img.height(), pixels)
}

fn from_luma8(img: &GrayImage) -> Result<PixelBuffer> {
    let pixels = img
        .as_raw()
        .iter()
        .map(|&l| Argb::from_channels(0xFF, l, l, l))
        .collect();
    PixelBuffer::from_pixels(img.width(), img.height(), pixels)
}

fn from_luma_alpha8(img: &GrayAlphaImage) -> Result<PixelBuffer> {
    let pixels = img
        .as_raw()
        .chunks_exact(2)
        .map(|c| Argb::from_channels(c[1], c[0], c[0], c[0]))
        .collect();
    PixelBuffer::from_pixels(img.width(), img.height(), pixels)
}

/// Slow path: one accessor call per pixel, correct for every encoding.
fn from_generic(img: &DynamicImage) -> Result<PixelBuffer> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimension(width, height));
    }
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let [r, g, b, a] = img.get_pixel(x, y).0;
            pixels.push(Argb::from_channels(a, r, g, b));
        }
    }
    PixelBuffer::from_pixels(width, height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, LumaA, Rgb, Rgba};

    #[test]
    fn canonical_input_is_copied_with_metadata() {
        let mut buf = PixelBuffer::filled(2, 3, Argb(0x8011_2233)).unwrap();
        buf.set_premultiplied(true);
        let out = normalize(&Raster::from(buf.clone())).unwrap();
        assert_eq!(out, buf);
        assert!(out.is_premultiplied());
    }

    #[test]
    fn rgba8_is_reordered() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
        let raster = Raster::from(DynamicImage::ImageRgba8(img));
        assert_eq!(raster.encoding(), PixelEncoding::Rgba8);
        let out = normalize(&raster).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert!(out.pixels().iter().all(|&p| p == Argb(0x0401_0203)));
        assert!(!out.is_premultiplied());
    }

    #[test]
    fn rgb8_gets_opaque_alpha() {
        let img = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        let out = normalize(&DynamicImage::ImageRgb8(img).into()).unwrap();
        assert!(out.pixels().iter().all(|&p| p == Argb(0xFF0A_141E)));
    }

    #[test]
    fn gray_layouts_replicate_luma() {
        let l8 = GrayImage::from_pixel(1, 1, Luma([7]));
        let out = normalize(&DynamicImage::ImageLuma8(l8).into()).unwrap();
        assert_eq!(out.get_pixel(0, 0), Argb(0xFF07_0707));

        let la8 = GrayAlphaImage::from_pixel(1, 1, LumaA([9, 100]));
        let out = normalize(&DynamicImage::ImageLumaA8(la8).into()).unwrap();
        assert_eq!(out.get_pixel(0, 0), Argb::from_channels(100, 9, 9, 9));
    }

    #[test]
    fn wide_formats_use_generic_path() {
        let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 2, Rgba([u16::MAX, 0, u16::MAX, u16::MAX]));
        let raster = Raster::from(DynamicImage::ImageRgba16(img));
        assert_eq!(raster.encoding(), PixelEncoding::Other);
        let out = normalize(&raster).unwrap();
        assert!(out.pixels().iter().all(|&p| p == Argb(0xFFFF_00FF)));
    }

    #[test]
    fn every_tag_has_a_converter() {
        let images = [
            DynamicImage::new_rgba8(2, 1),
            DynamicImage::new_rgb8(2, 1),
            DynamicImage::new_luma8(2, 1),
            DynamicImage::new_luma_a8(2, 1),
            DynamicImage::new_rgb32f(2, 1),
        ];
        let tags: Vec<_> = images.iter().map(PixelEncoding::of_image).collect();
        assert_eq!(
            tags,
            [
                PixelEncoding::Rgba8,
                PixelEncoding::Rgb8,
                PixelEncoding::L8,
                PixelEncoding::La8,
                PixelEncoding::Other,
            ]
        );
        for img in &images {
            let out = converter(PixelEncoding::of_image(img))(img).unwrap();
            assert_eq!(out.dimensions(), (2, 1));
        }
    }

    #[test]
    fn fallback_converter_handles_fast_path_layouts() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([1, 2, 3])));
        let fast = converter(PixelEncoding::Rgb8)(&img).unwrap();
        let slow = converter(PixelEncoding::Other)(&img).unwrap();
        assert_eq!(fast, slow);
    }

    #[test]
    fn empty_image_is_rejected() {
        let raster = Raster::from(DynamicImage::new_rgba8(0, 4));
        assert!(matches!(
            normalize(&raster),
            Err(Error::InvalidDimension { .. })
        ));
    }
}
