//! Aspect-preserving rescale by target width.
//!
//! Resampling runs on alpha-weighted color: each channel is multiplied by its
//! pixel's alpha before filtering and divided by the filtered alpha after, so
//! fully transparent pixels contribute nothing to the color of their
//! neighbours.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};

use crate::error::{Error, Result};
use crate::normalize;
use crate::pixel::{Argb, PixelBuffer};

/// Resampling filter used for every rescale.
const SCALE_FILTER: FilterType = FilterType::Triangle;

/// Color scaled by alpha (`c * a`) next to alpha scaled to the same range
/// (`a * 255`); both fit `u16` without loss.
type PremultipliedImage = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Height that keeps the aspect ratio of `width x height` at `target_width`.
///
/// Integer arithmetic, truncating.
#[must_use]
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u64 {
    u64::from(height) * u64::from(target_width) / u64::from(width.max(1))
}

/// Resize `buffer` to exactly `target_width` columns, keeping its aspect ratio.
///
/// Resampling is bilinear on alpha-weighted channels.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`] if `target_width` is zero or the
/// resulting height would be zero.
pub fn scale_to_width(buffer: &PixelBuffer, target_width: u32) -> Result<PixelBuffer> {
    let (width, height) = buffer.dimensions();
    if target_width == 0 {
        return Err(Error::invalid_dimension(target_width, height));
    }

    let target_height = scaled_height(width, height, target_width);
    let Ok(target_height) = u32::try_from(target_height) else {
        return Err(Error::invalid_dimension(u64::from(target_width), target_height));
    };
    if target_height == 0 {
        return Err(Error::invalid_dimension(target_width, target_height));
    }

    if (target_width, target_height) == (width, height) {
        return Ok(normalize::copy_argb(buffer));
    }

    tracing::trace!(
        from_width = width,
        from_height = height,
        to_width = target_width,
        to_height = target_height,
        "rescaling buffer"
    );
    let scaled = imageops::resize(
        &premultiply(buffer),
        target_width,
        target_height,
        SCALE_FILTER,
    );
    unpremultiply(&scaled)
}

fn premultiply(buffer: &PixelBuffer) -> PremultipliedImage {
    ImageBuffer::from_fn(buffer.width(), buffer.height(), |x, y| {
        let [a, r, g, b] = buffer.get_pixel(x, y).channels();
        let a = u16::from(a);
        Rgba([
            u16::from(r) * a,
            u16::from(g) * a,
            u16::from(b) * a,
            a * 255,
        ])
    })
}

#[allow(clippy::cast_possible_truncation)]
fn unpremultiply(img: &PremultipliedImage) -> Result<PixelBuffer> {
    let pixels = img
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            let a = u32::from(a);
            if a == 0 {
                return Argb::TRANSPARENT;
            }
            // c * a / (a * 255) * 255, rounded
            let channel = |c: u16| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
            let alpha = ((a + 127) / 255).min(255) as u8;
            Argb::from_channels(alpha, channel(r), channel(g), channel(b))
        })
        .collect();
    PixelBuffer::from_pixels(img.width(), img.height(), pixels)
}
