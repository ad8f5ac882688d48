//! Per-pixel filters.
//!
//! A [`PixelFilter`] maps every pixel independently; [`PixelFilter::apply`]
//! never touches its input and always returns a new buffer of the same size.

use crate::error::{Error, Result};
use crate::pixel::{Argb, PixelBuffer};

/// A transform that looks at exactly one pixel at a time.
pub trait PixelFilter {
    /// Map one input pixel to its output pixel.
    fn filter_pixel(&self, pixel: Argb) -> Argb;

    /// Apply the filter to every pixel of `buffer`, producing a new buffer.
    fn apply(&self, buffer: &PixelBuffer) -> PixelBuffer {
        let mut out = buffer.clone();
        for px in out.pixels_mut() {
            *px = self.filter_pixel(*px);
        }
        out
    }
}

/// Replace RGB with their unweighted mean; alpha passes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrayscaleFilter;

impl PixelFilter for GrayscaleFilter {
    fn filter_pixel(&self, pixel: Argb) -> Argb {
        let u = pixel.luminance();
        Argb::from_channels(pixel.alpha(), u, u, u)
    }
}

/// Make every pixel brighter than a threshold fully transparent.
///
/// Luminance is computed from the pixel's own channels, so a preceding
/// grayscale pass does not change which pixels are cut. Pixels at or below
/// the threshold pass through unchanged, color included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdFilter {
    threshold: u8,
}

impl ThresholdFilter {
    /// Threshold used by [`ThresholdFilter::default`].
    pub const DEFAULT_THRESHOLD: u8 = 127;

    /// Create a filter with the given threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `threshold` is outside `[0, 255]`.
    pub fn new(threshold: i32) -> Result<Self> {
        let threshold = u8::try_from(threshold).map_err(|_| {
            Error::invalid_argument(format!("threshold {threshold} out of bounds [0,255]"))
        })?;
        Ok(Self { threshold })
    }

    /// The configured threshold.
    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}

impl Default for ThresholdFilter {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

impl PixelFilter for ThresholdFilter {
    fn filter_pixel(&self, pixel: Argb) -> Argb {
        if pixel.luminance() > self.threshold {
            Argb::TRANSPARENT
        } else {
            pixel
        }
    }
}

/// Filters applied one after another, each to the previous output.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn PixelFilter + Send + Sync>>,
}

impl FilterChain {
    /// An empty chain (applying it copies the input).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to the end of the chain.
    #[must_use]
    pub fn then(mut self, filter: impl PixelFilter + Send + Sync + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the chain has no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter in order.
    #[must_use]
    pub fn apply(&self, buffer: &PixelBuffer) -> PixelBuffer {
        self.filters
            .iter()
            .fold(buffer.clone(), |acc, filter| filter.apply(&acc))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("len", &self.filters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(px: u32) -> PixelBuffer {
        PixelBuffer::filled(4, 3, Argb(px)).unwrap()
    }

    #[test]
    fn grayscale_averages_and_keeps_alpha() {
        let out = GrayscaleFilter.apply(&flat(0x80FF_0000));
        assert_eq!(out.dimensions(), (4, 3));
        assert!(out.pixels().iter().all(|&p| p == Argb(0x8055_5555)));
    }

    #[test]
    fn grayscale_is_idempotent() {
        let mut buf = PixelBuffer::new(3, 1).unwrap();
        buf.set_pixel(0, 0, Argb(0xFF10_2030));
        buf.set_pixel(1, 0, Argb(0x7FFF_0102));
        buf.set_pixel(2, 0, Argb(0x0001_FF80));
        let once = GrayscaleFilter.apply(&buf);
        let twice = GrayscaleFilter.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn apply_leaves_input_untouched() {
        let buf = flat(0xFFFF_FFFF);
        let _ = ThresholdFilter::default().apply(&buf);
        assert_eq!(buf, flat(0xFFFF_FFFF));
    }

    #[test]
    fn threshold_boundary_is_strict() {
        let filter = ThresholdFilter::default();
        let at = flat(0xFF7F_7F7F);
        assert_eq!(filter.apply(&at), at);

        let above = flat(0xFF80_8080);
        assert!(filter
            .apply(&above)
            .pixels()
            .iter()
            .all(|&p| p == Argb::TRANSPARENT));
    }

    #[test]
    fn threshold_keeps_color_of_dark_pixels() {
        let dark_red = flat(0xFFC0_0000);
        assert_eq!(ThresholdFilter::default().apply(&dark_red), dark_red);
    }

    #[test]
    fn threshold_range_is_checked() {
        assert!(ThresholdFilter::new(0).is_ok());
        assert_eq!(ThresholdFilter::new(255).unwrap().threshold(), 255);
        assert!(matches!(
            ThresholdFilter::new(-1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ThresholdFilter::new(256),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn chain_runs_in_order() {
        // (0xFF + 0xFF + 0x00) / 3 = 170 > 127, grayscale does not change that
        let chain = FilterChain::new()
            .then(GrayscaleFilter)
            .then(ThresholdFilter::default());
        assert_eq!(chain.len(), 2);
        let out = chain.apply(&flat(0xFFFF_FF00));
        assert!(out.pixels().iter().all(|&p| p == Argb::TRANSPARENT));

        let empty = FilterChain::new();
        assert!(empty.is_empty());
        assert_eq!(empty.apply(&flat(0x1234_5678)), flat(0x1234_5678));
    }
}
