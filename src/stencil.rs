//! Deriving a translucent stencil from a watermark source image.
//!
//! The pipeline normalizes the source, optionally grayscales it, cuts every
//! pixel brighter than the default threshold to full transparency, and then
//! scales all remaining alpha by the attenuation percentage.

use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::filters::{FilterChain, GrayscaleFilter, ThresholdFilter};
use crate::normalize::{self, Raster};
use crate::pixel::PixelBuffer;

/// Default alpha attenuation in percent.
pub const DEFAULT_ATTENUATION: u8 = 50;

/// Configuration of a stencil build.
#[derive(Debug, Clone)]
pub struct StencilSpec {
    /// Watermark source image.
    pub source: Raster,
    /// Grayscale the source before thresholding.
    pub grayscale: bool,
    /// Percentage of the original alpha kept, `0..=100`.
    pub attenuation: u8,
}

impl StencilSpec {
    /// Spec with grayscale enabled and the default attenuation.
    pub fn new(source: impl Into<Raster>) -> Self {
        Self {
            source: source.into(),
            grayscale: true,
            attenuation: DEFAULT_ATTENUATION,
        }
    }

    /// Set whether to grayscale the source.
    #[must_use]
    pub fn with_grayscale(mut self, grayscale: bool) -> Self {
        self.grayscale = grayscale;
        self
    }

    /// Set the alpha attenuation percentage.
    #[must_use]
    pub fn with_attenuation(mut self, attenuation: u8) -> Self {
        self.attenuation = attenuation;
        self
    }
}

/// A built stencil, ready to be tiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stencil {
    buffer: PixelBuffer,
}

impl Stencil {
    /// The stencil's pixels.
    #[must_use]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Consume the stencil, returning its pixels.
    #[must_use]
    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }
}

/// Builds a [`Stencil`] once and hands out the cached result afterwards.
#[derive(Debug)]
pub struct WatermarkStencilBuilder {
    spec: StencilSpec,
    stencil: OnceLock<Stencil>,
}

impl WatermarkStencilBuilder {
    /// Create a builder; nothing is computed until [`Self::build_stencil`].
    #[must_use]
    pub fn new(spec: StencilSpec) -> Self {
        Self {
            spec,
            stencil: OnceLock::new(),
        }
    }

    /// The configuration this builder was created with.
    #[must_use]
    pub fn spec(&self) -> &StencilSpec {
        &self.spec
    }

    /// Whether the stencil has already been built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.stencil.get().is_some()
    }

    /// Build the stencil on first call, return the cached one afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the attenuation exceeds 100, or
    /// [`Error::InvalidDimension`] if the source image is empty. A failed
    /// build caches nothing.
    pub fn build_stencil(&self) -> Result<&Stencil> {
        if let Some(stencil) = self.stencil.get() {
            return Ok(stencil);
        }
        let built = self.build()?;
        Ok(self.stencil.get_or_init(|| built))
    }

    fn build(&self) -> Result<Stencil> {
        let spec = &self.spec;
        if spec.attenuation > 100 {
            return Err(Error::invalid_argument(format!(
                "attenuation {}% out of bounds [0,100]",
                spec.attenuation
            )));
        }

        let source = normalize::normalize(&spec.source)?;
        tracing::debug!(
            width = source.width(),
            height = source.height(),
            grayscale = spec.grayscale,
            attenuation = spec.attenuation,
            "building stencil"
        );

        let mut chain = FilterChain::new();
        if spec.grayscale {
            chain = chain.then(GrayscaleFilter);
        }
        let chain = chain.then(ThresholdFilter::default());

        let mut buffer = normalize::copy_argb(&chain.apply(&source));
        attenuate_alpha(&mut buffer, spec.attenuation);
        Ok(Stencil { buffer })
    }
}

/// Scale every alpha value by `percent / 100`, truncating; RGB untouched.
///
/// `percent` must already be validated to `0..=100`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn attenuate_alpha(buffer: &mut PixelBuffer, percent: u8) {
    debug_assert!(percent <= 100, "attenuation {percent}% not validated");
    let percent = u32::from(percent);
    for px in buffer.pixels_mut() {
        let alpha = u32::from(px.alpha()) * percent / 100;
        *px = px.with_alpha(alpha as u8);
    }
}
