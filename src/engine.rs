//! Watermarking entry points and file glue.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::error::{Error, Result};
use crate::normalize::{self, Raster};
use crate::pixel::PixelBuffer;
use crate::stencil::{Stencil, StencilSpec, WatermarkStencilBuilder, DEFAULT_ATTENUATION};
use crate::tiling;

/// Default number of stencil tiles per row.
pub const DEFAULT_TILES_PER_ROW: u32 = 5;

/// Options controlling how a watermark is derived and applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkOptions {
    /// Desired number of tiles per row; surplus tiles are drawn to cover the image.
    pub tiles_per_row: u32,
    /// Grayscale the watermark source (`false` keeps it colored).
    pub grayscale: bool,
    /// Percentage of the stencil's alpha kept, `0..=100`.
    pub attenuation: u8,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            tiles_per_row: DEFAULT_TILES_PER_ROW,
            grayscale: true,
            attenuation: DEFAULT_ATTENUATION,
        }
    }
}

/// Applies one stencil to any number of target images.
///
/// The stencil is built lazily on the first call to [`Watermarker::generate`]
/// and reused afterwards.
#[derive(Debug)]
pub struct Watermarker {
    builder: WatermarkStencilBuilder,
}

impl Watermarker {
    /// Create a watermarker around an existing stencil builder.
    #[must_use]
    pub fn new(builder: WatermarkStencilBuilder) -> Self {
        Self { builder }
    }

    /// Create a watermarker for `source` configured by `opts`.
    #[must_use]
    pub fn from_options(source: impl Into<Raster>, opts: &WatermarkOptions) -> Self {
        let spec = StencilSpec::new(source)
            .with_grayscale(opts.grayscale)
            .with_attenuation(opts.attenuation);
        Self::new(WatermarkStencilBuilder::new(spec))
    }

    /// The stencil, building it if necessary.
    ///
    /// # Errors
    ///
    /// See [`WatermarkStencilBuilder::build_stencil`].
    pub fn stencil(&self) -> Result<&Stencil> {
        self.builder.build_stencil()
    }

    /// Tile the stencil over `target`, returning a new buffer of the same size.
    ///
    /// # Errors
    ///
    /// Propagates stencil build errors and the tiling errors documented on
    /// [`tiling::composite`].
    pub fn generate(&self, target: &PixelBuffer, tiles_per_row: u32) -> Result<PixelBuffer> {
        let stencil = self.stencil()?;
        tiling::composite(target, stencil.buffer(), tiles_per_row)
    }

    /// Like [`Watermarker::generate`] for a decoded image of any encoding.
    ///
    /// # Errors
    ///
    /// As [`Watermarker::generate`], plus [`Error::InvalidDimension`] for an
    /// empty image.
    pub fn generate_image(&self, target: &DynamicImage, tiles_per_row: u32) -> Result<PixelBuffer> {
        let target = normalize::normalize_image(target)?;
        self.generate(&target, tiles_per_row)
    }
}

/// Watermark `base` with a stencil derived from `watermark`, writing `output`.
///
/// # Errors
///
/// Returns an error if either input cannot be decoded, the parameters are
/// invalid for the image sizes, or the output cannot be written.
pub fn process_file(
    base: &Path,
    watermark: &Path,
    output: &Path,
    opts: &WatermarkOptions,
) -> Result<()> {
    let target = normalize::normalize_image(&load_image(base)?)?;
    let watermarker = Watermarker::from_options(load_image(watermark)?, opts);

    let result = watermarker.generate(&target, opts.tiles_per_row)?;
    save_image(&result, output)?;
    tracing::info!(
        base = %base.display(),
        output = %output.display(),
        width = result.width(),
        height = result.height(),
        "watermark applied"
    );
    Ok(())
}

/// Decode an image file.
///
/// # Errors
///
/// Returns [`Error::Image`] if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    tracing::debug!(path = %path.display(), "loading image");
    Ok(image::open(path)?)
}

/// Check if a path has an extension of a supported lossless output format.
#[must_use]
pub fn is_supported_output(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "png" | "bmp" | "tif" | "tiff" | "webp"
        ),
        None => false,
    }
}

/// Encode a buffer to a lossless format chosen by the path's extension.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for lossy or unknown formats, or an
/// I/O or encoding error if writing fails.
pub fn save_image(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff | ImageFormat::WebP => {}
        _ => return Err(Error::UnsupportedFormat(format!("{format:?}"))),
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    DynamicImage::ImageRgba8(buffer.to_rgba_image()).save_with_format(path, format)?;
    Ok(())
}

/// Generate a default output path from a base image path.
///
/// Example: `"photo.jpg"` becomes `"photo_watermarked.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_watermarked.png"))
}
