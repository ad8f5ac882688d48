//! Tile a translucent stencil, derived from one image, across another.
//!
//! A watermark source is turned into a stencil by optional grayscaling, a
//! luminance threshold that cuts bright pixels to full transparency, and a
//! global alpha attenuation. The stencil is then scaled to fit a requested
//! number of tiles per row and repeated over the target with Porter-Duff
//! "over" compositing.
//!
//! # Quick Start
//!
//! ```no_run
//! use tile_watermark::{PixelBuffer, Watermarker, WatermarkOptions};
//!
//! let logo = image::open("logo.png").unwrap();
//! let photo = image::open("photo.jpg").unwrap();
//!
//! let watermarker = Watermarker::from_options(logo, &WatermarkOptions::default());
//! let marked: PixelBuffer = watermarker.generate_image(&photo, 5).unwrap();
//! tile_watermark::save_image(&marked, "marked.png".as_ref()).unwrap();
//! ```
//!
//! # Filters
//!
//! The per-pixel filters used by the stencil pipeline are public and can be
//! applied on their own:
//!
//! ```
//! use tile_watermark::{Argb, PixelBuffer};
//! use tile_watermark::filters::{GrayscaleFilter, PixelFilter, ThresholdFilter};
//!
//! let red = PixelBuffer::filled(2, 2, Argb(0xFFFF_0000)).unwrap();
//! let gray = GrayscaleFilter.apply(&red);
//! assert_eq!(gray.get_pixel(0, 0), Argb(0xFF55_5555));
//!
//! let cut = ThresholdFilter::new(80).unwrap().apply(&gray);
//! assert_eq!(cut.get_pixel(0, 0), Argb::TRANSPARENT);
//! ```

#![deny(missing_docs)]

pub mod blending;
mod engine;
pub mod error;
pub mod filters;
pub mod normalize;
pub mod pixel;
pub mod resize;
pub mod stencil;
pub mod tiling;

pub use engine::{
    default_output_path, is_supported_output, load_image, process_file, save_image,
    WatermarkOptions, Watermarker, DEFAULT_TILES_PER_ROW,
};
pub use error::{Error, Result};
pub use normalize::{normalize, normalize_image, PixelEncoding, Raster};
pub use pixel::{Argb, PixelBuffer};
pub use stencil::{Stencil, StencilSpec, WatermarkStencilBuilder};
pub use tiling::{composite, TileGrid};
