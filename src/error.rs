//! Error types for the tile-watermark crate.

/// Errors that can occur while building a stencil or watermarking an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter was outside its accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A buffer or scale target would have a non-positive dimension.
    #[error("invalid dimension ({width}x{height})")]
    InvalidDimension {
        /// Requested or computed width in pixels.
        width: u64,
        /// Requested or computed height in pixels.
        height: u64,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred while decoding or encoding an image file.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_dimension(width: impl Into<u64>, height: impl Into<u64>) -> Self {
        Self::InvalidDimension {
            width: width.into(),
            height: height.into(),
        }
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
