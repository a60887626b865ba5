//! Error types for page encoding and decoding

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for optar operations
pub type Result<T> = std::result::Result<T, OptarError>;

/// Which outer corner of the page a scan was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// Upper left
    UpperLeft,
    /// Upper right
    UpperRight,
    /// Lower left
    LowerLeft,
    /// Lower right
    LowerRight,
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Corner::UpperLeft => "upper left",
            Corner::UpperRight => "upper right",
            Corner::LowerLeft => "lower left",
            Corner::LowerRight => "lower right",
        };
        f.write_str(name)
    }
}

/// Errors that abort an encode or decode run
#[derive(Debug, Error)]
pub enum OptarError {
    /// Reading or writing a file failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A scan could not be decoded or a page image could not be written
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Format parameters out of range or a malformed descriptor
    #[error("Invalid page format: {0}")]
    InvalidFormat(String),

    /// The payload needs more pages than the label can number
    #[error("Too many pages - 10,000 or more")]
    TooManyPages,

    /// No dark frame pixel was found on a corner's diagonal scan
    #[error("Cannot find {corner} corner")]
    CornerNotFound {
        /// Corner whose search came up empty
        corner: Corner,
    },

    /// The first page of a scan set does not exist
    #[error("No input page found at {}", path.display())]
    NoInput {
        /// Expected path of page 1
        path: PathBuf,
    },

    /// A pixel buffer whose length is not `width * height`
    #[error("Raster buffer of {len} bytes does not match {width}x{height}")]
    RasterSize {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Actual buffer length
        len: usize,
    },
}
