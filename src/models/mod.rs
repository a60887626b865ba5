//! Core data structures (page format, layout constants, rasters, points)

/// Pixel layout derived from a format
pub mod constants;
/// Page format and its footer descriptor
pub mod format;
/// Sub-pixel point
pub mod point;
/// 8-bit grayscale raster
pub mod raster;

pub use constants::{ChannelInfo, PageConstants};
pub use format::{FecOrder, PageFormat, TEXT_HEIGHT, TEXT_WIDTH};
pub use point::Point;
pub use raster::{BLACK, GrayRaster, WHITE};
