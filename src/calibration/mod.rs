//! Geometry and threshold recovery for scanned pages
//!
//! Stages, in the order a page decode runs them:
//! 1. Histogram and global cutlevels ([`histogram`])
//! 2. Dirt removal in the white margin ([`dirt`])
//! 3. Frame corners and page scale ([`corners`])
//! 4. Cross resynchronization and per-cross cutlevels ([`crosses`])
//! 5. Min/max and blur smoothing ([`filter`])

/// Frame corner scan and page scale
pub mod corners;
/// Cross search and local cutlevels
pub mod crosses;
/// Margin flood fill
pub mod dirt;
/// Morphological and blur filters
pub mod filter;
/// Histogram and cutlevel estimate
pub mod histogram;

pub use corners::{Corners, PageScale};
pub use crosses::{CrossGrid, CrossSearch};
pub use dirt::remove_border_dirt;
pub use histogram::{Cutlevels, Histogram, analyze_cutlevel};
