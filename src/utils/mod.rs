//! Utility functions for image processing
//!
//! - Gamma tables (scanner values to photon counts and back)
//! - Geometry (bilinear interpolation, scan axes, angles)

/// Gamma lookup tables
pub mod gamma;
/// Interpolation and scan axes
pub mod geometry;
