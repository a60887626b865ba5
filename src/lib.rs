//! rust_optar - store data on paper as a grid of printed pixels
//!
//! Payload bytes are protected with a Golay or extended Hamming code,
//! interleaved across the page and rendered with a frame and a lattice of
//! alignment crosses. Decoding recovers the page geometry from a scan,
//! samples every data pixel and corrects what the scanner got wrong.
//!
//! ```no_run
//! use rust_optar::{CalibrationConfig, PageFormat, decode_pages, encode_pages};
//!
//! let format = PageFormat::default();
//! let pages = encode_pages(b"hello paper", &format, "greeting").unwrap();
//! let run = decode_pages(pages, &format, &CalibrationConfig::default()).unwrap();
//! assert_eq!(&run.payload[..11], b"hello paper");
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Threshold and geometry recovery from scans
pub mod calibration;
/// Channel bit to data pixel mapping
pub mod channel;
/// Decode tunables
pub mod config;
/// Scans back to payload
pub mod decoder;
/// Payload to page rasters
pub mod encoder;
/// Error type
pub mod error;
/// Golay and Hamming codecs
pub mod fec;
/// Page format, layout constants, rasters and points
pub mod models;
/// File helpers and multi-page drivers
pub mod tools;
/// Gamma tables and interpolation
pub mod utils;

pub use channel::BitChannel;
pub use config::CalibrationConfig;
pub use decoder::{DecodedPage, DecodedRun, ErrorStats, decode_page, decode_pages};
pub use encoder::{Encoder, PageSink, encode_pages};
pub use error::{OptarError, Result};
pub use fec::FecCodec;
pub use models::{FecOrder, GrayRaster, PageConstants, PageFormat, Point};
