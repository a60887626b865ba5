//! Scanned pages back to payload bytes
//!
//! Every page runs the stage chain in [`page`] on its own; pages are
//! independent until their symbol payloads are joined in page order:
//! - Calibration (threshold, dirt, corners, crosses, smoothing)
//! - Bit sampling through the cross grid
//! - FEC correction with damage reporting
//! - Byte reassembly across page boundaries

/// Diagnostic image drawing
pub mod diagnostics;
/// Per-page decode stages
pub mod page;
/// Symbol payloads to bytes
pub mod payload;
/// Data pixel location and sampling
pub mod sampler;
/// Error counters and reporting
pub mod stats;

pub use page::{
    BadBit, CornerFailure, DecodeStage, DecodedPage, LocatedPage, PageContext, RawPage,
    SampledPage, SyncedPage, ThresholdedPage,
};
pub use payload::ByteAssembler;
pub use sampler::{BitSampler, BitSite};
pub use stats::ErrorStats;

use crate::config::CalibrationConfig;
use crate::error::{OptarError, Result};
use crate::models::{GrayRaster, PageConstants, PageFormat};
use rayon::prelude::*;
use tracing::info;

/// Outcome of decoding a run of pages
#[derive(Debug, Clone)]
pub struct DecodedRun {
    /// Reassembled payload
    pub payload: Vec<u8>,
    /// Damage over all pages
    pub stats: ErrorStats,
    /// Per-page results, in page order
    pub pages: Vec<DecodedPage>,
}

/// Decode a single gamma-compressed scan
pub fn decode_page(
    image: GrayRaster,
    constants: &PageConstants,
    config: &CalibrationConfig,
) -> Result<DecodedPage> {
    let ctx = PageContext { constants, config };
    Ok(page::decode_page(image, ctx, "page", &mut |_| {})?)
}

/// Decode scans of consecutive pages, first page first.
///
/// Pages are processed in parallel. When frames are missing on several
/// pages, the error of the lowest-numbered one is returned.
pub fn decode_pages(
    scans: Vec<GrayRaster>,
    format: &PageFormat,
    config: &CalibrationConfig,
) -> Result<DecodedRun> {
    decode_pages_with(scans, format, config, |_, _| {})
}

/// Like [`decode_pages`], handing the lowest-numbered page whose corners
/// were not found to `on_failure` (with its 0-based index) before the run
/// is aborted. `on_failure` runs at most once.
pub fn decode_pages_with<F>(
    scans: Vec<GrayRaster>,
    format: &PageFormat,
    config: &CalibrationConfig,
    on_failure: F,
) -> Result<DecodedRun>
where
    F: FnOnce(usize, &CornerFailure),
{
    format.validate()?;
    let constants = PageConstants::new(format);
    info!(format = %format, "\n{}", constants.channel_info());

    let results: Vec<std::result::Result<DecodedPage, CornerFailure>> = scans
        .into_par_iter()
        .enumerate()
        .map(|(index, scan)| {
            let ctx = PageContext {
                constants: &constants,
                config,
            };
            let label = format!("page {}", index + 1);
            page::decode_page(scan, ctx, &label, &mut |_| {})
        })
        .collect();

    let mut pages = Vec::with_capacity(results.len());
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(page) => pages.push(page),
            Err(failure) => {
                on_failure(index, &failure);
                return Err(failure.into());
            }
        }
    }

    let mut assembler = ByteAssembler::new();
    let mut stats = ErrorStats::default();
    for page in &pages {
        assembler.push_symbols(&page.symbols, format.fec);
        stats.merge(&page.stats);
    }
    if pages.len() > 1 {
        stats.log_summary(&constants, "total");
    }

    Ok(DecodedRun {
        payload: assembler.into_bytes(),
        stats,
        pages,
    })
}
