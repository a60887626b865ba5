/// Decoding of one scanned page, one stage at a time.
///
/// Each stage is its own type and consumes the previous one:
/// [`RawPage`] → [`ThresholdedPage`] → [`LocatedPage`] → [`SyncedPage`] →
/// [`SampledPage`] → [`DecodedPage`]. Only locating the frame corners can
/// fail; later stages record damage and carry on.
use super::diagnostics::{self, TickEdges};
use super::sampler::BitSampler;
use super::stats::ErrorStats;
use crate::calibration::{
    Corners, CrossGrid, CrossSearch, Cutlevels, Histogram, PageScale, analyze_cutlevel, filter,
    remove_border_dirt,
};
use crate::channel::BitChannel;
use crate::config::CalibrationConfig;
use crate::error::OptarError;
use crate::fec::{BitDirection, BitFlip, FecCodec};
use crate::models::{GrayRaster, PageConstants};
use crate::utils::gamma;
use tracing::{debug, info};

/// Where a page is in the decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecodeStage {
    /// Scanner values, not yet analysed
    Raw,
    /// Linearized, cutlevels known, margin dirt removed
    Thresholded,
    /// Frame corners and scale known
    CornersFound,
    /// Crosses calibrated, image smoothed for sampling
    Synced,
    /// Every symbol read and corrected
    Sampled,
    /// Statistics emitted and diagnostic image ready
    Finalized,
}

/// A damaged channel bit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadBit {
    /// Symbol index on the page
    pub symbol: u64,
    /// Bit within the symbol, 0 = first on the page
    pub bit: u32,
    /// Image pixel, rounded
    pub x: i64,
    /// Image pixel, rounded
    pub y: i64,
    /// Flip direction
    pub direction: BitDirection,
}

/// Corner search failure, with the cleaned image for inspection
#[derive(Debug)]
pub struct CornerFailure {
    /// Why the decode stopped
    pub error: OptarError,
    /// Linearized image after dirt removal
    pub image: GrayRaster,
}

impl From<CornerFailure> for OptarError {
    fn from(failure: CornerFailure) -> Self {
        failure.error
    }
}

/// Layout and tunables shared by every stage
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Expected page layout
    pub constants: &'a PageConstants,
    /// Calibration tunables
    pub config: &'a CalibrationConfig,
}

/// Page as read from the scanner
pub struct RawPage<'a> {
    ctx: PageContext<'a>,
    image: GrayRaster,
}

impl<'a> RawPage<'a> {
    /// Wrap a gamma-compressed scan
    pub fn new(image: GrayRaster, ctx: PageContext<'a>) -> Self {
        Self { ctx, image }
    }

    /// Current stage
    pub fn stage(&self) -> DecodeStage {
        DecodeStage::Raw
    }

    /// Linearize, estimate the global cutlevels and erase margin dirt
    pub fn threshold(self) -> ThresholdedPage<'a> {
        let Self { ctx, mut image } = self;
        gamma::linearize(&mut image, ctx.config.input_gamma);

        let histogram = Histogram::of(&image);
        info!(
            width = image.width(),
            height = image.height(),
            average = histogram.average(),
            "page histogram"
        );
        let cutlevels = analyze_cutlevel(&histogram, ctx.config);
        info!(
            cutlevel = cutlevels.global,
            fill_cutlevel = cutlevels.fill,
            rounds = cutlevels.iterations,
            "cutlevels settled"
        );

        let dirt_pixels = remove_border_dirt(&mut image, cutlevels.fill);
        info!(dirt_pixels, "erased margin dirt");

        ThresholdedPage {
            ctx,
            image,
            cutlevels,
            dirt_pixels,
        }
    }
}

/// Linearized page with known cutlevels
pub struct ThresholdedPage<'a> {
    ctx: PageContext<'a>,
    image: GrayRaster,
    cutlevels: Cutlevels,
    dirt_pixels: u64,
}

impl<'a> ThresholdedPage<'a> {
    /// Current stage
    pub fn stage(&self) -> DecodeStage {
        DecodeStage::Thresholded
    }

    /// Global cutlevels
    pub fn cutlevels(&self) -> Cutlevels {
        self.cutlevels
    }

    /// Pixels erased as dirt
    pub fn dirt_pixels(&self) -> u64 {
        self.dirt_pixels
    }

    /// Find the frame corners and derive the page scale
    pub fn find_corners(self) -> Result<LocatedPage<'a>, CornerFailure> {
        let Self {
            ctx,
            image,
            cutlevels,
            ..
        } = self;
        let corners = match Corners::find(&image, cutlevels.global) {
            Ok(corners) => corners,
            Err(error) => return Err(CornerFailure { error, image }),
        };
        let scale = PageScale::measure(&corners, ctx.constants, ctx.config);

        let [ul, ur, ll, lr] = corners.points;
        info!(
            "corners at ({}, {}) ({}, {}) ({}, {}) ({}, {})",
            ul.x, ul.y, ur.x, ur.y, ll.x, ll.y, lr.x, lr.y
        );
        info!(
            hpixel = scale.hpixel,
            vpixel = scale.vpixel,
            skew = scale.axes.skew(),
            perpendicularity = scale.axes.perpendicularity(),
            search_half = scale.search_half,
            "page scale"
        );

        Ok(LocatedPage {
            ctx,
            image,
            cutlevels,
            corners,
            scale,
        })
    }
}

/// Page with known frame corners
pub struct LocatedPage<'a> {
    ctx: PageContext<'a>,
    image: GrayRaster,
    cutlevels: Cutlevels,
    corners: Corners,
    scale: PageScale,
}

impl<'a> LocatedPage<'a> {
    /// Current stage
    pub fn stage(&self) -> DecodeStage {
        DecodeStage::CornersFound
    }

    /// Frame corners
    pub fn corners(&self) -> &Corners {
        &self.corners
    }

    /// Page scale
    pub fn scale(&self) -> &PageScale {
        &self.scale
    }

    /// Calibrate every cross, then smooth the image for sampling and start
    /// the diagnostic copy with corner and cross marks
    pub fn sync(self) -> SyncedPage<'a> {
        let Self {
            ctx,
            mut image,
            cutlevels,
            corners,
            scale,
        } = self;

        let grid = CrossSearch::new(&image, cutlevels.global, &scale, ctx.constants, ctx.config)
            .sync(&corners, ctx.constants);
        debug!(crosses = grid.centers().len(), "cross grid calibrated");

        let config = ctx.config;
        filter::minmax(
            &mut image,
            filter::minmax_cycles(scale.hpixel, scale.vpixel, config.minmax_filter),
        );
        filter::blur(
            &mut image,
            filter::blur_cycles(scale.hpixel, scale.vpixel, config.pixel_blur),
        );

        let mut diagnostic = image.clone();
        for corner in corners.points {
            diagnostics::mark(&mut diagnostic, corner);
        }
        let reach = scale.search_half as f64;
        for &center in grid.centers() {
            diagnostics::mark(&mut diagnostic, center);
            for (dx, dy) in [(reach, 0.0), (-reach, 0.0), (0.0, reach), (0.0, -reach)] {
                diagnostics::mark(&mut diagnostic, scale.axes.shift(center, dx, dy));
            }
        }

        SyncedPage {
            ctx,
            image,
            diagnostic,
            corners,
            scale,
            grid,
        }
    }
}

/// Page ready for bit sampling
pub struct SyncedPage<'a> {
    ctx: PageContext<'a>,
    image: GrayRaster,
    diagnostic: GrayRaster,
    corners: Corners,
    scale: PageScale,
    grid: CrossGrid,
}

impl<'a> SyncedPage<'a> {
    /// Current stage
    pub fn stage(&self) -> DecodeStage {
        DecodeStage::Synced
    }

    /// Calibrated crosses
    pub fn grid(&self) -> &CrossGrid {
        &self.grid
    }

    /// Read and correct every symbol on the page. `report` sees each
    /// damaged bit as it is found.
    pub fn sample(self, report: &mut dyn FnMut(&BadBit)) -> SampledPage<'a> {
        let Self {
            ctx,
            image,
            mut diagnostic,
            corners,
            scale,
            grid,
        } = self;
        let constants = ctx.constants;
        let format = &constants.format;
        let codec = FecCodec::new(format.fec);
        let channel = BitChannel::new(constants);
        let sampler = BitSampler::new(format, &grid, &scale, ctx.config);

        let (left, right, top, bottom) = corners.edges();
        let edges = TickEdges {
            left,
            right,
            top,
            bottom,
        };
        let box_size = diagnostics::bad_bit_box_size(scale.hpixel, scale.vpixel);

        let mut stats = ErrorStats {
            used_bits: constants.used_bits,
            ..ErrorStats::default()
        };
        let mut symbols = Vec::with_capacity(constants.fec_syms as usize);
        let mut flips: Vec<BitFlip> = Vec::new();
        let large = codec.large_bits();

        for symbol in 0..constants.fec_syms {
            let mut received = 0u32;
            for bit in 0..large {
                let (x, y) = channel.symbol_pixel(symbol, bit);
                let (black, value, site) = sampler.read_bit(&image, x, y);
                if x % 8 == 0 || y % 8 == 0 {
                    diagnostics::debug_dot(&mut diagnostic, site.position, value);
                }
                received = (received << 1) | black as u32;
            }

            flips.clear();
            let (data, status) = codec.decode(received, &mut |flip| flips.push(flip));
            for flip in &flips {
                stats.record_flip(flip.direction);
                let (x, y) = channel.symbol_pixel(symbol, flip.bit);
                let (px, py) = sampler.bit_site(x, y).position.round();
                diagnostics::mark_bad_bit(&mut diagnostic, px, py, flip.direction, &edges, box_size);
                let bad = BadBit {
                    symbol,
                    bit: flip.bit,
                    x: px,
                    y: py,
                    direction: flip.direction,
                };
                debug!(x = px, y = py, direction = ?flip.direction, "damaged bit");
                report(&bad);
            }
            stats.record_symbol(&codec, status);
            symbols.push(data);
        }

        SampledPage {
            ctx,
            diagnostic,
            symbols,
            stats,
        }
    }
}

/// Page with every symbol decoded
pub struct SampledPage<'a> {
    ctx: PageContext<'a>,
    diagnostic: GrayRaster,
    symbols: Vec<u32>,
    stats: ErrorStats,
}

impl SampledPage<'_> {
    /// Current stage
    pub fn stage(&self) -> DecodeStage {
        DecodeStage::Sampled
    }

    /// Emit statistics and gamma-encode the diagnostic image
    pub fn finalize(self, label: &str) -> DecodedPage {
        let Self {
            ctx,
            mut diagnostic,
            symbols,
            stats,
        } = self;
        stats.log_summary(ctx.constants, label);
        gamma::compress(&mut diagnostic, ctx.config.input_gamma);
        DecodedPage {
            symbols,
            stats,
            diagnostic,
        }
    }
}

/// Result of decoding one page
#[derive(Debug, Clone)]
pub struct DecodedPage {
    /// Payload of every symbol, in page order
    pub symbols: Vec<u32>,
    /// Damage found on this page
    pub stats: ErrorStats,
    /// Gamma-encoded diagnostic image
    pub diagnostic: GrayRaster,
}

impl DecodedPage {
    /// Current stage
    pub fn stage(&self) -> DecodeStage {
        DecodeStage::Finalized
    }
}

/// Run every stage on one scan
pub fn decode_page(
    image: GrayRaster,
    ctx: PageContext<'_>,
    label: &str,
    report: &mut dyn FnMut(&BadBit),
) -> Result<DecodedPage, CornerFailure> {
    let located = RawPage::new(image, ctx).threshold().find_corners()?;
    Ok(located.sync().sample(report).finalize(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_pages;
    use crate::models::{FecOrder, PageFormat, Point, WHITE};

    fn data_pixel_site(page: &SyncedPage<'_>, x: u64, y: u64) -> Point {
        let format = &page.ctx.constants.format;
        BitSampler::new(format, &page.grid, &page.scale, page.ctx.config)
            .bit_site(x, y)
            .position
    }

    fn small_format(fec: FecOrder) -> PageFormat {
        PageFormat {
            xcrosses: 9,
            ycrosses: 8,
            cpitch: 24,
            chalf: 3,
            fec,
            border: 2,
            text_height: 12,
        }
    }

    #[test]
    fn test_stages_in_order() {
        let format = small_format(FecOrder::Golay);
        let constants = PageConstants::new(&format);
        let config = CalibrationConfig::default();
        let ctx = PageContext {
            constants: &constants,
            config: &config,
        };
        let payload: Vec<u8> = (0..200u32).map(|i| (i * 7) as u8).collect();
        let page = encode_pages(&payload, &format, "t").unwrap().remove(0);

        let raw = RawPage::new(page, ctx);
        assert_eq!(raw.stage(), DecodeStage::Raw);
        let thresholded = raw.threshold();
        assert_eq!(thresholded.stage(), DecodeStage::Thresholded);
        assert_eq!(thresholded.cutlevels().global, 26);
        assert_eq!(thresholded.dirt_pixels(), 0);
        let located = thresholded.find_corners().unwrap();
        assert_eq!(located.stage(), DecodeStage::CornersFound);
        assert_eq!(located.scale().hpixel, 1.0);
        let synced = located.sync();
        assert_eq!(synced.stage(), DecodeStage::Synced);
        assert!(data_pixel_site(&synced, 6, 0).distance(&Point::new(8.0, 2.0)) < 1e-9);

        let mut reports = 0;
        let sampled = synced.sample(&mut |_| reports += 1);
        assert_eq!(sampled.stage(), DecodeStage::Sampled);
        let decoded = sampled.finalize("page 1");
        assert_eq!(decoded.stage(), DecodeStage::Finalized);
        assert_eq!(reports, 0);
        assert_eq!(decoded.stats.bad_total, 0);
        assert_eq!(decoded.symbols.len() as u64, constants.fec_syms);
    }

    #[test]
    fn test_blank_scan_fails_at_corners() {
        let format = small_format(FecOrder::Golay);
        let constants = PageConstants::new(&format);
        let config = CalibrationConfig::default();
        let ctx = PageContext {
            constants: &constants,
            config: &config,
        };
        let blank = GrayRaster::new(100, 100, WHITE);
        let failure = decode_page(blank, ctx, "blank", &mut |_| {}).unwrap_err();
        assert!(matches!(failure.error, OptarError::CornerNotFound { .. }));
        assert_eq!(failure.image.width(), 100);
    }
}
