use super::format::PageFormat;

/// Pixel-level layout derived from a [`PageFormat`].
///
/// A page is a stack of "repetitions": one narrow strip holding a row of
/// crosses (and the data gaps between them) followed by one wide strip of
/// pure data. The last row of crosses closes the stack with a trailing
/// narrow strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConstants {
    /// The format these constants were derived from
    pub format: PageFormat,

    /// Width of the data and cross rectangle
    pub data_width: u64,
    /// Height of the data and cross rectangle
    pub data_height: u64,
    /// Full page width including border
    pub width: u64,
    /// Full page height including border and footer
    pub height: u64,

    /// Height of a strip containing crosses
    pub narrow_height: u64,
    /// Width of the data gap between two crosses
    pub gap_width: u64,
    /// Usable width of a narrow strip
    pub narrow_width: u64,
    /// Usable pixels of a narrow strip
    pub narrow_pixels: u64,

    /// Height of a strip without crosses
    pub wide_height: u64,
    /// Width of a strip without crosses
    pub wide_width: u64,
    /// Pixels of a strip without crosses
    pub wide_pixels: u64,

    /// Height of one narrow + wide pair
    pub rep_height: u64,
    /// Payload pixels in one narrow + wide pair
    pub rep_pixels: u64,

    /// Raw channel bits, including those too few to fill a symbol
    pub total_bits: u64,

    /// Channel bits per FEC symbol
    pub fec_large_bits: u32,
    /// Payload bits per FEC symbol
    pub fec_small_bits: u32,

    /// FEC symbols per page
    pub fec_syms: u64,
    /// Net payload bits per page
    pub net_bits: u64,
    /// Raw bits occupied by symbols
    pub used_bits: u64,
}

impl PageConstants {
    /// Derive every layout constant from `format`.
    ///
    /// Pure arithmetic: a format that fails [`PageFormat::validate`] yields
    /// degenerate (but not rejected) values.
    pub fn new(format: &PageFormat) -> Self {
        let xcrosses = format.xcrosses as u64;
        let ycrosses = format.ycrosses as u64;
        let cpitch = format.cpitch as u64;
        let chalf = format.chalf as u64;
        let border = format.border as u64;

        let data_width = (cpitch * xcrosses.saturating_sub(1)) + 2 * chalf;
        let data_height = (cpitch * ycrosses.saturating_sub(1)) + 2 * chalf;
        let width = 2 * border + data_width;
        let height = 2 * border + data_height + format.text_height as u64;

        let narrow_height = 2 * chalf;
        let gap_width = cpitch.saturating_sub(2 * chalf);
        let narrow_width = gap_width * xcrosses.saturating_sub(1);
        let narrow_pixels = narrow_height * narrow_width;

        let wide_height = gap_width;
        let wide_width = data_width;
        let wide_pixels = wide_height * wide_width;

        let rep_height = narrow_height + wide_height;
        let rep_pixels = narrow_pixels + wide_pixels;

        let total_bits = rep_pixels * ycrosses.saturating_sub(1) + narrow_pixels;

        let fec_large_bits = format.fec.large_bits();
        let fec_small_bits = format.fec.small_bits();

        let fec_syms = total_bits / fec_large_bits as u64;
        let net_bits = fec_syms * fec_small_bits as u64;
        let used_bits = fec_syms * fec_large_bits as u64;

        Self {
            format: *format,
            data_width,
            data_height,
            width,
            height,
            narrow_height,
            gap_width,
            narrow_width,
            narrow_pixels,
            wide_height,
            wide_width,
            wide_pixels,
            rep_height,
            rep_pixels,
            total_bits,
            fec_large_bits,
            fec_small_bits,
            fec_syms,
            net_bits,
            used_bits,
        }
    }

    /// Pages needed to carry `payload_len` bytes (at least one)
    pub fn pages_for(&self, payload_len: u64) -> u64 {
        if self.net_bits == 0 {
            return 1;
        }
        (payload_len * 8).div_ceil(self.net_bits).max(1)
    }

    /// Human readable capacity report
    pub fn channel_info(&self) -> ChannelInfo {
        let page_pixels = (self.width * self.height) as f64;
        ChannelInfo {
            unformatted_kb: page_pixels / 8.0 / 1000.0,
            raw_kb: self.total_bits as f64 / 8.0 / 1000.0,
            net_kb: self.net_bits as f64 / 8.0 / 1000.0,
            symbols: self.fec_syms,
            unused_bits: self.total_bits - self.used_bits,
            border_overhead: 100.0
                * (1.0 - (self.data_width * self.data_height) as f64 / page_pixels),
            cross_overhead: 100.0 * (1.0 - self.total_bits as f64 / page_pixels),
            fec_overhead: 100.0 * (1.0 - self.net_bits as f64 / page_pixels),
        }
    }
}

/// Capacity summary of one page layout
#[derive(Debug, Clone, Copy)]
pub struct ChannelInfo {
    /// Whole page area as bits, in kB
    pub unformatted_kb: f64,
    /// Raw channel capacity in kB
    pub raw_kb: f64,
    /// Net payload capacity in kB
    pub net_kb: f64,
    /// FEC symbols per page
    pub symbols: u64,
    /// Channel bits left over after the last whole symbol
    pub unused_bits: u64,
    /// Percentage of the page taken by border and footer
    pub border_overhead: f64,
    /// Percentage taken by border, footer and crosses
    pub cross_overhead: f64,
    /// Percentage taken by border, footer, crosses and error correction
    pub fec_overhead: f64,
}

impl std::fmt::Display for ChannelInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Unformatted channel capacity {:.3} kB", self.unformatted_kb)?;
        writeln!(f, "Formatted raw channel capacity {:.3} kB", self.raw_kb)?;
        writeln!(f, "Net EC payload capacity {:.3} kB", self.net_kb)?;
        writeln!(f, "{} EC symbols", self.symbols)?;
        writeln!(f, "{} bits unused (incomplete symbol)", self.unused_bits)?;
        writeln!(f, "Border taking {:.2}% of unformatted capacity", self.border_overhead)?;
        writeln!(
            f,
            "Border with crosses taking {:.2}% of unformatted capacity",
            self.cross_overhead
        )?;
        write!(
            f,
            "Border with crosses and EC taking {:.2}% of unformatted capacity",
            self.fec_overhead
        )
    }
}
