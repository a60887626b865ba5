//! Payload to page rasters.
//!
//! Bytes are cut into FEC payload chunks MSB first, each chunk is expanded
//! into a symbol and the symbol bits are spread over the page channel. A
//! page is handed to the [`PageSink`] as soon as it has no free symbol
//! slot left; the last page is shipped by [`Encoder::finish`].

/// Footer label font
pub mod font;
/// Page furniture and bit placement
pub mod page;

use crate::channel::BitChannel;
use crate::error::{OptarError, Result};
use crate::fec::FecCodec;
use crate::models::{GrayRaster, PageConstants, PageFormat};
pub use page::PageRenderer;
use std::io;
use tracing::{debug, info};

/// Highest page number an encoder will produce
pub const MAX_PAGES: u32 = 9999;

/// Receives finished pages in order
pub trait PageSink {
    /// Take ownership of page `page_number` (1-based)
    fn accept_page(&mut self, page_number: u32, page: GrayRaster) -> Result<()>;
}

impl PageSink for Vec<GrayRaster> {
    fn accept_page(&mut self, _page_number: u32, page: GrayRaster) -> Result<()> {
        self.push(page);
        Ok(())
    }
}

/// Streaming page encoder
pub struct Encoder<S: PageSink> {
    constants: PageConstants,
    codec: FecCodec,
    identifier: String,
    page_count: u32,
    sink: S,
    page: GrayRaster,
    page_number: u32,
    symbol: u64,
    // Pending payload bits behind a leading sentinel 1
    accumulator: u64,
}

impl<S: PageSink> Encoder<S> {
    /// Start encoding with `format`. `page_count` is only used for the
    /// footer label; [`PageConstants::pages_for`] gives the exact value.
    pub fn new(format: PageFormat, identifier: &str, page_count: u32, sink: S) -> Result<Self> {
        format.validate()?;
        let constants = PageConstants::new(&format);
        if constants.fec_syms == 0 {
            return Err(OptarError::InvalidFormat(format!(
                "format {} has no room for a single symbol",
                format
            )));
        }
        let mut encoder = Self {
            constants,
            codec: FecCodec::new(format.fec),
            identifier: identifier.to_string(),
            page_count,
            sink,
            page: GrayRaster::default(),
            page_number: 0,
            symbol: 0,
            accumulator: 1,
        };
        encoder.new_page()?;
        Ok(encoder)
    }

    /// Layout in use
    pub fn constants(&self) -> &PageConstants {
        &self.constants
    }

    /// Number of the page currently being filled
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    fn new_page(&mut self) -> Result<()> {
        if self.page_number >= MAX_PAGES {
            return Err(OptarError::TooManyPages);
        }
        self.page_number += 1;
        let label = self.constants.format.label(
            self.page_number,
            self.page_count,
            &self.identifier,
        );
        self.page = PageRenderer::new(&self.constants).format_page(&label);
        self.symbol = 0;
        debug!(page = self.page_number, "started page");
        Ok(())
    }

    fn ship_page(&mut self) -> Result<()> {
        let page = std::mem::take(&mut self.page);
        info!(
            page = self.page_number,
            symbols = self.symbol,
            "page complete"
        );
        self.sink.accept_page(self.page_number, page)
    }

    fn emit_symbol(&mut self, data: u32) -> Result<()> {
        if self.symbol == self.constants.fec_syms {
            self.ship_page()?;
            self.new_page()?;
        }

        let coded = self.codec.encode(data);
        let large = self.codec.large_bits();
        let channel = BitChannel::new(&self.constants);
        let renderer = PageRenderer::new(&self.constants);
        for bit in 0..large {
            let value = (coded >> (large - 1 - bit)) & 1 == 1;
            let seq = channel.symbol_bit_seq(self.symbol, bit);
            renderer.put_bit(&mut self.page, seq, value);
        }
        self.symbol += 1;
        Ok(())
    }

    fn push_bit(&mut self, bit: bool) -> Result<()> {
        let small = self.codec.small_bits();
        self.accumulator = (self.accumulator << 1) | bit as u64;
        if self.accumulator & (1u64 << small) != 0 {
            let data = (self.accumulator & ((1u64 << small) - 1)) as u32;
            self.accumulator = 1;
            self.emit_symbol(data)?;
        }
        Ok(())
    }

    /// Append one payload byte, MSB first
    pub fn feed_byte(&mut self, byte: u8) -> Result<()> {
        for shift in (0..8).rev() {
            self.push_bit((byte >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Append a run of payload bytes
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        bytes.iter().try_for_each(|&b| self.feed_byte(b))
    }

    /// Pad the pending partial symbol with zeros, ship the last page and
    /// return the sink
    pub fn finish(mut self) -> Result<S> {
        for _ in 0..self.codec.small_bits() - 1 {
            self.push_bit(false)?;
        }
        self.ship_page()?;
        Ok(self.sink)
    }
}

impl<S: PageSink> io::Write for Encoder<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.feed(buf).map_err(|e| match e {
            OptarError::Io(inner) => inner,
            other => io::Error::other(other),
        })?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Encode a whole payload into page rasters
pub fn encode_pages(payload: &[u8], format: &PageFormat, identifier: &str) -> Result<Vec<GrayRaster>> {
    format.validate()?;
    let constants = PageConstants::new(format);
    let page_count = constants.pages_for(payload.len() as u64);
    let page_count = u32::try_from(page_count)
        .ok()
        .filter(|&n| n <= MAX_PAGES)
        .ok_or(OptarError::TooManyPages)?;

    let mut encoder = Encoder::new(*format, identifier, page_count, Vec::new())?;
    encoder.feed(payload)?;
    encoder.finish()
}
