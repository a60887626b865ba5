//! Mapping between channel bit sequence numbers and data-area pixels.
//!
//! Coordinates are relative to the upper left pixel of the upper left
//! cross; the border is not included.

use crate::models::PageConstants;

/// Bit sequence to pixel mapping for one page layout
#[derive(Debug, Clone, Copy)]
pub struct BitChannel<'a> {
    constants: &'a PageConstants,
}

impl<'a> BitChannel<'a> {
    /// Create a channel over the given layout
    pub fn new(constants: &'a PageConstants) -> Self {
        Self { constants }
    }

    /// Number of addressable channel bits
    pub fn len(&self) -> u64 {
        self.constants.total_bits
    }

    /// True if the layout has no data pixels
    pub fn is_empty(&self) -> bool {
        self.constants.total_bits == 0
    }

    /// Pixel holding bit `seq`, or `None` when `seq >= total_bits`
    pub fn locate(&self, seq: u64) -> Option<(u64, u64)> {
        (seq < self.constants.total_bits).then(|| self.position(seq))
    }

    /// Pixel holding bit `bit` (0 = MSB) of symbol `symbol`. Every bit of
    /// every symbol lies inside the channel, so this never fails for
    /// `symbol < fec_syms` and `bit < fec_large_bits`.
    pub fn symbol_pixel(&self, symbol: u64, bit: u32) -> (u64, u64) {
        debug_assert!(symbol < self.constants.fec_syms);
        debug_assert!(bit < self.constants.fec_large_bits);
        self.position(self.symbol_bit_seq(symbol, bit))
    }

    fn position(&self, seq: u64) -> (u64, u64) {
        let c = self.constants;
        let rep = seq / c.rep_pixels;
        let mut seq = seq % c.rep_pixels;
        let mut y = c.rep_height * rep;

        if seq >= c.narrow_pixels {
            // Wide strip, no crosses
            y += c.narrow_height;
            seq -= c.narrow_pixels;
            y += seq / c.wide_width;
            (seq % c.wide_width, y)
        } else {
            // Narrow strip, skip over the crosses
            let chalf = c.format.chalf as u64;
            y += seq / c.narrow_width;
            seq %= c.narrow_width;
            let gap = seq / c.gap_width;
            let x = 2 * chalf + gap * c.format.cpitch as u64 + seq % c.gap_width;
            (x, y)
        }
    }

    /// True if (x, y) lies inside an alignment cross
    pub fn is_cross(&self, x: u64, y: u64) -> bool {
        let cpitch = self.constants.format.cpitch as u64;
        let size = 2 * self.constants.format.chalf as u64;
        x % cpitch < size && y % cpitch < size
    }

    /// Channel sequence of bit `bit` (0 = MSB) of symbol `symbol`.
    ///
    /// Symbol bits are interleaved across the whole page so that a local
    /// defect touches many symbols a little instead of one symbol a lot.
    pub fn symbol_bit_seq(&self, symbol: u64, bit: u32) -> u64 {
        symbol + bit as u64 * self.constants.fec_syms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FecOrder, PageFormat};
    use std::collections::HashSet;

    fn small_format() -> PageFormat {
        PageFormat {
            xcrosses: 5,
            ycrosses: 4,
            cpitch: 12,
            chalf: 2,
            ..PageFormat::default()
        }
    }

    #[test]
    fn test_locate_is_bijective_and_avoids_crosses() {
        let constants = PageConstants::new(&small_format());
        let channel = BitChannel::new(&constants);
        let mut seen = HashSet::new();

        for seq in 0..channel.len() {
            let (x, y) = channel.locate(seq).unwrap();
            assert!(x < constants.data_width, "seq {} x {}", seq, x);
            assert!(y < constants.data_height, "seq {} y {}", seq, y);
            assert!(!channel.is_cross(x, y), "seq {} lands on a cross", seq);
            assert!(seen.insert((x, y)), "seq {} maps to a used pixel", seq);
        }

        // Every non-cross pixel of the data area is used
        let free = (0..constants.data_height)
            .flat_map(|y| (0..constants.data_width).map(move |x| (x, y)))
            .filter(|&(x, y)| !channel.is_cross(x, y))
            .count() as u64;
        assert_eq!(free, channel.len());
    }

    #[test]
    fn test_locate_out_of_range() {
        let constants = PageConstants::new(&small_format());
        let channel = BitChannel::new(&constants);
        assert!(channel.locate(constants.total_bits).is_none());
        assert!(channel.locate(u64::MAX).is_none());
    }

    #[test]
    fn test_every_symbol_bit_has_a_pixel() {
        for fec in [FecOrder::Golay, FecOrder::Hamming(2), FecOrder::Hamming(5)] {
            let constants = PageConstants::new(&PageFormat {
                fec,
                ..small_format()
            });
            let channel = BitChannel::new(&constants);
            for symbol in 0..constants.fec_syms {
                for bit in 0..constants.fec_large_bits {
                    let seq = channel.symbol_bit_seq(symbol, bit);
                    assert!(seq < constants.total_bits);
                    assert_eq!(Some(channel.symbol_pixel(symbol, bit)), channel.locate(seq));
                }
            }
        }
    }

    #[test]
    fn test_first_bits() {
        let constants = PageConstants::new(&PageFormat::default());
        let channel = BitChannel::new(&constants);
        // First bit sits right of the first cross
        assert_eq!(channel.locate(0), Some((6, 0)));
        // Second gap starts right of the second cross
        assert_eq!(channel.locate(18), Some((30, 0)));
        // First wide strip starts at the left edge
        assert_eq!(channel.locate(constants.narrow_pixels), Some((0, 6)));
    }

    #[test]
    fn test_is_cross() {
        let constants = PageConstants::new(&PageFormat::default());
        let channel = BitChannel::new(&constants);
        assert!(channel.is_cross(0, 0));
        assert!(channel.is_cross(5, 5));
        assert!(!channel.is_cross(6, 0));
        assert!(channel.is_cross(24, 29));
        assert!(!channel.is_cross(24, 30));
    }
}
