//! Forward error correction for channel symbols
//!
//! - Extended Golay(24,12), correcting up to 3 bits per symbol
//! - Extended Hamming of order 2..=5, correcting 1 and detecting 2 bits

/// Register bit helpers (parity, gap insertion and removal)
pub mod bits;
/// Extended Golay(24,12) codec
pub mod golay;
/// Extended Hamming codec
pub mod hamming;

use crate::models::FecOrder;

/// How a damaged channel bit was flipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDirection {
    /// Written white, read black (black dirt)
    ZeroToOne,
    /// Written black, read white (white dirt)
    OneToZero,
    /// Part of an irreparable symbol
    Unknown,
}

/// A damaged bit inside one symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitFlip {
    /// Bit index within the symbol, 0 = MSB = first on the page
    pub bit: u32,
    /// Flip direction
    pub direction: BitDirection,
}

/// Outcome of decoding one symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolStatus {
    /// No damage
    Clean,
    /// This many bits were repaired
    Corrected(u32),
    /// Damage beyond the code's capacity; a best-effort value was returned
    Irreparable,
}

/// Symbol codec selected by the page's [`FecOrder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FecCodec {
    order: FecOrder,
}

impl FecCodec {
    /// Create a codec for `order`
    pub fn new(order: FecOrder) -> Self {
        Self { order }
    }

    /// The scheme in use
    pub fn order(&self) -> FecOrder {
        self.order
    }

    /// Channel bits per symbol
    pub fn large_bits(&self) -> u32 {
        self.order.large_bits()
    }

    /// Payload bits per symbol
    pub fn small_bits(&self) -> u32 {
        self.order.small_bits()
    }

    /// Expand `small_bits` of payload into a `large_bits` symbol
    pub fn encode(&self, data: u32) -> u32 {
        match self.order {
            FecOrder::Golay => golay::encode(data),
            FecOrder::Hamming(order) => hamming::encode(data, order),
        }
    }

    /// Shrink a received symbol back to its payload, reporting each
    /// damaged bit through `report`
    pub fn decode(&self, received: u32, report: &mut dyn FnMut(BitFlip)) -> (u32, SymbolStatus) {
        match self.order {
            FecOrder::Golay => golay::decode(received, report),
            FecOrder::Hamming(order) => hamming::decode(received, order, report),
        }
    }

    /// Bits charged to the error counters for one irreparable symbol
    pub fn irreparable_weight(&self) -> u64 {
        match self.order {
            FecOrder::Golay => 4,
            FecOrder::Hamming(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_dispatch() {
        let golay = FecCodec::new(FecOrder::Golay);
        assert_eq!(golay.large_bits(), 24);
        let (value, status) = golay.decode(golay.encode(0xabc), &mut |_| {});
        assert_eq!((value, status), (0xabc, SymbolStatus::Clean));

        let hamming = FecCodec::new(FecOrder::Hamming(3));
        assert_eq!(hamming.large_bits(), 8);
        assert_eq!(hamming.small_bits(), 4);
        let (value, status) = hamming.decode(hamming.encode(0b1011) ^ 0x10, &mut |_| {});
        assert_eq!((value, status), (0b1011, SymbolStatus::Corrected(1)));
    }

    #[test]
    fn test_irreparable_weight() {
        assert_eq!(FecCodec::new(FecOrder::Golay).irreparable_weight(), 4);
        assert_eq!(FecCodec::new(FecOrder::Hamming(4)).irreparable_weight(), 2);
    }
}
