/// Reassembly of decoded symbol payloads into bytes
use crate::models::FecOrder;

/// Collects payload bits MSB first into bytes. Bits left over at the end
/// of one page carry into the next.
#[derive(Debug, Clone)]
pub struct ByteAssembler {
    // Pending bits behind a leading sentinel 1
    accumulator: u32,
    bytes: Vec<u8>,
}

impl Default for ByteAssembler {
    fn default() -> Self {
        Self {
            accumulator: 1,
            bytes: Vec::new(),
        }
    }
}

impl ByteAssembler {
    /// Empty assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one bit
    pub fn push_bit(&mut self, bit: bool) {
        self.accumulator = (self.accumulator << 1) | bit as u32;
        if self.accumulator & 0x100 != 0 {
            self.bytes.push(self.accumulator as u8);
            self.accumulator = 1;
        }
    }

    /// Append the low `count` bits of `value`, most significant first
    pub fn push_bits(&mut self, value: u32, count: u32) {
        for shift in (0..count).rev() {
            self.push_bit((value >> shift) & 1 == 1);
        }
    }

    /// Append decoded symbol payloads of one page
    pub fn push_symbols(&mut self, symbols: &[u32], fec: FecOrder) {
        let small = fec.small_bits();
        for &symbol in symbols {
            self.push_bits(symbol, small);
        }
    }

    /// Bytes completed so far
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Completed bytes; an unfinished trailing byte is dropped
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first() {
        let mut asm = ByteAssembler::new();
        asm.push_bits(0xabc, 12);
        assert_eq!(asm.bytes(), &[0xab]);
        asm.push_bits(0xd, 4);
        assert_eq!(asm.into_bytes(), vec![0xab, 0xcd]);
    }

    #[test]
    fn test_carries_across_pages() {
        // Hamming(3) carries 4 payload bits per symbol
        let mut asm = ByteAssembler::new();
        asm.push_symbols(&[0x1, 0x2, 0x3], FecOrder::Hamming(3));
        assert_eq!(asm.bytes(), &[0x12]);
        asm.push_symbols(&[0x4], FecOrder::Hamming(3));
        assert_eq!(asm.bytes(), &[0x12, 0x34]);
    }
}
