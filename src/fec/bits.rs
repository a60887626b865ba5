//! Bit-level register helpers shared by the Hamming codec

/// Parity check masks. Mask `k` covers every register position whose
/// index has bit `k` set, so the syndrome spells out the damaged position.
pub const PARITY_MASKS: [u64; 5] = [
    0xaaaa_aaaa,
    0xcccc_cccc,
    0xf0f0_f0f0,
    0xff00_ff00,
    0xffff_0000,
];

/// Even parity of all bits: 1 if an odd number of bits is set
pub fn parity(value: u64) -> u64 {
    (value.count_ones() & 1) as u64
}

/// Open a zero gap at position `bit`, shifting bits `bit..` up by one
pub fn insert_gap(value: u64, bit: u32) -> u64 {
    let low = value & ((1u64 << bit) - 1);
    let high = value ^ low;
    (high << 1) | low
}

/// Remove position `bit`, shifting bits above it down by one
pub fn remove_bit(value: u64, bit: u32) -> u64 {
    let value = value & !(1u64 << bit);
    let low = value & ((1u64 << bit) - 1);
    let high = value ^ low;
    (high >> 1) | low
}

/// Mask of the lowest `bits` bits
pub fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
