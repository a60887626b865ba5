/// Extended Golay(24,12) codec.
///
/// Codewords are systematic: bits 23..12 carry the data, bits 11..1 the
/// remainder of `data * x^11` modulo the generator polynomial and bit 0 the
/// overall even parity. Minimum distance is 8, so up to three damaged bits
/// are corrected and four are detected.
use super::{BitDirection, BitFlip, SymbolStatus};

/// g(x) = x^11 + x^10 + x^6 + x^5 + x^4 + x^2 + 1
const GENERATOR: u32 = 0xc75;

/// Codeword for every 12-bit data value
pub static GOLAY_CODES: [u32; 4096] = build_table();

const fn encode_uncached(data: u32) -> u32 {
    let data = data & 0xfff;
    let mut remainder = data << 11;
    let mut bit = 22;
    while bit >= 11 {
        if remainder & (1 << bit) != 0 {
            remainder ^= GENERATOR << (bit - 11);
        }
        bit -= 1;
    }
    let word23 = (data << 11) | remainder;
    (word23 << 1) | (word23.count_ones() & 1)
}

const fn build_table() -> [u32; 4096] {
    let mut table = [0u32; 4096];
    let mut data = 0;
    while data < 4096 {
        table[data] = encode_uncached(data as u32);
        data += 1;
    }
    table
}

/// Encode the low 12 bits of `data`
pub fn encode(data: u32) -> u32 {
    GOLAY_CODES[(data & 0xfff) as usize]
}

/// Decode a received 24-bit word.
///
/// Damaged bits are reported through `report` with bit 0 being the MSB
/// (the first bit on the page). Candidates are scanned in ascending data
/// order and the first within distance 3 wins. Beyond that the raw data
/// bits are returned unchanged.
pub fn decode(received: u32, report: &mut dyn FnMut(BitFlip)) -> (u32, SymbolStatus) {
    let received = received & 0xff_ffff;
    let data = received >> 12;

    if GOLAY_CODES[data as usize] == received {
        return (data, SymbolStatus::Clean);
    }

    for (candidate, &code) in GOLAY_CODES.iter().enumerate() {
        let distance = (code ^ received).count_ones();
        if distance <= 3 {
            report_differences(code, received, report);
            return (candidate as u32, SymbolStatus::Corrected(distance));
        }
    }

    for bit in 0..24 {
        report(BitFlip {
            bit,
            direction: BitDirection::Unknown,
        });
    }
    (data, SymbolStatus::Irreparable)
}

fn report_differences(right: u32, wrong: u32, report: &mut dyn FnMut(BitFlip)) {
    for shift in (0..24).rev() {
        if (right ^ wrong) & (1 << shift) != 0 {
            let direction = if (wrong >> shift) & 1 == 1 {
                BitDirection::ZeroToOne
            } else {
                BitDirection::OneToZero
            };
            report(BitFlip {
                bit: 23 - shift,
                direction,
            });
        }
    }
}
