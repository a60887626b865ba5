/// Extended Hamming codec of order 2..=5.
///
/// Register layout (LSB = bit 0): bit 0 holds overall parity, bits 1, 2,
/// 4, 8, 16 hold the positional parity bits (as many as the order
/// needs) and the payload fills the remaining positions from bit 3 up.
use super::bits::{PARITY_MASKS, insert_gap, low_mask, parity, remove_bit};
use super::{BitDirection, BitFlip, SymbolStatus};

/// Data positions at which a gap is opened for parity bit `1 << k`
const GAP_POSITIONS: [u32; 3] = [4, 8, 16];

fn large_bits(order: u8) -> u32 {
    1 << order
}

fn small_bits(order: u8) -> u32 {
    large_bits(order) - 1 - order as u32
}

/// Encode the low `2^order - 1 - order` bits of `data`
pub fn encode(data: u32, order: u8) -> u32 {
    let mut register = (data as u64 & low_mask(small_bits(order))) << 3;

    // Gaps for parity bits 4, 8, 16 as the order requires
    for (k, &gap) in GAP_POSITIONS.iter().enumerate() {
        if order as usize >= k + 3 {
            register = insert_gap(register, gap);
        }
    }

    for k in (0..order as usize).rev() {
        register |= parity(register & PARITY_MASKS[k]) << (1u32 << k);
    }
    register |= parity(register);

    register as u32
}

/// Decode a received register of `2^order` bits.
///
/// A nonzero syndrome names the damaged position, which is flipped back.
/// If overall parity is still wrong afterwards two bits were hit and the
/// symbol is irreparable; a wrong overall parity with a zero syndrome means
/// only the parity bit itself flipped. Damaged bits are reported with bit 0
/// being the MSB of the register (the first bit on the page).
pub fn decode(received: u32, order: u8, report: &mut dyn FnMut(BitFlip)) -> (u32, SymbolStatus) {
    let large = large_bits(order);
    let mut register = received as u64 & low_mask(large);

    let mut syndrome = 0u32;
    for k in 0..order as usize {
        syndrome |= (parity(register & PARITY_MASKS[k]) as u32) << k;
    }
    if syndrome != 0 {
        register ^= 1u64 << syndrome;
    }

    let status = if parity(register) != 0 {
        if syndrome != 0 {
            for bit in 0..large {
                report(BitFlip {
                    bit,
                    direction: BitDirection::Unknown,
                });
            }
            SymbolStatus::Irreparable
        } else {
            let direction = if register & 1 == 1 {
                BitDirection::ZeroToOne
            } else {
                BitDirection::OneToZero
            };
            report(BitFlip {
                bit: large - 1,
                direction,
            });
            SymbolStatus::Corrected(1)
        }
    } else if syndrome != 0 {
        // Corrected bit now holds its true value; it arrived inverted
        let direction = if register & (1u64 << syndrome) == 0 {
            BitDirection::ZeroToOne
        } else {
            BitDirection::OneToZero
        };
        report(BitFlip {
            bit: large - 1 - syndrome,
            direction,
        });
        SymbolStatus::Corrected(1)
    } else {
        SymbolStatus::Clean
    };

    for (k, &gap) in GAP_POSITIONS.iter().enumerate().rev() {
        if order as usize >= k + 3 {
            register = remove_bit(register, gap);
        }
    }

    ((register >> 3) as u32, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(order: u8) -> Vec<u32> {
        let small = small_bits(order);
        if small <= 12 {
            (0..1u32 << small).collect()
        } else {
            let mask = low_mask(small) as u32;
            (0..5000u32)
                .map(|i| i.wrapping_mul(0x9e37_79b9) & mask)
                .chain([0, mask])
                .collect()
        }
    }

    #[test]
    fn test_order2_is_repetition() {
        assert_eq!(encode(0, 2), 0b0000);
        assert_eq!(encode(1, 2), 0b1111);
    }

    #[test]
    fn test_codeword_fits_register() {
        for order in 2..=5u8 {
            let large = large_bits(order);
            for v in values(order) {
                let code = encode(v, order) as u64;
                assert_eq!(code & !low_mask(large), 0, "order {} value {}", order, v);
                assert_eq!(parity(code), 0);
            }
        }
    }

    #[test]
    fn test_roundtrip_clean() {
        for order in 2..=5u8 {
            for v in values(order) {
                let mut reports = 0;
                let (value, status) = decode(encode(v, order), order, &mut |_| reports += 1);
                assert_eq!(value, v, "order {}", order);
                assert_eq!(status, SymbolStatus::Clean);
                assert_eq!(reports, 0);
            }
        }
    }

    #[test]
    fn test_single_flip_corrected() {
        for order in 2..=5u8 {
            let large = large_bits(order);
            for v in values(order).into_iter().take(200) {
                let code = encode(v, order);
                for position in 0..large {
                    let mut flips = Vec::new();
                    let (value, status) =
                        decode(code ^ (1 << position), order, &mut |f| flips.push(f));
                    assert_eq!(value, v, "order {} position {}", order, position);
                    assert_eq!(status, SymbolStatus::Corrected(1));
                    assert_eq!(flips.len(), 1);
                    assert_eq!(flips[0].bit, large - 1 - position);
                    let expected = if (code >> position) & 1 == 0 {
                        BitDirection::ZeroToOne
                    } else {
                        BitDirection::OneToZero
                    };
                    assert_eq!(flips[0].direction, expected);
                }
            }
        }
    }

    #[test]
    fn test_double_flip_detected() {
        let order = 4;
        let code = encode(0x5a5, order);
        let mut flips = Vec::new();
        let (_, status) = decode(code ^ 0b1000_0100, order, &mut |f| flips.push(f));
        assert_eq!(status, SymbolStatus::Irreparable);
        assert_eq!(flips.len(), 16);
        assert!(flips.iter().all(|f| f.direction == BitDirection::Unknown));
    }
}
