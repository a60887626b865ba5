/// Damaged-bit accounting for decoded pages
use crate::fec::{BitDirection, FecCodec, SymbolStatus};
use crate::models::{FecOrder, PageConstants};
use tracing::info;

/// Running error counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorStats {
    /// Bits flipped from 0 to 1 (black dirt)
    pub bad_01: u64,
    /// Bits flipped from 1 to 0 (white dirt)
    pub bad_10: u64,
    /// Repaired bits plus the weight of irreparable symbols
    pub bad_total: u64,
    /// Weight of irreparable symbols
    pub irreparable: u64,
    /// Golay symbols by number of damaged bits; the last bucket is 4 or more
    pub golay: [u64; 5],
    /// Channel bits examined
    pub used_bits: u64,
}

impl ErrorStats {
    /// Count one repaired bit. Bits of irreparable symbols are not counted
    /// here; [`record_symbol`](Self::record_symbol) charges them in bulk.
    pub fn record_flip(&mut self, direction: BitDirection) {
        match direction {
            BitDirection::ZeroToOne => {
                self.bad_01 += 1;
                self.bad_total += 1;
            }
            BitDirection::OneToZero => {
                self.bad_10 += 1;
                self.bad_total += 1;
            }
            BitDirection::Unknown => {}
        }
    }

    /// Count one decoded symbol
    pub fn record_symbol(&mut self, codec: &FecCodec, status: SymbolStatus) {
        if status == SymbolStatus::Irreparable {
            self.irreparable += codec.irreparable_weight();
            self.bad_total += codec.irreparable_weight();
        }
        if codec.order() == FecOrder::Golay {
            let bucket = match status {
                SymbolStatus::Clean => 0,
                SymbolStatus::Corrected(n) => (n as usize).min(3),
                SymbolStatus::Irreparable => 4,
            };
            self.golay[bucket] += 1;
        }
    }

    /// Golay symbols seen
    pub fn golay_total(&self) -> u64 {
        self.golay.iter().sum()
    }

    /// Damaged bits per examined bit
    pub fn bit_error_rate(&self) -> f64 {
        if self.used_bits == 0 {
            0.0
        } else {
            self.bad_total as f64 / self.used_bits as f64
        }
    }

    /// Add another page's counters
    pub fn merge(&mut self, other: &ErrorStats) {
        self.bad_01 += other.bad_01;
        self.bad_10 += other.bad_10;
        self.bad_total += other.bad_total;
        self.irreparable += other.irreparable;
        for (a, b) in self.golay.iter_mut().zip(other.golay) {
            *a += b;
        }
        self.used_bits += other.used_bits;
    }

    /// Log the summary for one page or a whole run
    pub fn log_summary(&self, constants: &PageConstants, label: &str) {
        if self.bad_total == 0 {
            info!(target: "optar::stats", "{}: no bad bits", label);
        } else {
            let total = self.bad_total as f64;
            info!(
                target: "optar::stats",
                "{}: {} bits bad from {}, bit error rate {:.4}%, {:.1}% black dirt, {:.1}% white dirt, {} ({:.1}%) irreparable",
                label,
                self.bad_total,
                self.used_bits,
                100.0 * self.bit_error_rate(),
                100.0 * self.bad_01 as f64 / total,
                100.0 * self.bad_10 as f64 / total,
                self.irreparable,
                100.0 * self.irreparable as f64 / total,
            );
        }
        if constants.format.fec == FecOrder::Golay {
            info!(
                target: "optar::stats",
                "{}: golay codewords by bad bits 0:{} 1:{} 2:{} 3:{} 4+:{} total:{}",
                label,
                self.golay[0],
                self.golay[1],
                self.golay[2],
                self.golay[3],
                self.golay[4],
                self.golay_total()
            );
        }
    }
}
