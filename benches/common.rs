use rust_optar::models::{FecOrder, PageFormat};

/// Reduced page that still has every layout feature
pub fn bench_format(fec: FecOrder) -> PageFormat {
    PageFormat {
        xcrosses: 9,
        ycrosses: 8,
        fec,
        text_height: 12,
        ..PageFormat::default()
    }
}

/// Deterministic, non-repeating payload
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 131 + 17) as u8 ^ (i >> 8) as u8).collect()
}
