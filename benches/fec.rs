use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_optar::FecCodec;
use rust_optar::models::FecOrder;

fn bench_golay_encode(c: &mut Criterion) {
    let codec = FecCodec::new(FecOrder::Golay);
    c.bench_function("golay_encode_4096", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for data in 0..4096u32 {
                acc ^= codec.encode(black_box(data));
            }
            acc
        })
    });
}

fn bench_golay_decode_damaged(c: &mut Criterion) {
    let codec = FecCodec::new(FecOrder::Golay);
    // Three flipped bits per word, the most the code repairs
    let words: Vec<u32> = (0..1024u32)
        .map(|d| codec.encode(d) ^ (1 << (d % 24)) ^ (1 << ((d + 7) % 24)) ^ (1 << ((d + 15) % 24)))
        .collect();
    c.bench_function("golay_decode_3_errors_1024", |b| {
        b.iter(|| {
            let mut flips = 0u32;
            for &word in &words {
                let (data, _) = codec.decode(black_box(word), &mut |_| flips += 1);
                black_box(data);
            }
            flips
        })
    });
}

fn bench_hamming_roundtrip(c: &mut Criterion) {
    for order in [3u8, 5] {
        let codec = FecCodec::new(FecOrder::Hamming(order));
        let mask = (1u64 << codec.small_bits()) - 1;
        c.bench_function(&format!("hamming{}_roundtrip_1024", order), |b| {
            b.iter(|| {
                let mut acc = 0u32;
                for i in 0..1024u64 {
                    let data = ((i * 0x9e37_79b9) & mask) as u32;
                    let word = codec.encode(black_box(data)) ^ 1 << (i % codec.large_bits() as u64);
                    acc ^= codec.decode(word, &mut |_| {}).0;
                }
                acc
            })
        });
    }
}

criterion_group!(
    benches,
    bench_golay_encode,
    bench_golay_decode_damaged,
    bench_hamming_roundtrip
);
criterion_main!(benches);
