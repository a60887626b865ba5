//! End-to-end tests: payload to rendered pages and back.
//!
//! Pages are rendered at their exact size, enlarged by whole factors or
//! resampled through a small rotation the way a scanner would see them;
//! damage is injected by inverting the pixels that carry chosen symbol bits.

use rust_optar::decoder::page::{self, BadBit, PageContext};
use rust_optar::fec::BitDirection;
use rust_optar::models::{FecOrder, GrayRaster, PageConstants, PageFormat};
use rust_optar::tools::{self, PageImageFormat};
use rust_optar::utils::gamma::gamma_table;
use rust_optar::{BitChannel, CalibrationConfig, OptarError, decode_pages, encode_pages};
use std::path::PathBuf;

fn small_format(fec: FecOrder) -> PageFormat {
    PageFormat {
        xcrosses: 9,
        ycrosses: 8,
        cpitch: 24,
        chalf: 3,
        fec,
        border: 2,
        text_height: 12,
    }
}

fn sample_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 131 + 17) as u8 ^ (i >> 8) as u8).collect()
}

/// Nearest neighbour enlargement by a whole factor
fn enlarge(page: &GrayRaster, factor: usize) -> GrayRaster {
    let (w, h) = (page.width() * factor, page.height() * factor);
    let mut out = GrayRaster::new(w, h, 0);
    for y in 0..h {
        for x in 0..w {
            out.set(x, y, page.get(x / factor, y / factor));
        }
    }
    out
}

/// Scale `page` by `factor`, rotate it by `degrees` about its centre and
/// pad it with `margin` white pixels. Every output pixel averages 3x3
/// subsamples in linear light and is stored gamma-compressed.
fn warp(page: &GrayRaster, factor: f64, degrees: f64, margin: usize) -> GrayRaster {
    let (pw, ph) = (page.width() as f64, page.height() as f64);
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sw, sh) = (pw * factor, ph * factor);
    let width = (sw * cos.abs() + sh * sin.abs()).ceil() as usize + 2 * margin;
    let height = (sw * sin.abs() + sh * cos.abs()).ceil() as usize + 2 * margin;
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let compress = gamma_table(0.454545);

    let mut out = GrayRaster::new(width, height, 255);
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0u32;
            for sy in 0..3 {
                for sx in 0..3 {
                    let dx = x as f64 + (sx as f64 + 0.5) / 3.0 - cx;
                    let dy = y as f64 + (sy as f64 + 0.5) / 3.0 - cy;
                    let u = (dx * cos + dy * sin) / factor + pw / 2.0;
                    let v = (dy * cos - dx * sin) / factor + ph / 2.0;
                    sum += if u < 0.0 || v < 0.0 {
                        255
                    } else {
                        page.get(u as usize, v as usize) as u32
                    };
                }
            }
            out.set(x, y, compress[((sum + 4) / 9) as usize]);
        }
    }
    out
}

/// Invert the pixel carrying bit `bit` of symbol `symbol`; returns its
/// page coordinates
fn damage(page: &mut GrayRaster, constants: &PageConstants, symbol: u64, bit: u32) -> (i64, i64) {
    let channel = BitChannel::new(constants);
    let (x, y) = channel.symbol_pixel(symbol, bit);
    let border = constants.format.border as u64;
    let (px, py) = ((x + border) as usize, (y + border) as usize);
    page.set(px, py, page.get(px, py) ^ 0xff);
    (px as i64, py as i64)
}

fn assert_payload(decoded: &[u8], payload: &[u8]) {
    assert!(decoded.len() >= payload.len(), "decoded {} bytes", decoded.len());
    assert_eq!(&decoded[..payload.len()], payload);
    assert!(
        decoded[payload.len()..].iter().all(|&b| b == 0),
        "padding after the payload is not zero"
    );
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rust_optar_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_golay_roundtrip() {
    let format = small_format(FecOrder::Golay);
    let payload = sample_payload(1500);
    let pages = encode_pages(&payload, &format, "golay").unwrap();
    assert_eq!(pages.len(), 1);

    let run = decode_pages(pages, &format, &CalibrationConfig::default()).unwrap();
    assert_payload(&run.payload, &payload);
    assert_eq!(run.stats.bad_total, 0);
    assert_eq!(run.stats.golay[0], PageConstants::new(&format).fec_syms);
}

#[test]
fn test_hamming_roundtrip_every_order() {
    for order in 2..=5u8 {
        let format = small_format(FecOrder::Hamming(order));
        let constants = PageConstants::new(&format);
        let payload = sample_payload((constants.net_bits / 8) as usize / 2);
        let pages = encode_pages(&payload, &format, "hamming").unwrap();

        let run = decode_pages(pages, &format, &CalibrationConfig::default()).unwrap();
        assert_payload(&run.payload, &payload);
        assert_eq!(run.stats.bad_total, 0, "order {}", order);
        assert_eq!(run.stats.golay_total(), 0);
    }
}

#[test]
fn test_multi_page_stream() {
    let format = small_format(FecOrder::Golay);
    let constants = PageConstants::new(&format);
    let per_page = (constants.net_bits / 8) as usize;
    let payload = sample_payload(per_page * 2 + 300);
    let pages = encode_pages(&payload, &format, "multi").unwrap();
    assert_eq!(pages.len() as u64, constants.pages_for(payload.len() as u64));
    assert_eq!(pages.len(), 3);

    let run = decode_pages(pages, &format, &CalibrationConfig::default()).unwrap();
    assert_eq!(run.pages.len(), 3);
    assert_payload(&run.payload, &payload);
    assert_eq!(run.stats.used_bits, 3 * constants.used_bits);
}

#[test]
fn test_empty_payload_still_one_page() {
    let format = small_format(FecOrder::Hamming(3));
    let pages = encode_pages(&[], &format, "").unwrap();
    assert_eq!(pages.len(), 1);

    let run = decode_pages(pages, &format, &CalibrationConfig::default()).unwrap();
    assert!(run.payload.iter().all(|&b| b == 0));
    assert_eq!(run.stats.bad_total, 0);
}

#[test]
fn test_enlarged_scan() {
    let format = small_format(FecOrder::Golay);
    let payload = sample_payload(900);
    let pages = encode_pages(&payload, &format, "enlarged").unwrap();
    let scans: Vec<GrayRaster> = pages.iter().map(|p| enlarge(p, 2)).collect();

    let run = decode_pages(scans, &format, &CalibrationConfig::default()).unwrap();
    assert_payload(&run.payload, &payload);
    assert_eq!(run.stats.bad_total, 0);
    assert_eq!(run.pages[0].diagnostic.width(), 2 * PageConstants::new(&format).width as usize);
}

#[test]
fn test_default_format_one_byte() {
    let format = PageFormat::default();
    let pages = encode_pages(&[0xA5], &format, "").unwrap();
    assert_eq!(pages.len(), 1);

    let run = decode_pages(pages, &format, &CalibrationConfig::default()).unwrap();
    assert_eq!(run.pages[0].symbols[0], 0xA50);
    assert_eq!(&run.payload[..4], &[0xA5, 0, 0, 0]);
    assert_payload(&run.payload, &[0xA5]);
    assert_eq!(run.stats.bad_total, 0);
}

#[test]
fn test_rotated_scan() {
    let format = small_format(FecOrder::Golay);
    let payload = sample_payload(1500);
    let page = encode_pages(&payload, &format, "rotated").unwrap().remove(0);

    for (factor, degrees) in [(2.6, 0.5), (3.0, -0.4)] {
        let scan = warp(&page, factor, degrees, 20);
        let run = decode_pages(vec![scan], &format, &CalibrationConfig::default()).unwrap();
        assert_payload(&run.payload, &payload);
    }
}

#[test]
fn test_margin_specks_erased() {
    let format = small_format(FecOrder::Golay);
    let constants = PageConstants::new(&format);
    let config = CalibrationConfig::default();
    let payload = sample_payload(1200);
    let page = encode_pages(&payload, &format, "specks").unwrap().remove(0);

    let mut scan = warp(&page, 3.0, 0.2, 20);
    let (w, h) = (scan.width(), scan.height());
    scan.fill_rect(5, 5, 6, 6, 0);
    scan.fill_rect(w - 11, h - 11, 6, 6, 0);

    let ctx = PageContext {
        constants: &constants,
        config: &config,
    };
    let thresholded = page::RawPage::new(scan.clone(), ctx).threshold();
    assert!(thresholded.dirt_pixels() >= 72, "erased {}", thresholded.dirt_pixels());

    let run = decode_pages(vec![scan], &format, &config).unwrap();
    assert_payload(&run.payload, &payload);
}

#[test]
fn test_two_bad_bits_corrected() {
    let format = small_format(FecOrder::Golay);
    let constants = PageConstants::new(&format);
    let config = CalibrationConfig::default();
    let payload = sample_payload(1200);
    let mut scan = encode_pages(&payload, &format, "dirty").unwrap().remove(0);

    let first = damage(&mut scan, &constants, 10, 3);
    let second = damage(&mut scan, &constants, 10, 17);

    let ctx = PageContext {
        constants: &constants,
        config: &config,
    };
    let mut reports: Vec<BadBit> = Vec::new();
    let decoded = page::decode_page(scan, ctx, "dirty", &mut |bad| reports.push(*bad)).unwrap();

    assert_eq!(decoded.stats.golay[2], 1);
    assert_eq!(decoded.stats.bad_total, 2);
    assert_eq!(decoded.stats.bad_01 + decoded.stats.bad_10, 2);
    assert_eq!(decoded.stats.irreparable, 0);

    assert_eq!(reports.len(), 2);
    let mut located: Vec<(i64, i64)> = reports.iter().map(|b| (b.x, b.y)).collect();
    located.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(located, expected);
    assert!(reports.iter().all(|b| b.symbol == 10));
    assert!(reports.iter().all(|b| b.direction != BitDirection::Unknown));

    let mut assembler = rust_optar::decoder::ByteAssembler::new();
    assembler.push_symbols(&decoded.symbols, format.fec);
    assert_payload(&assembler.into_bytes(), &payload);
}

#[test]
fn test_four_bad_bits_irreparable() {
    let format = small_format(FecOrder::Golay);
    let constants = PageConstants::new(&format);
    let payload = sample_payload(1200);
    let mut scan = encode_pages(&payload, &format, "ruined").unwrap().remove(0);
    for bit in [0, 6, 13, 22] {
        damage(&mut scan, &constants, 42, bit);
    }

    let run = decode_pages(vec![scan], &format, &CalibrationConfig::default()).unwrap();
    assert_eq!(run.stats.golay[4], 1);
    assert_eq!(run.stats.irreparable, 4);
    assert_eq!(run.stats.bad_total, 4);
    assert_eq!(run.stats.golay_total(), constants.fec_syms);
}

#[test]
fn test_blank_scan_has_no_corners() {
    let format = small_format(FecOrder::Golay);
    let blank = GrayRaster::new(120, 120, 255);
    match decode_pages(vec![blank], &format, &CalibrationConfig::default()) {
        Err(OptarError::CornerNotFound { .. }) => {}
        other => panic!("unexpected {:?}", other.map(|run| run.payload.len())),
    }
}

#[test]
fn test_page_files_roundtrip() {
    let dir = scratch_dir("files");
    let base = dir.join("archive");
    let format = small_format(FecOrder::Hamming(4));
    let constants = PageConstants::new(&format);
    let payload = sample_payload((constants.net_bits / 8) as usize + 50);

    let written = tools::encode_file(&payload, &format, "archive", &base, PageImageFormat::Pgm).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[1], dir.join("archive_0002.pgm"));
    let header = std::fs::read(&written[0]).unwrap();
    let expected = format!("P5\n{} {}\n255\n", constants.width, constants.height);
    assert!(header.starts_with(expected.as_bytes()));

    let run = tools::decode_files(&base, &format, &CalibrationConfig::default(), true).unwrap();
    assert_payload(&run.payload, &payload);
    assert!(dir.join("archive_0001_debug.pgm").is_file());
    assert!(dir.join("archive_0002_debug.pgm").is_file());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_png_pages_preferred() {
    let dir = scratch_dir("png");
    let base = dir.join("scan");
    let format = small_format(FecOrder::Golay);
    let payload = sample_payload(64);

    tools::encode_file(&payload, &format, "png", &base, PageImageFormat::Png).unwrap();
    let pages = tools::find_pages(&base).unwrap();
    assert_eq!(pages, vec![dir.join("scan_0001.png")]);

    let run = tools::decode_files(&base, &format, &CalibrationConfig::default(), false).unwrap();
    assert_payload(&run.payload, &payload);
    assert!(!dir.join("scan_0001_debug.pgm").exists());

    std::fs::remove_dir_all(&dir).ok();
}
