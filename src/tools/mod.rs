//! File-level helpers around the library: image loading, raster output,
//! page file naming and the multi-page encode and decode drivers used by
//! the `optar` binary.

use crate::config::CalibrationConfig;
use crate::decoder::{CornerFailure, DecodedRun, decode_pages_with};
use crate::encoder::{Encoder, MAX_PAGES, PageSink};
use crate::error::{OptarError, Result};
use crate::models::{GrayRaster, PageConstants, PageFormat};
use crate::utils::gamma;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Image container used for rendered pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageImageFormat {
    /// Binary PGM (P5)
    #[default]
    Pgm,
    /// 8-bit grayscale PNG
    Png,
}

impl PageImageFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            PageImageFormat::Pgm => "pgm",
            PageImageFormat::Png => "png",
        }
    }
}

/// Load any image the `image` crate understands as 8-bit grayscale
pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<GrayRaster> {
    let luma = image::open(path)?.to_luma8();
    let (width, height) = luma.dimensions();
    GrayRaster::from_vec(width as usize, height as usize, luma.into_raw())
}

/// Write `raster` as a binary PGM
pub fn write_pgm<W: Write>(mut writer: W, raster: &GrayRaster) -> io::Result<()> {
    write!(writer, "P5\n{} {}\n255\n", raster.width(), raster.height())?;
    writer.write_all(raster.as_bytes())?;
    writer.flush()
}

/// Write `raster` to `path` as a binary PGM
pub fn save_pgm<P: AsRef<Path>>(path: P, raster: &GrayRaster) -> Result<()> {
    let file = File::create(path)?;
    write_pgm(BufWriter::new(file), raster)?;
    Ok(())
}

/// Write `raster` to `path` in `kind`
pub fn save_page<P: AsRef<Path>>(path: P, raster: &GrayRaster, kind: PageImageFormat) -> Result<()> {
    match kind {
        PageImageFormat::Pgm => save_pgm(path, raster),
        PageImageFormat::Png => {
            let image = image::GrayImage::from_raw(
                raster.width() as u32,
                raster.height() as u32,
                raster.as_bytes().to_vec(),
            )
            .ok_or(OptarError::RasterSize {
                width: raster.width(),
                height: raster.height(),
                len: raster.as_bytes().len(),
            })?;
            image.save(path)?;
            Ok(())
        }
    }
}

/// `<base>_<page:04>.<ext>`
pub fn page_path(base: &Path, page: u32, extension: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(format!("_{:04}.{}", page, extension));
    PathBuf::from(name)
}

/// Input path with its extension replaced by `_debug.pgm`
pub fn debug_path(input: &Path) -> PathBuf {
    let mut name = input.with_extension("").into_os_string();
    name.push("_debug.pgm");
    PathBuf::from(name)
}

/// Where a failed corner search dumps its image: next to the input
pub fn failure_debug_path(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("failure_debug.pgm")
}

/// Writes each finished page to `<base>_<nnnn>.<ext>`
#[derive(Debug)]
pub struct PageFileSink {
    base: PathBuf,
    kind: PageImageFormat,
    written: Vec<PathBuf>,
}

impl PageFileSink {
    /// Sink writing under `base`
    pub fn new<P: Into<PathBuf>>(base: P, kind: PageImageFormat) -> Self {
        Self {
            base: base.into(),
            kind,
            written: Vec::new(),
        }
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Consume the sink, returning the written files
    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

impl PageSink for PageFileSink {
    fn accept_page(&mut self, page_number: u32, page: GrayRaster) -> Result<()> {
        let path = page_path(&self.base, page_number, self.kind.extension());
        save_page(&path, &page, self.kind)?;
        info!(path = %path.display(), "wrote page");
        self.written.push(path);
        Ok(())
    }
}

/// Encode `payload` into page files under `base`. Returns the files in
/// page order.
pub fn encode_file(
    payload: &[u8],
    format: &PageFormat,
    identifier: &str,
    base: &Path,
    kind: PageImageFormat,
) -> Result<Vec<PathBuf>> {
    format.validate()?;
    let page_count = PageConstants::new(format).pages_for(payload.len() as u64);
    let page_count = u32::try_from(page_count)
        .ok()
        .filter(|&n| n <= MAX_PAGES)
        .ok_or(OptarError::TooManyPages)?;
    let mut encoder = Encoder::new(*format, identifier, page_count, PageFileSink::new(base, kind))?;
    encoder.feed(payload)?;
    Ok(encoder.finish()?.into_written())
}

/// Page scans `<base>_0001.png`, `<base>_0002.png`, ... up to the first
/// missing page. A `.pgm` is used where no `.png` exists.
pub fn find_pages(base: &Path) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();
    for page in 1u32.. {
        let found = ["png", "pgm"]
            .iter()
            .map(|ext| page_path(base, page, ext))
            .find(|path| path.is_file());
        match found {
            Some(path) => pages.push(path),
            None if page == 1 => {
                return Err(OptarError::NoInput {
                    path: page_path(base, 1, "png"),
                });
            }
            None => break,
        }
    }
    Ok(pages)
}

/// Decode every scan of `base`, writing a `_debug.pgm` next to each input
/// when `write_debug` is set
pub fn decode_files(
    base: &Path,
    format: &PageFormat,
    config: &CalibrationConfig,
    write_debug: bool,
) -> Result<DecodedRun> {
    let paths = find_pages(base)?;
    let scans = paths.iter().map(load_gray).collect::<Result<Vec<_>>>()?;
    info!(pages = scans.len(), "loaded scans");

    let on_failure = |index: usize, failure: &CornerFailure| {
        let mut image = failure.image.clone();
        gamma::compress(&mut image, config.input_gamma);
        let path = failure_debug_path(&paths[index]);
        match save_pgm(&path, &image) {
            Ok(()) => warn!(path = %path.display(), "{}, wrote failure image", failure.error),
            Err(err) => warn!(path = %path.display(), "cannot write failure image: {}", err),
        }
    };
    let run = decode_pages_with(scans, format, config, on_failure)?;

    if write_debug {
        for (path, page) in paths.iter().zip(&run.pages) {
            let debug_file = debug_path(path);
            save_pgm(&debug_file, &page.diagnostic)?;
            info!(path = %debug_file.display(), "wrote diagnostic image");
        }
    }
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BLACK, WHITE};

    #[test]
    fn test_pgm_header() {
        let mut raster = GrayRaster::new(3, 2, WHITE);
        raster.set(1, 1, BLACK);
        let mut out = Vec::new();
        write_pgm(&mut out, &raster).unwrap();
        assert_eq!(&out[..11], b"P5\n3 2\n255\n");
        assert_eq!(&out[11..], &[255, 255, 255, 255, 0, 255]);
    }

    #[test]
    fn test_page_naming() {
        let base = Path::new("out/backup");
        assert_eq!(page_path(base, 7, "pgm"), PathBuf::from("out/backup_0007.pgm"));
        assert_eq!(page_path(base, 1234, "png"), PathBuf::from("out/backup_1234.png"));
        assert_eq!(
            debug_path(Path::new("scans/doc_0002.png")),
            PathBuf::from("scans/doc_0002_debug.pgm")
        );
        assert_eq!(
            failure_debug_path(Path::new("scans/doc_0002.png")),
            PathBuf::from("scans/failure_debug.pgm")
        );
        assert_eq!(failure_debug_path(Path::new("doc_0001.pgm")), PathBuf::from("failure_debug.pgm"));
    }

    #[test]
    fn test_missing_first_page() {
        let base = std::env::temp_dir().join("rust_optar_no_such_scan");
        match find_pages(&base) {
            Err(OptarError::NoInput { path }) => assert!(path.ends_with("rust_optar_no_such_scan_0001.png")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
