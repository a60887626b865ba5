/// Smoothing applied after cross sync and before bit sampling.
///
/// Min/max runs first: before the blur, narrow cracks and specks still
/// differ in size from wide shallow dips and can be told apart.
use crate::models::GrayRaster;
use tracing::debug;

/// One 2x2 dilation of white; shifts the image half a pixel right and down
fn max_pass(raster: &mut GrayRaster) {
    let width = raster.width();
    let data = raster.as_bytes_mut();
    if width == 0 {
        return;
    }
    for row in data.chunks_mut(width) {
        for x in (1..row.len()).rev() {
            row[x] = row[x].max(row[x - 1]);
        }
    }
    for i in (width..data.len()).rev() {
        data[i] = data[i].max(data[i - width]);
    }
}

/// One 2x2 erosion of white; shifts the image half a pixel left and up
fn min_pass(raster: &mut GrayRaster) {
    let width = raster.width();
    let data = raster.as_bytes_mut();
    if width == 0 {
        return;
    }
    for row in data.chunks_mut(width) {
        for x in 0..row.len().saturating_sub(1) {
            row[x] = row[x].min(row[x + 1]);
        }
    }
    for i in 0..data.len().saturating_sub(width) {
        data[i] = data[i].min(data[i + width]);
    }
}

/// Cycles of max then min for a given image-to-page pixel scale
pub fn minmax_cycles(hpixel: f64, vpixel: f64, minmax_filter: f64) -> usize {
    ((hpixel * vpixel).sqrt() * minmax_filter).floor().max(0.0) as usize
}

/// Close thin black scratches and open white specks
pub fn minmax(raster: &mut GrayRaster, cycles: usize) {
    if cycles > 0 {
        debug!(cycles, "min/max filter");
    }
    for _ in 0..cycles {
        max_pass(raster);
    }
    for _ in 0..cycles {
        min_pass(raster);
    }
}

/// Cycles of blur for a given image-to-page pixel scale
pub fn blur_cycles(hpixel: f64, vpixel: f64, pixel_blur: f64) -> usize {
    (hpixel * vpixel * pixel_blur * pixel_blur + 0.5).floor().max(0.0) as usize
}

/// Repeated 1-2-1 / 2-4-2 / 1-2-1 blur. The outermost rows and columns are
/// kept as they are.
pub fn blur(raster: &mut GrayRaster, cycles: usize) {
    let (width, height) = (raster.width(), raster.height());
    if cycles == 0 || width < 3 || height < 3 {
        return;
    }
    debug!(cycles, "1-2-1 blur");

    let mut scratch = raster.as_bytes().to_vec();
    for _ in 0..cycles {
        let src = raster.as_bytes();
        for y in 1..height - 1 {
            let up = (y - 1) * width;
            let mid = y * width;
            let down = (y + 1) * width;
            for x in 1..width - 1 {
                let mut val = (src[mid + x] as u32) << 2;
                val += (src[mid + x - 1] as u32
                    + src[mid + x + 1] as u32
                    + src[up + x] as u32
                    + src[down + x] as u32)
                    << 1;
                val += src[up + x - 1] as u32
                    + src[up + x + 1] as u32
                    + src[down + x - 1] as u32
                    + src[down + x + 1] as u32;
                scratch[mid + x] = ((val + 8) >> 4) as u8;
            }
        }
        raster.as_bytes_mut().copy_from_slice(&scratch);
    }
}
