/// Gamma lookup tables between scanner values and photon counts
use crate::models::GrayRaster;
use rayon::prelude::*;

/// Table mapping `i` to `255 * (i / 255)^gamma`, rounded to nearest.
/// White stays at 255 and black at 0 for any gamma.
pub fn gamma_table(gamma: f64) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let value = 255.0 * (i as f64 / 255.0).powf(gamma);
        *entry = (value + 0.5).floor().clamp(0.0, 255.0) as u8;
    }
    table
}

fn apply_table(raster: &mut GrayRaster, table: &[u8; 256]) {
    let width = raster.width().max(1);
    raster
        .as_bytes_mut()
        .par_chunks_mut(width)
        .for_each(|row| {
            for px in row.iter_mut() {
                *px = table[*px as usize];
            }
        });
}

/// Convert gamma-compressed input (value = photons^gamma) to linear
pub fn linearize(raster: &mut GrayRaster, input_gamma: f64) {
    apply_table(raster, &gamma_table(1.0 / input_gamma));
}

/// Convert linear values back to gamma-compressed output
pub fn compress(raster: &mut GrayRaster, output_gamma: f64) {
    apply_table(raster, &gamma_table(output_gamma));
}
