/// Global threshold estimation from the image histogram
use crate::config::CalibrationConfig;
use crate::models::GrayRaster;
use tracing::{debug, warn};

/// Pixel value histogram
#[derive(Debug, Clone)]
pub struct Histogram {
    bins: [u64; 256],
    pixels: u64,
}

impl Histogram {
    /// Count every pixel of `raster`
    pub fn of(raster: &GrayRaster) -> Self {
        let mut bins = [0u64; 256];
        for &px in raster.as_bytes() {
            bins[px as usize] += 1;
        }
        Self {
            bins,
            pixels: raster.as_bytes().len() as u64,
        }
    }

    /// Count of pixels with value `level`
    pub fn count(&self, level: u8) -> u64 {
        self.bins[level as usize]
    }

    /// Rounded mean pixel value, 0 for an empty image
    pub fn average(&self) -> u8 {
        if self.pixels == 0 {
            return 0;
        }
        let total: u64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(level, &count)| level as u64 * count)
            .sum();
        ((total + self.pixels / 2) / self.pixels) as u8
    }
}

/// Global thresholds of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutlevels {
    /// Threshold for positioning (corners, crosses); biased towards black
    pub global: u8,
    /// Threshold halfway between black and white, used for border filling
    pub fill: u8,
    /// Rounds spent before the estimate settled
    pub iterations: usize,
    /// False if the estimate was still moving when the round limit hit
    pub converged: bool,
}

/// Iteratively split the histogram into a black and a white class.
///
/// Starting at the average, each round takes the RMS distance of both
/// classes from the current level as black and white levels and places
/// the new level between them at `sync_white_cut`. Stops once the level
/// repeats.
pub fn analyze_cutlevel(histogram: &Histogram, config: &CalibrationConfig) -> Cutlevels {
    let mut global = histogram.average();
    let mut fill = global;

    let max_rounds = config.max_cutlevel_iterations.max(1);
    for round in 0..max_rounds {
        let last = global;
        let level = global as f64;

        let (mut black_sq, mut black_pixels) = (0.0f64, 0u64);
        let (mut white_sq, mut white_pixels) = (0.0f64, 0u64);
        for value in 0..256usize {
            let count = histogram.bins[value];
            let distance = value as f64 - level;
            if (value as u8) < global {
                black_sq += count as f64 * distance * distance;
                black_pixels += count;
            } else if (value as u8) > global {
                white_sq += count as f64 * distance * distance;
                white_pixels += count;
            }
        }

        let white_rms = rms(white_sq, white_pixels);
        let black_rms = rms(black_sq, black_pixels);
        let white = level + white_rms;
        let black = level - black_rms;

        let cut = config.sync_white_cut;
        global = to_level(white * cut + black * (1.0 - cut));
        fill = to_level(white * 0.5 + black * 0.5);
        debug!(
            black,
            white,
            cutlevel = global,
            fill_cutlevel = fill,
            "cutlevel round"
        );

        if global == last {
            return Cutlevels {
                global,
                fill,
                iterations: round + 1,
                converged: true,
            };
        }
    }

    warn!(
        rounds = max_rounds,
        "cutting point analysis did not converge"
    );
    Cutlevels {
        global,
        fill,
        iterations: max_rounds,
        converged: false,
    }
}

fn rms(square_sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        (square_sum / count as f64).sqrt()
    }
}

fn to_level(value: f64) -> u8 {
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}
