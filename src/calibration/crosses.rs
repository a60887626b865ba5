/// Per-cross resynchronization.
///
/// Every cross is seeded from its left neighbour (or the one above for the
/// first column), moved to the best coarse match in a prefix-summed search
/// window, then refined by a sub-pixel correlation search. Each cross also
/// gets its own quantization cutlevel from the pixels around its centre.
use super::corners::{Corners, PageScale};
use crate::config::CalibrationConfig;
use crate::models::{GrayRaster, PageConstants, Point};
use crate::utils::geometry::{bilinear, sample_bilinear};
use tracing::debug;

/// Calibrated centres and cutlevels of all crosses.
/// Centres are in image pixels with integers on pixel corners.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossGrid {
    xcrosses: usize,
    ycrosses: usize,
    centers: Vec<Point>,
    cutlevels: Vec<f64>,
}

impl CrossGrid {
    /// Crosses per row
    pub fn xcrosses(&self) -> usize {
        self.xcrosses
    }

    /// Crosses per column
    pub fn ycrosses(&self) -> usize {
        self.ycrosses
    }

    /// Centre of cross (cx, cy)
    pub fn center(&self, cx: usize, cy: usize) -> Point {
        self.centers[cy * self.xcrosses + cx]
    }

    /// Local cutlevel of cross (cx, cy)
    pub fn cutlevel(&self, cx: usize, cy: usize) -> f64 {
        self.cutlevels[cy * self.xcrosses + cx]
    }

    /// All centres in row-major order
    pub fn centers(&self) -> &[Point] {
        &self.centers
    }
}

/// Cross search over one linearized, dirt-free image
pub struct CrossSearch<'a> {
    raster: &'a GrayRaster,
    cutlevel: f64,
    scale: &'a PageScale,
    config: &'a CalibrationConfig,
    chalf: f64,
}

impl<'a> CrossSearch<'a> {
    /// Search `raster` thresholded at the global `cutlevel`
    pub fn new(
        raster: &'a GrayRaster,
        cutlevel: u8,
        scale: &'a PageScale,
        constants: &PageConstants,
        config: &'a CalibrationConfig,
    ) -> Self {
        Self {
            raster,
            cutlevel: cutlevel as f64,
            scale,
            config,
            chalf: constants.format.chalf as f64,
        }
    }

    /// Signed distance from the global cutlevel; integers in pixel centres
    fn diffpix(&self, p: Point) -> f64 {
        sample_bilinear(self.raster, p.x, p.y) - self.cutlevel
    }

    /// Integrated (4c+1)² window around `center`; row and column 0 are
    /// zero so that any box sum is four lookups
    fn load_search_area(&self, center: Point) -> SearchArea {
        let c = self.scale.search_half;
        let side = (4 * c + 1) as usize;
        let mut values = vec![0.0f64; side * side];
        for (row, yoff) in (-2 * c - 1..2 * c).enumerate() {
            for (col, xoff) in (-2 * c - 1..2 * c).enumerate() {
                if row == 0 || col == 0 {
                    continue;
                }
                let p = self.scale.axes.shift(center, xoff as f64, yoff as f64);
                values[row * side + col] = self.diffpix(p);
            }
        }

        for row in 0..side {
            for col in 1..side {
                values[row * side + col] += values[row * side + col - 1];
            }
        }
        for idx in side..side * side {
            values[idx] += values[idx - side];
        }

        SearchArea {
            values,
            side,
            half: c,
        }
    }

    /// Checkerboard correlation at a sub-pixel centre, integers in corners
    fn cross_correl(&self, center: Point) -> f64 {
        let (x, y) = (center.x, center.y);
        let mut sum = 0.0;
        for dx in 0..self.scale.fine_half {
            let dx = dx as f64;
            for dy in 0..self.scale.fine_half {
                let dy = dy as f64;
                sum -= self.diffpix(Point::new(x + dx, y + dy));
                sum -= self.diffpix(Point::new(x - 1.0 - dx, y - 1.0 - dy));
                sum += self.diffpix(Point::new(x + dx, y - 1.0 - dy));
                sum += self.diffpix(Point::new(x - 1.0 - dx, y + dy));
            }
        }
        sum
    }

    /// Move `seed` onto the nearest cross. Ties keep the first maximum.
    pub fn resync(&self, seed: Point) -> Point {
        let area = self.load_search_area(seed);
        let c = self.scale.search_half;

        let (mut best_x, mut best_y) = (0i64, 0i64);
        let mut max = area.score(0, 0);
        for xoff in -c..=c {
            for yoff in -c..=c {
                let score = area.score(xoff, yoff);
                if score > max {
                    max = score;
                    best_x = xoff;
                    best_y = yoff;
                }
            }
        }
        let coarse = self.scale.axes.shift(seed, best_x as f64, best_y as f64);

        let Some(step) = self.config.fine_step else {
            return coarse;
        };
        // Half an image pixel either way; beyond that the coarse grid wins
        let range = (0.5 / step).floor() as i64;
        let (mut best_x, mut best_y) = (0i64, 0i64);
        let mut max = self.cross_correl(coarse);
        for xoff in -range..=range {
            for yoff in -range..=range {
                let p = self
                    .scale
                    .axes
                    .shift(coarse, xoff as f64 * step, yoff as f64 * step);
                let score = self.cross_correl(p);
                if score > max {
                    max = score;
                    best_x = xoff;
                    best_y = yoff;
                }
            }
        }
        self.scale
            .axes
            .shift(coarse, best_x as f64 * step, best_y as f64 * step)
    }

    /// Quantization cutlevel from the black and white RMS spread of the
    /// pixels around a cross centre. Falls back to the global cutlevel when
    /// either class is empty.
    pub fn cross_cutlevel(&self, center: Point) -> f64 {
        let trimmed = self.chalf - self.config.cross_trim;
        let h_half = (self.scale.hpixel * trimmed).floor() as i64;
        let v_half = (self.scale.vpixel * trimmed).floor() as i64;
        let global = self.cutlevel;

        let (mut white_sq, mut white_pixels) = (0.0f64, 0u64);
        let (mut black_sq, mut black_pixels) = (0.0f64, 0u64);
        for xoff in -h_half..=h_half {
            for yoff in -v_half..=v_half {
                let p = self.scale.axes.shift(center, xoff as f64, yoff as f64);
                let value = sample_bilinear(self.raster, p.x, p.y).trunc();
                let distance = value - global;
                if value > global {
                    white_sq += distance * distance;
                    white_pixels += 1;
                } else if value < global {
                    black_sq += distance * distance;
                    black_pixels += 1;
                }
            }
        }

        if white_pixels == 0 || black_pixels == 0 {
            return global;
        }
        let white = global + (white_sq / white_pixels as f64).sqrt();
        let black = global - (black_sq / black_pixels as f64).sqrt();
        white * self.config.white_cut + black * (1.0 - self.config.white_cut)
    }

    /// Locate every cross, row by row
    pub fn sync(&self, corners: &Corners, constants: &PageConstants) -> CrossGrid {
        let format = &constants.format;
        let xcrosses = format.xcrosses as usize;
        let ycrosses = format.ycrosses as usize;
        let width = constants.width as f64;
        let height = constants.height as f64;
        let cpitch = format.cpitch as f64;

        let h_span = corners.horizontal_span();
        let v_span = corners.vertical_span();
        let right = Point::new(h_span.x * cpitch / width, h_span.y * cpitch / width);
        let down = Point::new(v_span.x * cpitch / height, v_span.y * cpitch / height);

        let [ul, ur, ll, lr] = corners.points;
        let inset = (format.border + format.chalf) as f64;
        let first = Point::new(
            bilinear(ul.x, ur.x, ll.x, lr.x, inset / width, inset / height),
            bilinear(ul.y, ur.y, ll.y, lr.y, inset / width, inset / height),
        );

        let mut centers = Vec::with_capacity(xcrosses * ycrosses);
        let mut cutlevels = Vec::with_capacity(xcrosses * ycrosses);
        for cy in 0..ycrosses {
            let mut row_levels = String::new();
            for cx in 0..xcrosses {
                let seed = if cx > 0 {
                    centers[cy * xcrosses + cx - 1]
                } else if cy > 0 {
                    centers[(cy - 1) * xcrosses]
                } else {
                    first
                };
                let step = if cx > 0 {
                    right
                } else if cy > 0 {
                    down
                } else {
                    Point::default()
                };
                let center = self.resync(seed.translate(step.x, step.y));
                let level = self.cross_cutlevel(center);
                row_levels.push_str(&format!("{:02x} ", (level + 0.5).floor() as i64));
                centers.push(center);
                cutlevels.push(level);
            }
            debug!(row = cy, cutlevels = %row_levels.trim_end(), "crosses synced");
        }

        CrossGrid {
            xcrosses,
            ycrosses,
            centers,
            cutlevels,
        }
    }
}

/// Prefix-summed search window
struct SearchArea {
    values: Vec<f64>,
    side: usize,
    half: i64,
}

impl SearchArea {
    fn at(&self, x: i64, y: i64) -> f64 {
        self.values[y as usize * self.side + x as usize]
    }

    /// Correlation of a cross centred `xpos`, `ypos` steps from the window
    /// centre, both within ±half
    fn score(&self, xpos: i64, ypos: i64) -> f64 {
        let c = self.half;
        let x = xpos + 2 * c;
        let y = ypos + 2 * c;
        let mut sum = -4.0 * self.at(x, y);
        sum += 2.0 * (self.at(x - c, y) + self.at(x + c, y) + self.at(x, y - c) + self.at(x, y + c));
        sum -= self.at(x - c, y - c)
            + self.at(x - c, y + c)
            + self.at(x + c, y - c)
            + self.at(x + c, y + c);
        sum
    }
}
