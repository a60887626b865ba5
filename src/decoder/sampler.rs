/// Mapping of ideal page pixels onto the scan and bit sampling
use crate::calibration::{CrossGrid, PageScale};
use crate::config::CalibrationConfig;
use crate::models::{GrayRaster, PageFormat, Point};
use crate::utils::geometry::{bilinear, sample_bilinear};

/// Where a data pixel landed on the scan and which cutlevel applies there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitSite {
    /// Image position, integers in pixel centres
    pub position: Point,
    /// Interpolated local cutlevel
    pub cutlevel: f64,
}

/// Samples data pixels through the calibrated cross grid
pub struct BitSampler<'a> {
    format: &'a PageFormat,
    grid: &'a CrossGrid,
    scale: &'a PageScale,
    config: &'a CalibrationConfig,
}

impl<'a> BitSampler<'a> {
    /// Create a sampler for one page
    pub fn new(
        format: &'a PageFormat,
        grid: &'a CrossGrid,
        scale: &'a PageScale,
        config: &'a CalibrationConfig,
    ) -> Self {
        Self {
            format,
            grid,
            scale,
            config,
        }
    }

    /// Locate data pixel (x, y), (0, 0) being the upper left pixel of the
    /// upper left cross, by bilinear interpolation between the four
    /// crosses around it. Pixels past the last cross extrapolate from the
    /// last cell.
    pub fn bit_site(&self, x: u64, y: u64) -> BitSite {
        let chalf = self.format.chalf as i64;
        let cpitch = self.format.cpitch as i64;
        let (x, y) = (x as i64, y as i64);

        let cell = |v: i64, crosses: u32| -> i64 {
            let c = if v < chalf { 0 } else { (v - chalf) / cpitch };
            c.min(crosses as i64 - 2).max(0)
        };
        let cx = cell(x, self.format.xcrosses);
        let cy = cell(y, self.format.ycrosses);

        let xrem = ((x - cx * cpitch - chalf) as f64 + 0.5) / cpitch as f64;
        let yrem = ((y - cy * cpitch - chalf) as f64 + 0.5) / cpitch as f64;

        let (cx, cy) = (cx as usize, cy as usize);
        let ul = self.grid.center(cx, cy);
        let ur = self.grid.center(cx + 1, cy);
        let ll = self.grid.center(cx, cy + 1);
        let lr = self.grid.center(cx + 1, cy + 1);

        let px = bilinear(ul.x, ur.x, ll.x, lr.x, xrem, yrem);
        let py = bilinear(ul.y, ur.y, ll.y, lr.y, xrem, yrem);
        let cutlevel = bilinear(
            self.grid.cutlevel(cx, cy),
            self.grid.cutlevel(cx + 1, cy),
            self.grid.cutlevel(cx, cy + 1),
            self.grid.cutlevel(cx + 1, cy + 1),
            xrem,
            yrem,
        );

        // Corner coordinates to centre coordinates
        BitSite {
            position: Point::new(px - 0.5, py - 0.5),
            cutlevel,
        }
    }

    /// Intensity at `p` sharpened against its four neighbours one page
    /// pixel away along the scan axes
    pub fn sample(&self, raster: &GrayRaster, p: Point) -> f64 {
        let hdist = self.scale.hpixel * self.config.unsharp_dist;
        let vdist = self.scale.vpixel * self.config.unsharp_dist;
        let axes = &self.scale.axes;

        let neighbours = [
            axes.shift(p, -hdist, 0.0),
            axes.shift(p, hdist, 0.0),
            axes.shift(p, 0.0, vdist),
            axes.shift(p, 0.0, -vdist),
        ];
        let avg = neighbours
            .iter()
            .map(|n| sample_bilinear(raster, n.x, n.y))
            .sum::<f64>()
            / 4.0;

        let val = sample_bilinear(raster, p.x, p.y);
        val + self.config.unsharp_mask * (val - avg)
    }

    /// Sample data pixel (x, y); true means black, a written 1
    pub fn read_bit(&self, raster: &GrayRaster, x: u64, y: u64) -> (bool, f64, BitSite) {
        let site = self.bit_site(x, y);
        let value = self.sample(raster, site.position);
        (value < site.cutlevel, value, site)
    }
}
