/// Outer frame corners and the page scale derived from them
use crate::config::CalibrationConfig;
use crate::error::{Corner, OptarError, Result};
use crate::models::{GrayRaster, PageConstants, Point};
use crate::utils::geometry::PixelAxes;

/// Frame corners in image pixels, integers on pixel upper left corners.
/// Order: upper left, upper right, lower left, lower right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    /// Corner positions
    pub points: [Point; 4],
}

/// First pixel darker than `cutlevel` on anti-diagonals moving away from
/// the image corner (`x0`, `y0`). `sx`/`sy` give the inward direction.
fn diag_scan(
    raster: &GrayRaster,
    cutlevel: u8,
    x0: i64,
    y0: i64,
    sx: i64,
    sy: i64,
) -> Option<(i64, i64)> {
    let diagonals = raster.width().min(raster.height()) as i64;
    for k in 0..diagonals {
        for i in 0..=k {
            let x = x0 + sx * (k - i);
            let y = y0 + sy * i;
            if raster.get_signed(x, y) < cutlevel {
                return Some((x, y));
            }
        }
    }
    None
}

impl Corners {
    /// Scan for the four frame corners
    pub fn find(raster: &GrayRaster, cutlevel: u8) -> Result<Self> {
        let right = raster.width() as i64 - 1;
        let bottom = raster.height() as i64 - 1;
        let not_found = |corner| OptarError::CornerNotFound { corner };

        let (x, y) = diag_scan(raster, cutlevel, 0, 0, 1, 1)
            .ok_or_else(|| not_found(Corner::UpperLeft))?;
        let ul = Point::new(x as f64, y as f64);

        let (x, y) = diag_scan(raster, cutlevel, right, 0, -1, 1)
            .ok_or_else(|| not_found(Corner::UpperRight))?;
        let ur = Point::new((x + 1) as f64, y as f64);

        let (x, y) = diag_scan(raster, cutlevel, 0, bottom, 1, -1)
            .ok_or_else(|| not_found(Corner::LowerLeft))?;
        let ll = Point::new(x as f64, (y + 1) as f64);

        let (x, y) = diag_scan(raster, cutlevel, right, bottom, -1, -1)
            .ok_or_else(|| not_found(Corner::LowerRight))?;
        let lr = Point::new((x + 1) as f64, (y + 1) as f64);

        Ok(Self {
            points: [ul, ur, ll, lr],
        })
    }

    /// Upper left corner
    pub fn upper_left(&self) -> Point {
        self.points[0]
    }

    /// Average of the top and bottom edge vectors
    pub fn horizontal_span(&self) -> Point {
        let [ul, ur, ll, lr] = self.points;
        Point::new(
            (ur.x + lr.x - ul.x - ll.x) / 2.0,
            (ur.y + lr.y - ul.y - ll.y) / 2.0,
        )
    }

    /// Average of the left and right edge vectors
    pub fn vertical_span(&self) -> Point {
        let [ul, ur, ll, lr] = self.points;
        Point::new(
            (ll.x + lr.x - ul.x - ur.x) / 2.0,
            (ll.y + lr.y - ul.y - ur.y) / 2.0,
        )
    }

    /// Bounding box of the corners: left, right, top, bottom
    pub fn edges(&self) -> (f64, f64, f64, f64) {
        let [ul, ur, ll, lr] = self.points;
        (
            ul.x.min(ll.x),
            ur.x.max(lr.x),
            ul.y.min(ur.y),
            ll.y.max(lr.y),
        )
    }
}

/// Image pixels per page pixel and the search windows that follow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageScale {
    /// Image pixels per page pixel horizontally
    pub hpixel: f64,
    /// Image pixels per page pixel vertically
    pub vpixel: f64,
    /// Half size of the coarse cross search window, image pixels
    pub search_half: i64,
    /// Half size of the fine cross correlation window, image pixels
    pub fine_half: i64,
    /// Scan axes
    pub axes: PixelAxes,
}

impl PageScale {
    /// Measure the scan against the expected page size.
    ///
    /// The coarse window covers only half a cross so that data mimicking
    /// the other half cannot pull the search away.
    pub fn measure(corners: &Corners, constants: &PageConstants, config: &CalibrationConfig) -> Self {
        let h_span = corners.horizontal_span();
        let v_span = corners.vertical_span();
        let hpixel = h_span.x / constants.width as f64;
        let vpixel = v_span.y / constants.height as f64;

        let chalf = constants.format.chalf as f64;
        let search_half = (hpixel * chalf * 0.5).min(vpixel * chalf * 0.5).floor().max(0.0) as i64;
        let trimmed = chalf - config.cross_trim;
        let fine_half = (hpixel * trimmed).min(vpixel * trimmed).floor().max(0.0) as i64;

        Self {
            hpixel,
            vpixel,
            search_half,
            fine_half,
            axes: PixelAxes::from_vectors(h_span, v_span),
        }
    }
}
