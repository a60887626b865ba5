/// Interpolation and scan-axis helpers shared by calibration and sampling
use crate::models::{GrayRaster, Point};

/// Bilinear blend of four corner values; `h` runs left to right and `v`
/// top to bottom, both nominally in 0..=1
pub fn bilinear(ul: f64, ur: f64, ll: f64, lr: f64, h: f64, v: f64) -> f64 {
    let upper = ur * h + ul * (1.0 - h);
    let lower = lr * h + ll * (1.0 - h);
    lower * v + upper * (1.0 - v)
}

/// Interpolated pixel value at (x, y), integers in pixel centres.
///
/// Negative coordinates extrapolate from the first row/column; pixels
/// outside the raster read as white.
pub fn sample_bilinear(raster: &GrayRaster, x: f64, y: f64) -> f64 {
    let xi = if x < 0.0 { 0 } else { x.floor() as usize };
    let yi = if y < 0.0 { 0 } else { y.floor() as usize };
    bilinear(
        raster.get(xi, yi) as f64,
        raster.get(xi.saturating_add(1), yi) as f64,
        raster.get(xi, yi.saturating_add(1)) as f64,
        raster.get(xi.saturating_add(1), yi.saturating_add(1)) as f64,
        x - xi as f64,
        y - yi as f64,
    )
}

/// Angle of a vector in degrees, -180..=180, with +y pointing up
pub fn angle(x: f64, y: f64) -> f64 {
    y.atan2(x).to_degrees()
}

/// Fold an angle into -180..=180
pub fn normalize_angle(degrees: f64) -> f64 {
    degrees - 360.0 * (degrees / 360.0).round()
}

/// Unit vectors of one page pixel step to the right and downwards, in
/// image coordinates. Compensates rotation of the scanned page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelAxes {
    /// Rightward unit vector
    pub h: Point,
    /// Downward unit vector
    pub v: Point,
}

impl Default for PixelAxes {
    fn default() -> Self {
        Self {
            h: Point::new(1.0, 0.0),
            v: Point::new(0.0, 1.0),
        }
    }
}

impl PixelAxes {
    /// Axes from averaged horizontal and vertical edge vectors; a zero
    /// vector falls back to the unrotated axis
    pub fn from_vectors(h: Point, v: Point) -> Self {
        let default = Self::default();
        Self {
            h: normalize(h).unwrap_or(default.h),
            v: normalize(v).unwrap_or(default.v),
        }
    }

    /// Move `p` by `dx` steps along the horizontal axis and `dy` along the
    /// vertical one
    pub fn shift(&self, p: Point, dx: f64, dy: f64) -> Point {
        Point::new(
            p.x + dx * self.h.x + dy * self.v.x,
            p.y + dx * self.h.y + dy * self.v.y,
        )
    }

    /// Mean rotation of both axes against the image axes, in degrees
    pub fn skew(&self) -> f64 {
        normalize_angle(angle(self.h.x, -self.h.y) + angle(self.v.x, -self.v.y) + 90.0) / 2.0
    }

    /// Angle between the axes in degrees, 90 for a square scan
    pub fn perpendicularity(&self) -> f64 {
        normalize_angle(angle(self.h.x, -self.h.y) - angle(self.v.x, -self.v.y))
    }
}

fn normalize(p: Point) -> Option<Point> {
    let len = (p.x * p.x + p.y * p.y).sqrt();
    (len > 0.0 && len.is_finite()).then(|| Point::new(p.x / len, p.y / len))
}
