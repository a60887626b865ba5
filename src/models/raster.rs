use crate::error::{OptarError, Result};

/// Value of a white pixel
pub const WHITE: u8 = 0xff;
/// Value of a black pixel
pub const BLACK: u8 = 0x00;

/// 8-bit grayscale page buffer with bounds-checked access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayRaster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayRaster {
    /// Create a raster filled with `value`
    pub fn new(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap an existing row-major buffer
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != width * height {
            return Err(OptarError::RasterSize {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Get raster width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get raster height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at (x, y); white outside the raster
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return WHITE;
        }
        self.data[y * self.width + x]
    }

    /// Pixel at signed coordinates; white outside the raster
    pub fn get_signed(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 {
            return WHITE;
        }
        self.get(x as usize, y as usize)
    }

    /// Set pixel at (x, y); writes outside the raster are dropped
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y * self.width + x] = value;
    }

    /// Set pixel at signed coordinates; writes outside the raster are dropped
    pub fn set_signed(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 {
            return;
        }
        self.set(x as usize, y as usize, value);
    }

    /// Fill a clipped rectangle
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, value: u8) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for row in y.min(y_end)..y_end {
            let start = row * self.width;
            self.data[start + x.min(x_end)..start + x_end].fill(value);
        }
    }

    /// One row of pixels
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Get raw pixels
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get raw pixels mutably
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Default for GrayRaster {
    fn default() -> Self {
        Self::new(0, 0, WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_raster() {
        let mut raster = GrayRaster::new(8, 6, WHITE);
        assert_eq!(raster.width(), 8);
        assert_eq!(raster.height(), 6);

        raster.set(3, 4, BLACK);
        assert_eq!(raster.get(3, 4), BLACK);
        assert_eq!(raster.get(3, 3), WHITE);

        raster.set(3, 4, raster.get(3, 4) ^ 0xff);
        assert_eq!(raster.get(3, 4), WHITE);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut raster = GrayRaster::new(8, 8, BLACK);
        raster.set(10, 10, BLACK); // Should not panic
        raster.set_signed(-1, 2, BLACK);
        assert_eq!(raster.get(10, 10), WHITE);
        assert_eq!(raster.get_signed(-1, 0), WHITE);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut raster = GrayRaster::new(4, 4, WHITE);
        raster.fill_rect(2, 2, 10, 10, BLACK);
        assert_eq!(raster.get(3, 3), BLACK);
        assert_eq!(raster.get(1, 3), WHITE);
        assert_eq!(raster.as_bytes().iter().filter(|&&p| p == BLACK).count(), 4);
    }

    #[test]
    fn test_from_vec_checks_size() {
        assert!(GrayRaster::from_vec(3, 3, vec![0; 8]).is_err());
        assert!(GrayRaster::from_vec(3, 3, vec![0; 9]).is_ok());
    }
}
