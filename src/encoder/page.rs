/// Rasterization of the fixed page furniture: border, alignment crosses
/// and footer label, plus placement of individual channel bits.
use super::font;
use crate::channel::BitChannel;
use crate::models::{BLACK, GrayRaster, PageConstants, TEXT_WIDTH, WHITE};

/// Draws pages for one layout
#[derive(Debug, Clone, Copy)]
pub struct PageRenderer<'a> {
    constants: &'a PageConstants,
}

impl<'a> PageRenderer<'a> {
    /// Create a renderer for `constants`
    pub fn new(constants: &'a PageConstants) -> Self {
        Self { constants }
    }

    /// Blank white raster of the full page size
    pub fn blank(&self) -> GrayRaster {
        GrayRaster::new(
            self.constants.width as usize,
            self.constants.height as usize,
            WHITE,
        )
    }

    /// White page with border, crosses and footer label
    pub fn format_page(&self, label: &str) -> GrayRaster {
        let mut raster = self.blank();
        self.border(&mut raster);
        self.crosses(&mut raster);
        self.label(&mut raster, label);
        raster
    }

    /// Black frame around the data area; the footer strip is black too
    pub fn border(&self, raster: &mut GrayRaster) {
        let c = self.constants;
        let border = c.format.border as usize;
        let width = c.width as usize;
        let height = c.height as usize;
        let data_bottom = border + c.data_height as usize;

        raster.fill_rect(0, 0, width, border, BLACK);
        raster.fill_rect(0, border, border, c.data_height as usize, BLACK);
        raster.fill_rect(width - border, border, border, c.data_height as usize, BLACK);
        raster.fill_rect(0, data_bottom, width, height - data_bottom, BLACK);
    }

    /// Draw one cross with its upper left pixel at (x, y).
    /// Upper left and lower right quadrants are black.
    pub fn cross(&self, raster: &mut GrayRaster, x: usize, y: usize) {
        let chalf = self.constants.format.chalf as usize;
        raster.fill_rect(x, y, chalf, chalf, BLACK);
        raster.fill_rect(x + chalf, y, chalf, chalf, WHITE);
        raster.fill_rect(x, y + chalf, chalf, chalf, WHITE);
        raster.fill_rect(x + chalf, y + chalf, chalf, chalf, BLACK);
    }

    /// Draw the full grid of crosses
    pub fn crosses(&self, raster: &mut GrayRaster) {
        let format = &self.constants.format;
        let border = format.border as usize;
        let cpitch = format.cpitch as usize;
        for cy in 0..format.ycrosses as usize {
            for cx in 0..format.xcrosses as usize {
                self.cross(raster, border + cx * cpitch, border + cy * cpitch);
            }
        }
    }

    /// Render `text` white on the black footer strip.
    ///
    /// Characters advance by [`TEXT_WIDTH`]; the text is cut where the
    /// next glyph would overrun the data width, and unprintable characters
    /// are skipped.
    pub fn label(&self, raster: &mut GrayRaster, text: &str) {
        let c = self.constants;
        let text_height = c.format.text_height as usize;
        if text_height == 0 {
            return;
        }
        let left = c.format.border as usize;
        let top = c.format.border as usize + c.data_height as usize;
        let cell = TEXT_WIDTH as usize;
        let max_chars = (c.data_width as usize / cell).saturating_sub(1);

        let mut x = 0usize;
        for ch in text.chars().take(max_chars) {
            let Some(glyph) = font::glyph(ch) else {
                continue;
            };
            if x + cell > c.data_width as usize {
                break;
            }
            for cy in 0..text_height {
                // One blank font row above and one below the 7 glyph rows
                let row = (cy * 9 / text_height).checked_sub(1);
                for cx in 1..cell - 2 {
                    let col = (cx - 1) / 2;
                    if row.is_some_and(|row| font::lit(glyph, col, row)) {
                        raster.set(left + x + cx, top + cy, WHITE);
                    }
                }
            }
            x += cell;
        }
    }

    /// Paint channel bit `seq`: black for 1, white for 0
    pub fn put_bit(&self, raster: &mut GrayRaster, seq: u64, bit: bool) {
        let border = self.constants.format.border as u64;
        if let Some((x, y)) = BitChannel::new(self.constants).locate(seq) {
            let value = if bit { BLACK } else { WHITE };
            raster.set((x + border) as usize, (y + border) as usize, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageFormat;

    #[test]
    fn test_page_size_and_border() {
        let constants = PageConstants::new(&PageFormat::default());
        let page = PageRenderer::new(&constants).format_page("");
        assert_eq!(page.width(), 778);
        assert_eq!(page.height(), 1138);
        assert_eq!(page.get(0, 0), BLACK);
        assert_eq!(page.get(777, 500), BLACK);
        assert_eq!(page.get(1, 1137), BLACK);
        // Data area between the crosses is white
        assert_eq!(page.get(2 + 12, 2 + 12), WHITE);
    }

    #[test]
    fn test_cross_pattern() {
        let constants = PageConstants::new(&PageFormat::default());
        let page = PageRenderer::new(&constants).format_page("");
        // First cross at (2, 2), quadrants 3x3
        assert_eq!(page.get(2, 2), BLACK);
        assert_eq!(page.get(5, 2), WHITE);
        assert_eq!(page.get(2, 5), WHITE);
        assert_eq!(page.get(7, 7), BLACK);
        // Last cross
        let x = 2 + 32 * 24;
        let y = 2 + 46 * 24;
        assert_eq!(page.get(x, y), BLACK);
        assert_eq!(page.get(x + 3, y), WHITE);
        assert_eq!(page.get(x + 5, y + 5), BLACK);
    }

    #[test]
    fn test_label_draws_inside_footer() {
        let constants = PageConstants::new(&PageFormat::default());
        let renderer = PageRenderer::new(&constants);
        let blank = renderer.format_page("");
        let labelled = renderer.format_page(&PageFormat::default().label(1, 1, "x"));
        let footer_top = 2 + constants.data_height as usize;
        for y in 0..blank.height() {
            if blank.row(y) != labelled.row(y) {
                assert!(y >= footer_top, "label leaked into row {}", y);
            }
        }
        assert_ne!(blank, labelled);
    }

    #[test]
    fn test_put_bit() {
        let constants = PageConstants::new(&PageFormat::default());
        let renderer = PageRenderer::new(&constants);
        let mut page = renderer.format_page("");
        renderer.put_bit(&mut page, 0, true);
        assert_eq!(page.get(2 + 6, 2), BLACK);
        renderer.put_bit(&mut page, 0, false);
        assert_eq!(page.get(2 + 6, 2), WHITE);
    }
}
