/// Drawing on the diagnostic copy of a page
use crate::fec::BitDirection;
use crate::models::{BLACK, GrayRaster, Point, WHITE};

const GREY: u8 = 0x80;

/// 2x2 checker centred on `p` (integers on pixel corners); its upper left
/// pixel is white
pub fn mark(image: &mut GrayRaster, p: Point) {
    let (x, y) = p.round();
    image.set_signed(x, y, WHITE);
    image.set_signed(x - 1, y - 1, WHITE);
    image.set_signed(x - 1, y, BLACK);
    image.set_signed(x, y - 1, BLACK);
}

/// Inverted sample value at the sampling point of a data pixel
pub fn debug_dot(image: &mut GrayRaster, p: Point, value: f64) {
    let level = (value + 0.5).floor().clamp(0.0, 255.0) as u8;
    image.set_signed((p.x + 0.5).floor() as i64, (p.y + 0.5).floor() as i64, level ^ 0xff);
}

/// Frame of the page used to place edge ticks: left, right, top, bottom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickEdges {
    /// Leftmost corner x
    pub left: f64,
    /// Rightmost corner x
    pub right: f64,
    /// Topmost corner y
    pub top: f64,
    /// Bottommost corner y
    pub bottom: f64,
}

/// Box around a damaged bit at (x, y) plus ticks on the image edges.
///
/// Black dirt (0 to 1) and unknown damage tick the left and top edges,
/// white dirt the right and bottom ones. The inner box is black for
/// black dirt and white otherwise; the outer box has the opposite colour,
/// or grey for bits of irreparable symbols.
pub fn mark_bad_bit(
    image: &mut GrayRaster,
    x: i64,
    y: i64,
    direction: BitDirection,
    edges: &TickEdges,
    size: i64,
) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    match direction {
        BitDirection::ZeroToOne | BitDirection::Unknown => {
            for u in 0..edges.left as i64 {
                image.set_signed(u, y, BLACK);
            }
            for u in 0..edges.top as i64 {
                image.set_signed(x, u, BLACK);
            }
        }
        BitDirection::OneToZero => {
            for u in edges.right as i64..width {
                image.set_signed(u, y, BLACK);
            }
            for u in edges.bottom as i64..height {
                image.set_signed(x, u, BLACK);
            }
        }
    }

    let inner = if direction == BitDirection::OneToZero {
        WHITE
    } else {
        BLACK
    };
    let outer = match direction {
        BitDirection::Unknown => GREY,
        _ => inner ^ 0xff,
    };
    draw_square(image, x, y, size - 1, size, inner);
    draw_square(image, x, y, size, size, outer);
}

/// Outline of half side `r`, sides `len` long either way from the centre
fn draw_square(image: &mut GrayRaster, x: i64, y: i64, r: i64, len: i64, value: u8) {
    for i in -len..=len {
        image.set_signed(x + i, y - r, value);
        image.set_signed(x + i, y + r, value);
        image.set_signed(x - r, y + i, value);
        image.set_signed(x + r, y + i, value);
    }
}

/// Half size of the bad-bit box for a page scale
pub fn bad_bit_box_size(hpixel: f64, vpixel: f64) -> i64 {
    (2.0 * (hpixel * vpixel).sqrt() + 0.5).floor() as i64
}
