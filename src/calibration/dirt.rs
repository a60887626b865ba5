/// Removal of dirt lying in the white margin around the page frame.
///
/// The margin is flood filled from eight seeds on the image edge through
/// pixels at least as bright as the fill cutlevel. A second untested fill
/// from the image centre claims the frame and everything inside it.
/// Whatever neither fill reached is isolated dirt and is painted white.
use crate::models::{GrayRaster, WHITE};
use std::collections::VecDeque;

const REACHED: u8 = 0;
const UNREACHED: u8 = 0xff;

struct Flood<'a> {
    source: &'a GrayRaster,
    mask: GrayRaster,
    queue: VecDeque<(usize, usize)>,
}

impl<'a> Flood<'a> {
    fn new(source: &'a GrayRaster) -> Self {
        Self {
            source,
            mask: GrayRaster::new(source.width(), source.height(), UNREACHED),
            queue: VecDeque::new(),
        }
    }

    fn try_visit(&mut self, x: usize, y: usize, threshold: Option<u8>) {
        if let Some(level) = threshold {
            if self.source.get(x, y) < level {
                return;
            }
        }
        if self.mask.get(x, y) == REACHED {
            return;
        }
        self.mask.set(x, y, REACHED);
        self.queue.push_back((x, y));
    }

    /// 4-connected fill from (x, y); with a threshold only pixels at or
    /// above it are entered
    fn fill(&mut self, x: usize, y: usize, threshold: Option<u8>) {
        let (width, height) = (self.source.width(), self.source.height());
        if x >= width || y >= height {
            return;
        }
        self.try_visit(x, y, threshold);
        while let Some((x, y)) = self.queue.pop_front() {
            if x + 1 < width {
                self.try_visit(x + 1, y, threshold);
            }
            if x > 0 {
                self.try_visit(x - 1, y, threshold);
            }
            if y + 1 < height {
                self.try_visit(x, y + 1, threshold);
            }
            if y > 0 {
                self.try_visit(x, y - 1, threshold);
            }
        }
    }
}

/// Whiten dirt outside the page frame. Returns the number of pixels erased.
pub fn remove_border_dirt(raster: &mut GrayRaster, fill_cutlevel: u8) -> u64 {
    let (width, height) = (raster.width(), raster.height());
    if width == 0 || height == 0 {
        return 0;
    }

    let mask = {
        let mut flood = Flood::new(raster);
        let seeds = [
            (0, 0),
            (width / 2, 0),
            (width - 1, 0),
            (0, height / 2),
            (0, height - 1),
            (width - 1, height - 1),
            (width - 1, height / 2),
            (width / 2, height - 1),
        ];
        for (x, y) in seeds {
            flood.fill(x, y, Some(fill_cutlevel));
        }
        flood.fill(width / 2, height / 2, None);
        flood.mask
    };

    let mut erased = 0u64;
    for (px, &m) in raster.as_bytes_mut().iter_mut().zip(mask.as_bytes()) {
        if m == UNREACHED {
            *px = WHITE;
            erased += 1;
        }
    }
    erased
}
