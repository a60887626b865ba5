use crate::error::{OptarError, Result};
use std::fmt;
use std::str::FromStr;

/// Width of one footer label glyph cell in pixels
pub const TEXT_WIDTH: u32 = 13;
/// Default footer label height in pixels
pub const TEXT_HEIGHT: u32 = 24;
/// Version tag leading every format descriptor
pub const DESCRIPTOR_VERSION: u32 = 0;

/// Forward error correction scheme of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FecOrder {
    /// Extended Golay(24,12)
    #[default]
    Golay,
    /// Extended Hamming of the given order (2..=5), 2^order bits per symbol
    Hamming(u8),
}

impl FecOrder {
    /// Build from the numeric descriptor value (1 = Golay, 2..=5 = Hamming)
    pub fn from_number(order: u32) -> Option<Self> {
        match order {
            1 => Some(FecOrder::Golay),
            2..=5 => Some(FecOrder::Hamming(order as u8)),
            _ => None,
        }
    }

    /// Numeric descriptor value
    pub fn number(&self) -> u32 {
        match self {
            FecOrder::Golay => 1,
            FecOrder::Hamming(order) => *order as u32,
        }
    }

    /// Channel bits per symbol
    pub fn large_bits(&self) -> u32 {
        match self {
            FecOrder::Golay => 24,
            FecOrder::Hamming(order) => 1 << order,
        }
    }

    /// Payload bits per symbol
    pub fn small_bits(&self) -> u32 {
        match self {
            FecOrder::Golay => 12,
            FecOrder::Hamming(order) => self.large_bits() - 1 - *order as u32,
        }
    }
}

/// Page layout configuration.
///
/// Immutable once built; every derived pixel quantity lives in
/// [`PageConstants`](super::PageConstants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFormat {
    /// Number of crosses horizontally
    pub xcrosses: u32,
    /// Number of crosses vertically
    pub ycrosses: u32,
    /// Distance between cross centres in pixels
    pub cpitch: u32,
    /// Half of the cross side; a cross is `2*chalf` square
    pub chalf: u32,
    /// Error correction scheme
    pub fec: FecOrder,
    /// Black border thickness in pixels
    pub border: u32,
    /// Footer label height in pixels
    pub text_height: u32,
}

impl Default for PageFormat {
    fn default() -> Self {
        Self {
            xcrosses: 33,
            ycrosses: 47,
            cpitch: 24,
            chalf: 3,
            fec: FecOrder::Golay,
            border: 2,
            text_height: TEXT_HEIGHT,
        }
    }
}

impl PageFormat {
    /// Reject layouts that would produce a degenerate channel
    pub fn validate(&self) -> Result<()> {
        if self.xcrosses < 2 || self.ycrosses < 2 {
            return Err(OptarError::InvalidFormat(format!(
                "need at least 2x2 crosses, got {}x{}",
                self.xcrosses, self.ycrosses
            )));
        }
        if self.chalf == 0 {
            return Err(OptarError::InvalidFormat(
                "cross half size must be positive".to_string(),
            ));
        }
        if self.cpitch <= 2 * self.chalf {
            return Err(OptarError::InvalidFormat(format!(
                "cross pitch {} leaves no data gap around crosses of size {}",
                self.cpitch,
                2 * self.chalf
            )));
        }
        if let FecOrder::Hamming(order) = self.fec {
            if !(2..=5).contains(&order) {
                return Err(OptarError::InvalidFormat(format!(
                    "hamming order {} outside 2..=5",
                    order
                )));
            }
        }
        if self.text_height > 0 && self.text_height < 8 {
            return Err(OptarError::InvalidFormat(format!(
                "text height {} too small for the label font",
                self.text_height
            )));
        }
        Ok(())
    }

    /// Machine-readable descriptor printed in the footer label
    pub fn descriptor(&self) -> String {
        self.to_string()
    }

    /// Full footer label text for a page
    pub fn label(&self, page: u32, page_count: u32, identifier: &str) -> String {
        format!("  {} {}/{} {}", self, page, page_count, identifier)
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}-{}-{}-{}",
            DESCRIPTOR_VERSION,
            self.xcrosses,
            self.ycrosses,
            self.cpitch,
            self.chalf,
            self.fec.number(),
            self.border,
            self.text_height
        )
    }
}

impl FromStr for PageFormat {
    type Err = OptarError;

    /// Parses `0-<x>-<y>-<pitch>-<half>-<fec>-<border>-<text>`. Surrounding
    /// label text (page numbers, identifier) is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let token = s
            .split_whitespace()
            .next()
            .ok_or_else(|| OptarError::InvalidFormat("empty format descriptor".to_string()))?;

        let fields = token
            .split('-')
            .map(|part| {
                part.parse::<u32>().map_err(|_| {
                    OptarError::InvalidFormat(format!("bad field {:?} in {:?}", part, token))
                })
            })
            .collect::<Result<Vec<u32>>>()?;

        if fields.len() != 8 {
            return Err(OptarError::InvalidFormat(format!(
                "expected 8 fields in {:?}, found {}",
                token,
                fields.len()
            )));
        }
        if fields[0] != DESCRIPTOR_VERSION {
            return Err(OptarError::InvalidFormat(format!(
                "unsupported descriptor version {}",
                fields[0]
            )));
        }

        let fec = FecOrder::from_number(fields[5]).ok_or_else(|| {
            OptarError::InvalidFormat(format!("unknown fec order {}", fields[5]))
        })?;

        let format = PageFormat {
            xcrosses: fields[1],
            ycrosses: fields[2],
            cpitch: fields[3],
            chalf: fields[4],
            fec,
            border: fields[6],
            text_height: fields[7],
        };
        format.validate()?;
        Ok(format)
    }
}
