//! Decode-side tuning constants.
//!
//! The defaults reproduce the behaviour pages were tuned against; each value
//! can be overridden through an `OPTAR_*` environment variable.

use std::str::FromStr;
use std::sync::OnceLock;

const FINE_STEP: f64 = 0.25;

fn parse_setting<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

/// Value of `OPTAR_<name>` when it is set and parses
fn optar_var<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(format!("OPTAR_{}", name))
        .ok()
        .and_then(|raw| parse_setting(&raw))
}

fn optar_f64(name: &str) -> Option<f64> {
    optar_var::<f64>(name).filter(|v| v.is_finite())
}

/// Tunables for calibration and bit sampling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Unsharp mask strength applied when sampling a bit
    pub unsharp_mask: f64,
    /// Distance of the unsharp mask neighbours, in page pixels (up to 1.0)
    pub unsharp_dist: f64,
    /// Global cut used for positioning: 0 cuts at black, 1 at white
    pub sync_white_cut: f64,
    /// Per-cross cut used for quantization: 0 cuts at black, 1 at white
    pub white_cut: f64,
    /// Min/max dust filter size as a fraction of the page pixel
    pub minmax_filter: f64,
    /// Blur blot width as a fraction of the page pixel
    pub pixel_blur: f64,
    /// Page pixels trimmed from each cross before the fine search
    pub cross_trim: f64,
    /// Sub-pixel step of the fine cross search; `None` skips it
    pub fine_step: Option<f64>,
    /// Gamma of the scanned input (output = photons ^ gamma)
    pub input_gamma: f64,
    /// Upper bound on cutlevel estimation rounds
    pub max_cutlevel_iterations: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            unsharp_mask: 7.0,
            unsharp_dist: 1.0,
            sync_white_cut: 0.10,
            white_cut: 0.06,
            minmax_filter: 0.5,
            pixel_blur: 0.25,
            cross_trim: 0.75,
            fine_step: Some(FINE_STEP),
            input_gamma: 0.454545,
            max_cutlevel_iterations: 32,
        }
    }
}

impl CalibrationConfig {
    /// Defaults overridden by `OPTAR_*` environment variables
    pub fn from_env() -> Self {
        let d = Self::default();
        let fraction = |name: &str, default: f64| optar_f64(name).map_or(default, |v| v.clamp(0.0, 1.0));
        let non_negative = |name: &str, default: f64| optar_f64(name).map_or(default, |v| v.max(0.0));
        let fine_search = optar_var::<u8>("FINE_SEARCH").is_none_or(|v| v != 0);
        let fine_step = optar_f64("FINE_STEP").map_or(FINE_STEP, |v| v.clamp(0.01, 0.5));
        Self {
            unsharp_mask: optar_f64("UNSHARP_MASK").unwrap_or(d.unsharp_mask),
            unsharp_dist: fraction("UNSHARP_DIST", d.unsharp_dist),
            sync_white_cut: fraction("SYNC_WHITE_CUT", d.sync_white_cut),
            white_cut: fraction("WHITE_CUT", d.white_cut),
            minmax_filter: non_negative("MINMAX_FILTER", d.minmax_filter),
            pixel_blur: non_negative("PIXEL_BLUR", d.pixel_blur),
            cross_trim: non_negative("CROSS_TRIM", d.cross_trim),
            fine_step: fine_search.then_some(fine_step),
            input_gamma: optar_f64("INPUT_GAMMA").map_or(d.input_gamma, |v| v.max(0.01)),
            max_cutlevel_iterations: optar_var::<usize>("MAX_CUTLEVEL_ITERATIONS")
                .map_or(d.max_cutlevel_iterations, |v| v.clamp(1, 1024)),
        }
    }

    /// Process-wide configuration, read from the environment once
    pub fn global() -> &'static CalibrationConfig {
        static CONFIG: OnceLock<CalibrationConfig> = OnceLock::new();
        CONFIG.get_or_init(Self::from_env)
    }
}
