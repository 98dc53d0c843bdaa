//! A collection of constants.

/// Bins used by `--mean`, `--quant` and `--hist` unless `--nbins` says otherwise
pub const DEFAULT_NBINS: usize = 60;
/// Median
pub const DEFAULT_QUANTILE: f64 = 50.0;

/// Unscaled image width in pixels
pub const DEFAULT_WIDTH: u32 = 700;
/// Unscaled image height in pixels
pub const DEFAULT_HEIGHT: u32 = 500;
/// Multiplier applied to width, height, fonts and strokes
pub const DEFAULT_SCALE: f64 = 1.0;

/// Largest image `--size` may ask for, in pixels
pub const MAX_PIXELS: f64 = 64_000_000.0;

/// Title shown when reading from standard input without `--title`
pub const STDIN_NAME: &str = "<stdin>";

/// Column names used by the headerless whitespace fallback
pub const FALLBACK_COLUMNS: [&str; 2] = ["x", "y"];

/// Relative widening of a constant numeric domain, per side.
///
/// 5.0 becomes [4.995, 5.005]
pub const DEGENERATE_NUMERIC_PAD: f64 = 0.001;
/// Widening of a constant temporal domain, per side, in seconds
pub const DEGENERATE_TEMPORAL_PAD_SECS: f64 = 1.0;

/// Chart chrome, in unscaled pixels
pub const CAPTION_FONT: f64 = 20.0;
pub const LABEL_FONT: f64 = 13.0;
pub const MARGIN: f64 = 16.0;
pub const X_LABEL_AREA: f64 = 40.0;
pub const Y_LABEL_AREA: f64 = 60.0;
pub const STROKE_WIDTH: f64 = 2.0;
pub const ERROR_BAR_WIDTH: f64 = 6.0;
pub const MARKER_RADIUS: f64 = 3.0;
pub const LEGEND_SAMPLE: f64 = 20.0;
