use clap::{ArgGroup, Parser};

use crate::core::{
    config::Mode,
    constants::{DEFAULT_NBINS, DEFAULT_QUANTILE},
    size::OutputSize,
};

/// Top-level CLI structure.
#[derive(Parser, Debug)]
#[command(
    name = "qd",
    version,
    about = "Quick charts from CSV or JSON lines, written as PNG"
)]
#[command(group(ArgGroup::new("mode").args(["line", "mean", "quant", "hist"])))]
pub struct Cli {
    /// Input path (use `-` for stdin)
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    pub input: String,

    /// Output path (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Chart title (input name if omitted)
    #[arg(short, long)]
    pub title: Option<String>,

    /// x-column(s), comma separated
    #[arg(short = 'x', long = "xcol", value_name = "COLS", value_delimiter = ',')]
    pub x_cols: Option<Vec<String>>,

    /// y-column(s), comma separated
    #[arg(short = 'y', long = "ycol", value_name = "COLS", value_delimiter = ',')]
    pub y_cols: Option<Vec<String>>,

    /// Number of bins for --mean, --quant and --hist
    #[arg(short, long, default_value_t = DEFAULT_NBINS)]
    pub nbins: usize,

    /// Percentile drawn by --quant, 0-100
    #[arg(short, long, default_value_t = DEFAULT_QUANTILE, allow_negative_numbers = true)]
    pub quantile: f64,

    /// Plain line chart (default)
    #[arg(long)]
    pub line: bool,
    /// Binned mean with standard-error bars
    #[arg(long)]
    pub mean: bool,
    /// Binned quantile
    #[arg(long)]
    pub quant: bool,
    /// Histogram of the x-column(s)
    #[arg(long)]
    pub hist: bool,

    /// Open the chart in the platform image viewer instead of writing it
    #[arg(long)]
    pub gui: bool,

    /// Put the second y-column on a right-hand axis
    #[arg(long)]
    pub dualy: bool,

    /// Output size as `scale,[width],[height]`
    #[arg(short, long, value_name = "SCALE,W,H", default_value = "1,700,500")]
    pub size: OutputSize,

    /// Emit debug logs and timing diagnostics
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Selected mode; the flags are mutually exclusive.
    pub fn mode(&self) -> Mode {
        if self.mean {
            Mode::Mean
        } else if self.quant {
            Mode::Quant
        } else if self.hist {
            Mode::Hist
        } else {
            Mode::Line
        }
    }
}
