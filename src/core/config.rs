//! Run-time configuration object + fluent builder.

use crate::core::{
    constants::{DEFAULT_NBINS, DEFAULT_QUANTILE},
    data::Dataset,
    error::{ConfigError, GraphError},
    size::OutputSize,
};

/// Which chart a run draws. Exactly one per invocation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Line,
    Mean,
    Quant,
    Hist,
}

impl Mode {
    #[inline]
    pub fn needs_y(self) -> bool {
        !matches!(self, Self::Hist)
    }
}

/// Immutable parameters handed to the figure builder and renderer.
///
/// Column lists are resolved against the data set and validated, so every
/// name in `x_cols`/`y_cols` exists.
#[derive(Debug, Clone)]
pub struct Config {
    pub title: String,
    pub x_cols: Vec<String>,
    pub y_cols: Vec<String>,
    pub mode: Mode,
    pub nbins: usize,
    /// Percentile, 0..=100.
    pub quantile: f64,
    pub dual_y: bool,
    pub size: OutputSize,
}

impl Config {
    #[inline]
    pub fn builder(title: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(title.into())
    }

    /// Quantile as a fraction in `[0, 1]`.
    #[inline]
    pub fn quantile_fraction(&self) -> f64 {
        self.quantile / 100.0
    }
}

/// Fluent builder; nothing is checked until `build`.
#[derive(Debug)]
pub struct ConfigBuilder {
    title: String,
    x_cols: Option<Vec<String>>,
    y_cols: Option<Vec<String>>,
    mode: Mode,
    nbins: usize,
    quantile: f64,
    dual_y: bool,
    size: OutputSize,
}

impl ConfigBuilder {
    pub(crate) fn new(title: String) -> Self {
        Self {
            title,
            x_cols: None,
            y_cols: None,
            mode: Mode::default(),
            nbins: DEFAULT_NBINS,
            quantile: DEFAULT_QUANTILE,
            dual_y: false,
            size: OutputSize::default(),
        }
    }

    #[inline]
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }
    /// `None` or an empty list means "first column".
    #[inline]
    pub fn x_cols(mut self, cols: Option<Vec<String>>) -> Self {
        self.x_cols = cols.filter(|c| !c.is_empty());
        self
    }
    /// `None` or an empty list means "second column, if any".
    #[inline]
    pub fn y_cols(mut self, cols: Option<Vec<String>>) -> Self {
        self.y_cols = cols.filter(|c| !c.is_empty());
        self
    }
    #[inline]
    pub fn mode(mut self, m: Mode) -> Self {
        self.mode = m;
        self
    }
    #[inline]
    pub fn nbins(mut self, n: usize) -> Self {
        self.nbins = n;
        self
    }
    #[inline]
    pub fn quantile(mut self, q: f64) -> Self {
        self.quantile = q;
        self
    }
    #[inline]
    pub fn dual_y(mut self, on: bool) -> Self {
        self.dual_y = on;
        self
    }
    #[inline]
    pub fn size(mut self, s: OutputSize) -> Self {
        self.size = s;
        self
    }

    /// Resolve default columns against `data` and validate the combination.
    ///
    /// Checks run in a fixed order: missing columns, multi-x with multi-y,
    /// dual axis count, missing y, bin count, quantile range.
    pub fn build(self, data: &Dataset) -> Result<Config, GraphError> {
        let mut names = data.names();
        let first = names.next();
        let second = names.next();

        let x_cols = match self.x_cols {
            Some(c) => c,
            None => vec![first.ok_or(GraphError::EmptyData)?.to_owned()],
        };
        let y_cols = match self.y_cols {
            Some(c) => c,
            None => second.map(str::to_owned).into_iter().collect(),
        };

        let requested: Vec<&str> = x_cols.iter().chain(&y_cols).map(String::as_str).collect();
        data.require_all(&requested)?;

        if x_cols.len() >= 2 && y_cols.len() >= 2 {
            return Err(ConfigError::MultipleXWithMultipleY.into());
        }
        if self.dual_y && y_cols.len() != 2 {
            return Err(ConfigError::DualAxisNeedsTwo(y_cols.len()).into());
        }
        if self.mode.needs_y() && y_cols.is_empty() {
            return Err(ConfigError::NoYColumn.into());
        }
        if self.nbins == 0 {
            return Err(ConfigError::ZeroBins.into());
        }
        if !(0.0..=100.0).contains(&self.quantile) {
            return Err(ConfigError::QuantileOutOfRange(self.quantile).into());
        }

        Ok(Config {
            title: self.title,
            x_cols,
            y_cols,
            mode: self.mode,
            nbins: self.nbins,
            quantile: self.quantile,
            dual_y: self.dual_y,
            size: self.size,
        })
    }
}
