//! Centralised error types used across the crate.

use std::io;

use thiserror::Error;

/// Precise configuration faults, raised before any data is touched.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("more than 1 x-column is not supported when there are multiple y-columns")]
    MultipleXWithMultipleY,
    #[error("exactly 2 y-columns are required for dual y axes, got {0}")]
    DualAxisNeedsTwo(usize),
    #[error("no y-column to plot: the input has a single column")]
    NoYColumn,
    #[error("number of bins must be at least 1")]
    ZeroBins,
    #[error("quantile {0} is outside 0..=100")]
    QuantileOutOfRange(f64),
    #[error("invalid size `{text}`: {reason}")]
    InvalidSize { text: String, reason: &'static str },
}

/// Top-level error type bubbled up by public APIs.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {0}: expected a JSON object")]
    NotAnObject(usize),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("input is neither JSON lines nor delimited text")]
    UnrecognisedInput,
    #[error("columns: {missing} not in {available}")]
    MissingColumns { missing: String, available: String },
    #[error("column `{0}` is not numeric")]
    NonNumeric(String),
    #[error("column `{0}` is neither numeric nor temporal and cannot be binned")]
    Unbinnable(String),
    #[error("column `{0}` has no values")]
    EmptyColumn(String),
    #[error("column `{name}` has {got} rows, expected {want}")]
    RaggedColumn { name: String, got: usize, want: usize },
    #[error("data set is empty")]
    EmptyData,
    #[error("render failed: {0}")]
    Render(String),
    #[error("could not launch image viewer: {0}")]
    Viewer(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GraphError {
    /// Build [`GraphError::MissingColumns`] with the listing format users see.
    pub fn missing_columns<'a>(
        missing: &[&str],
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let missing = serde_json::to_string(missing).unwrap_or_default();
        let available: Vec<String> = available.into_iter().map(|c| format!("'{c}'")).collect();
        Self::MissingColumns {
            missing,
            available: format!("{{{}}}", available.join(", ")),
        }
    }
}
