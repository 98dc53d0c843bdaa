//! `qd`: quick PNG charts from CSV or JSON lines.

pub mod cli;
pub mod core;
pub mod render;

pub use crate::core::{
    config::{Config, ConfigBuilder, Mode},
    data::{Column, Dataset, Kind, Point},
    error::{ConfigError, GraphError},
    ingest::{Source, load},
    size::OutputSize,
};

pub use crate::render::{Binner, Figure, Strategy, render_png};

/// Build and render a chart for an in-memory data set in one call.
pub fn plot_to_png(data: &Dataset, cfg: &Config) -> Result<Vec<u8>, GraphError> {
    let fig = Figure::build(data, cfg)?;
    render_png(&fig, &cfg.size)
}
