//! Data model, ingestion, statistics and run configuration.

pub mod bounds;
pub mod color;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod ingest;
pub mod size;
pub mod stats;

// short paths for the common types
pub use bounds::Axis;
pub use config::{Config, ConfigBuilder, Mode};
pub use constants::{DEFAULT_NBINS, DEFAULT_QUANTILE};
pub use data::{Column, Dataset, Kind, Point};
pub use error::{ConfigError, GraphError};
pub use ingest::{Source, load};
pub use size::OutputSize;
