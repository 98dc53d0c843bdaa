pub mod binner;
pub mod chart;
pub mod figure;

pub use binner::{BinAggregate, BinSpec, Binner, Binning, Strategy};
pub use chart::{render_png, write_png};
pub use figure::{Figure, Series, YAxis};
