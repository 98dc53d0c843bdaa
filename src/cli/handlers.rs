use std::{
    fs,
    io::{self, Write},
    time::Instant,
};

use tracing::{debug, info};

use crate::{
    core::{config::Config, error::GraphError, ingest::Source},
    render::{Figure, render_png},
};

use super::{parse::Cli, viewer};

/// Load, validate, bin, render, then deliver the PNG.
///
/// Every check runs before the destination is touched, so a failed run never
/// leaves a file behind.
pub fn plot(cli: Cli) -> Result<(), GraphError> {
    let t_ingest = Instant::now();
    let source = Source::from_arg(&cli.input);
    let data = source.load()?;
    let dur_ingest = t_ingest.elapsed().as_micros();

    let mode = cli.mode();
    let cfg = Config::builder(cli.title.unwrap_or_else(|| source.name()))
        .x_cols(cli.x_cols)
        .y_cols(cli.y_cols)
        .mode(mode)
        .nbins(cli.nbins)
        .quantile(cli.quantile)
        .dual_y(cli.dualy)
        .size(cli.size)
        .build(&data)?;

    let t_bin = Instant::now();
    let fig = Figure::build(&data, &cfg)?;
    let dur_bin = t_bin.elapsed().as_micros();

    let t_render = Instant::now();
    let png = render_png(&fig, &cfg.size)?;
    let dur_render = t_render.elapsed().as_micros();

    debug!(
        rows = data.len(),
        ingest_us = dur_ingest,
        figure_us = dur_bin,
        render_us = dur_render,
        bytes = png.len(),
        "timings"
    );

    if cli.gui {
        let path = viewer::show(&png)?;
        info!(path = %path.display(), "opened in viewer");
        return Ok(());
    }
    match cli.output {
        Some(path) => fs::write(&path, &png)?,
        None => {
            let mut out = io::stdout().lock();
            out.write_all(&png)?;
            out.flush()?;
        }
    }
    Ok(())
}
