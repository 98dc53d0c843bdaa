//! PNG rendering of a [`Figure`] through plotters.
//!
//! Text needs a system font. When none can be loaded the chart is drawn a
//! second time without caption, tick labels or legend, so a headless box
//! still gets an image.

use std::{fs, path::Path};

use plotters::{coord::Shift, prelude::*};
use plotters_backend::DrawingErrorKind;
use tracing::{debug, warn};

use crate::{
    core::{
        bounds::Axis,
        color::{BACKGROUND, GRID, series_color},
        constants::{
            CAPTION_FONT, ERROR_BAR_WIDTH, LABEL_FONT, LEGEND_SAMPLE, MARGIN, MARKER_RADIUS,
            STROKE_WIDTH, X_LABEL_AREA, Y_LABEL_AREA,
        },
        data::format_timestamp,
        error::GraphError,
        size::OutputSize,
    },
    render::figure::{Figure, YAxis},
};

const FONT: &str = "sans-serif";

type BitMapError = <BitMapBackend<'static> as DrawingBackend>::ErrorType;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Labels {
    Shown,
    Hidden,
}

/// Render `fig` and return the encoded PNG.
pub fn render_png(fig: &Figure, size: &OutputSize) -> Result<Vec<u8>, GraphError> {
    let tmp = tempfile::Builder::new()
        .prefix("qd-")
        .suffix(".png")
        .tempfile()?;
    write_png(tmp.path(), fig, size)?;
    Ok(fs::read(tmp.path())?)
}

/// Render `fig` into a PNG file at `path`.
pub fn write_png(path: &Path, fig: &Figure, size: &OutputSize) -> Result<(), GraphError> {
    let (w, h) = size.pixels();
    debug!(w, h, series = fig.series.len(), "rendering");

    match draw_file(path, fig, size, Labels::Shown) {
        Err(DrawingAreaErrorKind::BackendError(DrawingErrorKind::FontError(e))) => {
            warn!(error = %e, "no usable font, drawing without text");
            draw_file(path, fig, size, Labels::Hidden).map_err(render_error)
        }
        other => other.map_err(render_error),
    }
}

fn draw_file(
    path: &Path,
    fig: &Figure,
    size: &OutputSize,
    labels: Labels,
) -> Result<(), DrawingAreaErrorKind<BitMapError>> {
    let root = BitMapBackend::new(path, size.pixels()).into_drawing_area();
    plot(&root, fig, size, labels)?;
    root.present()
}

fn plot<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    fig: &Figure,
    size: &OutputSize,
    labels: Labels,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = Axis::X.bounds(fig.points());
    let (y_lo, y_hi) = Axis::Y.padded_bounds(fig.points_on(YAxis::Left));
    let (y2_lo, y2_hi) = Axis::Y.padded_bounds(fig.points_on(YAxis::Right));

    let shown = labels == Labels::Shown;
    let area = |v| if shown { size.px(v) } else { 0 };

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(size.px(MARGIN))
        .x_label_area_size(area(X_LABEL_AREA))
        .y_label_area_size(area(Y_LABEL_AREA));
    if fig.dual_y() {
        builder.right_y_label_area_size(area(Y_LABEL_AREA));
    }
    if shown {
        builder.caption(&fig.title, (FONT, size.pt(CAPTION_FONT)).into_font());
    }
    let mut chart = builder
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?
        .set_secondary_coord(x_lo..x_hi, y2_lo..y2_hi);

    chart.plotting_area().fill(&BACKGROUND)?;

    let temporal_label = |v: &f64| format_timestamp(*v);
    if shown {
        {
            let mut mesh = chart.configure_mesh();
            mesh.x_desc(fig.x_label.as_str())
                .y_desc(fig.y_label.as_str())
                .label_style((FONT, size.pt(LABEL_FONT)).into_font())
                .axis_desc_style((FONT, size.pt(LABEL_FONT)).into_font())
                .bold_line_style(&GRID)
                .light_line_style(&GRID.mix(0.5));
            if fig.x_temporal {
                mesh.x_label_formatter(&temporal_label);
            }
            mesh.draw()?;
        }

        if let Some(y2) = &fig.y2_label {
            chart
                .configure_secondary_axes()
                .y_desc(y2.as_str())
                .label_style((FONT, size.pt(LABEL_FONT)).into_font())
                .axis_desc_style((FONT, size.pt(LABEL_FONT)).into_font())
                .draw()?;
        }
    }

    let stroke = size.px(STROKE_WIDTH);
    let radius = size.px(MARKER_RADIUS);
    let bar_width = size.px(ERROR_BAR_WIDTH);
    let sample = i32::try_from(size.px(LEGEND_SAMPLE)).unwrap_or(i32::MAX);

    for (i, s) in fig.series.iter().enumerate() {
        let color = series_color(i);
        let right = s.axis == YAxis::Right;

        for (n, seg) in s.segments().into_iter().enumerate() {
            let line = LineSeries::new(seg.iter().copied(), color.stroke_width(stroke));
            let anno = if right {
                chart.draw_secondary_series(line)?
            } else {
                chart.draw_series(line)?
            };
            if n == 0 {
                anno.label(s.name.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + sample, y)], color.stroke_width(stroke))
                });
            }

            if fig.markers {
                let dots = seg
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), radius, color.filled()));
                if right {
                    chart.draw_secondary_series(dots)?;
                } else {
                    chart.draw_series(dots)?;
                }
            }
        }

        if s.has_errors() {
            let bars = s.points.iter().filter(|p| p.is_finite()).filter_map(|p| {
                let e = p.err.filter(|e| e.is_finite())?.abs();
                Some(ErrorBar::new_vertical(
                    p.x,
                    p.y - e,
                    p.y,
                    p.y + e,
                    color.stroke_width(stroke.div_ceil(2)),
                    bar_width,
                ))
            });
            if right {
                chart.draw_secondary_series(bars)?;
            } else {
                chart.draw_series(bars)?;
            }
        }
    }

    if shown && fig.series.len() > 1 {
        chart
            .configure_series_labels()
            .label_font((FONT, size.pt(LABEL_FONT)).into_font())
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }
    Ok(())
}

fn render_error<E>(e: DrawingAreaErrorKind<E>) -> GraphError
where
    E: std::error::Error + Send + Sync,
{
    GraphError::Render(e.to_string())
}
