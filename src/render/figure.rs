//! Chart model: series of points per mode, ready for drawing.

use tracing::debug;

use crate::{
    core::{
        config::{Config, Mode},
        data::{Dataset, Kind, Point},
        error::{ConfigError, GraphError},
    },
    render::binner::{Binner, Strategy},
};

/// Which value axis a series is scaled against.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum YAxis {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
    pub axis: YAxis,
}

impl Series {
    fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            points,
            axis: YAxis::Left,
        }
    }

    /// Runs of consecutive drawable points; a non-finite point breaks the line.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut out = Vec::new();
        let mut run = Vec::new();
        for p in &self.points {
            if p.is_finite() {
                run.push((p.x, p.y));
            } else if !run.is_empty() {
                out.push(std::mem::take(&mut run));
            }
        }
        if !run.is_empty() {
            out.push(run);
        }
        out
    }

    /// Has at least one error bar worth drawing.
    pub fn has_errors(&self) -> bool {
        self.points
            .iter()
            .any(|p| p.is_finite() && p.err.is_some_and(f64::is_finite))
    }
}

/// Everything the renderer needs, no data set attached.
#[derive(Clone, Debug)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    /// x values are epoch seconds.
    pub x_temporal: bool,
    pub y_label: String,
    /// Set when a series lives on the right-hand axis.
    pub y2_label: Option<String>,
    pub series: Vec<Series>,
    /// Mark every vertex (binned modes) rather than only drawing lines.
    pub markers: bool,
}

impl Figure {
    /// Build the series for the configured mode.
    pub fn build(data: &Dataset, cfg: &Config) -> Result<Self, GraphError> {
        let x = cfg.x_cols.first().ok_or(GraphError::EmptyData)?;
        let x_temporal = data.require(x)?.kind() == Kind::Temporal;

        let mut fig = match cfg.mode {
            Mode::Line => Self::line(data, cfg)?,
            Mode::Mean | Mode::Quant => Self::binned(data, cfg)?,
            Mode::Hist => Self::histogram(data, cfg)?,
        };
        fig.x_temporal = x_temporal;

        if cfg.dual_y {
            if let Some(second) = fig.series.get_mut(1) {
                second.axis = YAxis::Right;
                fig.y2_label = Some(second.name.clone());
            }
        }
        debug!(
            mode = ?cfg.mode,
            series = fig.series.len(),
            points = fig.series.iter().map(|s| s.points.len()).sum::<usize>(),
            "figure built"
        );
        Ok(fig)
    }

    fn empty(cfg: &Config, x_label: &str, y_label: &str) -> Self {
        Self {
            title: cfg.title.clone(),
            x_label: x_label.to_owned(),
            x_temporal: false,
            y_label: y_label.to_owned(),
            y2_label: None,
            series: Vec::new(),
            markers: false,
        }
    }

    /// One point per record, no aggregation.
    fn line(data: &Dataset, cfg: &Config) -> Result<Self, GraphError> {
        let x = cfg.x_cols.first().ok_or(GraphError::EmptyData)?;
        let xs = data.require(x)?.axis_values()?;
        let mut fig = Self::empty(cfg, x, first_y(cfg)?);
        for y in &cfg.y_cols {
            let ys = data.require(y)?.numeric_values()?;
            let points = xs.iter().zip(ys).map(|(&x, &y)| Point::new(x, y)).collect();
            fig.series.push(Series::new(y.as_str(), points));
        }
        Ok(fig)
    }

    /// Per-bin mean with SEM error bars, or per-bin quantile.
    fn binned(data: &Dataset, cfg: &Config) -> Result<Self, GraphError> {
        let x = cfg.x_cols.first().ok_or(GraphError::EmptyData)?;
        let binning = Binner::new(cfg.nbins).partition(data, x)?;
        debug!(
            column = %x,
            strategy = ?binning.spec.strategy,
            width = binning.spec.width(),
            "binned"
        );

        let mut fig = Self::empty(cfg, x, first_y(cfg)?);
        fig.markers = true;
        let q = cfg.quantile_fraction();
        for y in &cfg.y_cols {
            let ys = data.require(y)?.numeric_values()?;
            let points = binning
                .aggregate(ys, q)
                .into_iter()
                .map(|a| match cfg.mode {
                    Mode::Quant => Point::new(a.x, a.quantile),
                    _ => Point::with_err(a.x, a.mean, a.sem),
                })
                .collect();
            fig.series.push(Series::new(y.as_str(), points));
        }
        Ok(fig)
    }

    /// Counts per bin with `sqrt(count)` error bars, each x-column on its own
    /// binning.
    fn histogram(data: &Dataset, cfg: &Config) -> Result<Self, GraphError> {
        let x_label = cfg.x_cols.join(", ");
        let mut fig = Self::empty(cfg, &x_label, "count");
        fig.markers = true;
        for x in &cfg.x_cols {
            let binning = Binner::new(cfg.nbins).partition(data, x)?;
            if binning.spec.strategy == Strategy::Temporal {
                debug!(column = %x, "histogram over time buckets");
            }
            #[allow(clippy::cast_precision_loss)]
            let points = binning
                .histogram()
                .into_iter()
                .map(|(bx, count, err)| Point::with_err(bx, count as f64, err))
                .collect();
            fig.series.push(Series::new(x.as_str(), points));
        }
        Ok(fig)
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.series.iter().flat_map(|s| s.points.iter())
    }

    pub fn points_on(&self, axis: YAxis) -> impl Iterator<Item = &Point> {
        self.series
            .iter()
            .filter(move |s| s.axis == axis)
            .flat_map(|s| s.points.iter())
    }

    #[inline]
    pub fn dual_y(&self) -> bool {
        self.y2_label.is_some()
    }
}

fn first_y(cfg: &Config) -> Result<&str, GraphError> {
    cfg.y_cols
        .first()
        .map(String::as_str)
        .ok_or(ConfigError::NoYColumn.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ingest::load;

    const TRIG: &str = "x,cos,sin\n0,1,0\n1,0.5,0.8\n2,-0.4,0.9\n3,-1,0.1\n";

    fn cfg(data: &Dataset, mode: Mode, y: &[&str]) -> Config {
        Config::builder("trig")
            .mode(mode)
            .nbins(2)
            .y_cols(Some(y.iter().map(|&s| s.to_owned()).collect()))
            .build(data)
            .unwrap()
    }

    #[test]
    fn line_passes_records_through() {
        let data = load(TRIG.as_bytes()).unwrap();
        let fig = Figure::build(&data, &cfg(&data, Mode::Line, &["cos", "sin"])).unwrap();
        assert_eq!(fig.series.len(), 2);
        assert_eq!(fig.series[1].points[1], Point::new(1.0, 0.8));
        assert!(!fig.markers);
        assert!(!fig.dual_y());
    }

    #[test]
    fn mean_has_sem_error_bars() {
        let data = load(TRIG.as_bytes()).unwrap();
        let fig = Figure::build(&data, &cfg(&data, Mode::Mean, &["cos"])).unwrap();
        let p = fig.series[0].points[0];
        assert_eq!(p.x, 0.75);
        assert_eq!(p.y, 0.75);
        assert!((p.err.unwrap() - 0.25).abs() < 1e-12);
        assert!(fig.series[0].has_errors());
    }

    #[test]
    fn quant_has_no_error_bars() {
        let data = load(TRIG.as_bytes()).unwrap();
        let fig = Figure::build(&data, &cfg(&data, Mode::Quant, &["sin"])).unwrap();
        let p = fig.series[0].points[1];
        assert_eq!(p.x, 2.25);
        assert!((p.y - 0.5).abs() < 1e-12);
        assert!(!fig.series[0].has_errors());
    }

    #[test]
    fn histogram_bins_each_x_column_separately() {
        let data = load("gauss,expo\n0,10\n1,20\n1,30\n2,100\n".as_bytes()).unwrap();
        let cfg = Config::builder("d")
            .mode(Mode::Hist)
            .nbins(2)
            .x_cols(Some(vec!["gauss".into(), "expo".into()]))
            .build(&data)
            .unwrap();
        let fig = Figure::build(&data, &cfg).unwrap();
        assert_eq!(fig.series.len(), 2);
        let g: Vec<f64> = fig.series[0].points.iter().map(|p| p.y).collect();
        let e: Vec<f64> = fig.series[1].points.iter().map(|p| p.y).collect();
        assert_eq!(g, [1.0, 3.0]);
        assert_eq!(e, [3.0, 1.0]);
        assert_eq!(fig.series[1].points[0].x, 32.5);
        for p in fig.points() {
            assert_eq!(p.err, Some(p.y.sqrt()));
        }
        assert_eq!(fig.y_label, "count");
    }

    #[test]
    fn dual_axis_moves_second_series_right() {
        let data = load(TRIG.as_bytes()).unwrap();
        let cfg = Config::builder("trig")
            .y_cols(Some(vec!["cos".into(), "sin".into()]))
            .dual_y(true)
            .build(&data)
            .unwrap();
        let fig = Figure::build(&data, &cfg).unwrap();
        assert_eq!(fig.series[1].axis, YAxis::Right);
        assert_eq!(fig.y2_label.as_deref(), Some("sin"));
        assert_eq!(fig.points_on(YAxis::Left).count(), 4);
    }

    #[test]
    fn text_y_column_is_rejected() {
        let data = load("x,name\n0,a\n1,b\n".as_bytes()).unwrap();
        let err = Figure::build(&data, &cfg(&data, Mode::Line, &["name"])).unwrap_err();
        assert!(matches!(err, GraphError::NonNumeric(c) if c == "name"));
    }

    #[test]
    fn segments_break_at_gaps() {
        let s = Series::new(
            "s",
            vec![
                Point::new(0.0, 1.0),
                Point::new(1.0, f64::NAN),
                Point::new(2.0, 2.0),
                Point::new(3.0, 3.0),
            ],
        );
        assert_eq!(s.segments(), vec![vec![(0.0, 1.0)], vec![(2.0, 2.0), (3.0, 3.0)]]);
    }
}
