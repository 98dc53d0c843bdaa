//! Equal-width binning over a numeric or temporal column.
//!
//! * Strategy::Numeric  - N equal-width intervals over [min, max]
//! * Strategy::Temporal - N equal-duration buckets from the first timestamp
//!
//! Call pattern:
//! ```rust
//! # use quickdraw::{core::ingest::load, render::Binner};
//! let data = load("x,y\n0,1\n1,2\n2,3\n".as_bytes()).unwrap();
//! let binning = Binner::new(2).partition(&data, "x").unwrap();
//! let ys = data.column("y").unwrap().numeric_values().unwrap();
//! for agg in binning.aggregate(ys, 0.5) {
//!     println!("{} {} ± {}", agg.x, agg.mean, agg.sem);
//! }
//! ```
//!
//! Every bin is half-open `[lo, hi)` except the last, which also holds `hi`,
//! so the column maximum is always counted.

use crate::core::{
    constants::{DEGENERATE_NUMERIC_PAD, DEGENERATE_TEMPORAL_PAD_SECS},
    data::{Column, Dataset, Kind},
    error::GraphError,
    stats,
};

/// Selectable algorithm, decided by the column kind.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Strategy {
    #[default]
    Numeric,
    Temporal,
}

impl Strategy {
    /// Up-front probe: numeric first, temporal as the fallback.
    pub fn probe(column: &Column) -> Result<Self, GraphError> {
        match column.kind() {
            Kind::Numeric => Ok(Self::Numeric),
            Kind::Temporal => Ok(Self::Temporal),
            Kind::Text => Err(GraphError::Unbinnable(column.name().to_owned())),
        }
    }
}

/// Domain and bin count for one column.
#[derive(Clone, Debug, PartialEq)]
pub struct BinSpec {
    pub column: String,
    pub nbins: usize,
    pub strategy: Strategy,
    pub lo: f64,
    pub hi: f64,
}

impl BinSpec {
    /// Probe the column and measure its domain.
    ///
    /// A constant column is widened symmetrically before cutting so there are
    /// still `nbins` bins of non-zero width.
    pub fn probe(column: &Column, nbins: usize) -> Result<Self, GraphError> {
        let strategy = Strategy::probe(column)?;
        let values = column.axis_values()?;

        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for &v in values.iter().filter(|v| !v.is_nan()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return Err(GraphError::EmptyColumn(column.name().to_owned()));
        }

        if hi - lo == 0.0 {
            let pad = match strategy {
                Strategy::Numeric if lo == 0.0 => DEGENERATE_NUMERIC_PAD,
                Strategy::Numeric => lo.abs() * DEGENERATE_NUMERIC_PAD,
                Strategy::Temporal => DEGENERATE_TEMPORAL_PAD_SECS,
            };
            lo -= pad;
            hi += pad;
        }

        Ok(Self {
            column: column.name().to_owned(),
            nbins: nbins.max(1),
            strategy,
            lo,
            hi,
        })
    }

    /// Width (or duration, in seconds) of one bin.
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub fn width(&self) -> f64 {
        (self.hi - self.lo) / self.nbins as f64
    }

    /// Bin holding `v`; `None` for null cells.
    #[inline]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn index_of(&self, v: f64) -> Option<usize> {
        if v.is_nan() {
            return None;
        }
        let last = self.nbins - 1;
        let mut i = (((v - self.lo) / self.width()).floor().max(0.0) as usize).min(last);
        // the division can round across an edge; settle on the bin whose
        // own edges hold `v`
        while i > 0 && v < self.edges(i).0 {
            i -= 1;
        }
        while i < last && v >= self.edges(i).1 {
            i += 1;
        }
        Some(i)
    }

    /// Nominal `[lo, hi)` of bin `i`.
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub fn edges(&self, i: usize) -> (f64, f64) {
        let w = self.width();
        let lo = self.lo + w * i as f64;
        let hi = if i + 1 == self.nbins {
            self.hi
        } else {
            self.lo + w * (i + 1) as f64
        };
        (lo, hi)
    }
}

/// One interval and the rows that fell in it.
#[derive(Clone, Debug, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    /// Representative x used when plotting.
    pub x: f64,
    pub rows: Vec<usize>,
}

impl Bin {
    #[inline]
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// Per-bin reduction of one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinAggregate {
    pub x: f64,
    /// Non-null values of the reduced column in this bin.
    pub count: usize,
    pub mean: f64,
    /// Standard error of the mean; `NaN` when `count <= 1`.
    pub sem: f64,
    pub quantile: f64,
}

impl BinAggregate {
    /// `sqrt(count)`
    #[inline]
    pub fn counting_error(&self) -> f64 {
        stats::counting_error(self.count)
    }
}

/// Result of cutting one column.
#[derive(Clone, Debug)]
pub struct Binning {
    pub spec: BinSpec,
    pub bins: Vec<Bin>,
}

impl Binning {
    /// Reduce `values` (row-aligned with the binned column) bin by bin.
    ///
    /// `q` is a fraction in `[0, 1]`. Null values are skipped.
    pub fn aggregate(&self, values: &[f64], q: f64) -> Vec<BinAggregate> {
        let mut scratch = Vec::new();
        self.bins
            .iter()
            .map(|b| {
                scratch.clear();
                scratch.extend(
                    b.rows
                        .iter()
                        .filter_map(|&r| values.get(r).copied())
                        .filter(|v| !v.is_nan()),
                );
                BinAggregate {
                    x: b.x,
                    count: scratch.len(),
                    mean: stats::mean(&scratch),
                    sem: stats::sem(&scratch),
                    quantile: stats::quantile(&scratch, q),
                }
            })
            .collect()
    }

    /// Row count per bin with its counting error: `(x, count, sqrt(count))`.
    pub fn histogram(&self) -> Vec<(f64, usize, f64)> {
        self.bins
            .iter()
            .map(|b| (b.x, b.count(), stats::counting_error(b.count())))
            .collect()
    }

    /// Rows placed in any bin.
    pub fn total(&self) -> usize {
        self.bins.iter().map(Bin::count).sum()
    }
}

/// Stateless binning engine; every call recomputes from scratch.
#[derive(Clone, Copy, Debug)]
pub struct Binner {
    nbins: usize,
}

impl Binner {
    #[inline]
    pub fn new(nbins: usize) -> Self {
        Self { nbins }
    }

    /// Cut `column` of `data` into bins.
    pub fn partition(&self, data: &Dataset, column: &str) -> Result<Binning, GraphError> {
        let col = data.require(column)?;
        let spec = BinSpec::probe(col, self.nbins)?;
        let values = col.axis_values()?;
        Ok(Self::cut(spec, values))
    }

    /// Assign every value to its bin and pick representative x values.
    pub fn cut(spec: BinSpec, values: &[f64]) -> Binning {
        let mut bins: Vec<Bin> = (0..spec.nbins)
            .map(|i| {
                let (lo, hi) = spec.edges(i);
                Bin {
                    lo,
                    hi,
                    x: lo + (hi - lo) / 2.0,
                    rows: Vec::new(),
                }
            })
            .collect();

        for (row, &v) in values.iter().enumerate() {
            if let Some(i) = spec.index_of(v) {
                bins[i].rows.push(row);
            }
        }

        if spec.strategy == Strategy::Temporal {
            // midpoint of the observed extrema, not of the nominal bucket;
            // empty buckets keep the nominal midpoint
            for b in bins.iter_mut().filter(|b| !b.rows.is_empty()) {
                let (lo, hi) = b
                    .rows
                    .iter()
                    .map(|&r| values[r])
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(l, h), v| {
                        (l.min(v), h.max(v))
                    });
                b.x = lo + (hi - lo) / 2.0;
            }
        }

        Binning { spec, bins }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{Bin, BinSpec, Binner, Strategy};
    use crate::core::{
        data::{Cell, Column},
        error::GraphError,
        ingest::load,
    };

    fn numeric(values: &[f64]) -> Column {
        Column::from_cells(
            "v",
            values
                .iter()
                .map(|&v| if v.is_nan() { Cell::Null } else { Cell::Number(v) })
                .collect(),
        )
    }

    #[test]
    fn numeric_bins_are_equal_width_and_close_the_max() {
        let col = numeric(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let b = Binner::cut(BinSpec::probe(&col, 4).unwrap(), col.axis_values().unwrap());
        let counts: Vec<usize> = b.bins.iter().map(Bin::count).collect();
        assert_eq!(counts, [1, 1, 1, 2]);
        assert_eq!(b.bins[0].x, 0.5);
        assert_eq!(b.bins[3].hi, 4.0);
    }

    #[test]
    fn nulls_are_not_binned() {
        let col = numeric(&[0.0, f64::NAN, 10.0]);
        let b = Binner::cut(BinSpec::probe(&col, 3).unwrap(), col.axis_values().unwrap());
        assert_eq!(b.total(), 2);
        assert_eq!(b.bins[2].rows, [2]);
    }

    #[test]
    fn constant_column_is_widened() {
        let col = numeric(&[5.0, 5.0, 5.0]);
        let spec = BinSpec::probe(&col, 3).unwrap();
        assert!((spec.lo - 4.995).abs() < 1e-12);
        assert!((spec.hi - 5.005).abs() < 1e-12);
        let b = Binner::cut(spec, col.axis_values().unwrap());
        assert_eq!(b.bins[1].count(), 3);

        let zero = BinSpec::probe(&numeric(&[0.0, 0.0]), 2).unwrap();
        assert_eq!((zero.lo, zero.hi), (-0.001, 0.001));
    }

    #[test]
    fn text_and_empty_columns_are_rejected() {
        let text = Column::from_cells("s", vec![Cell::Text("a".into())]);
        assert!(matches!(BinSpec::probe(&text, 3), Err(GraphError::Unbinnable(_))));
        let empty = numeric(&[f64::NAN]);
        assert!(matches!(BinSpec::probe(&empty, 3), Err(GraphError::EmptyColumn(_))));
    }

    #[test]
    fn temporal_x_is_midpoint_of_observed_extrema() {
        let data = load(
            "t,v\n\
             2022-01-01T00:00:00,1\n\
             2022-01-01T00:00:10,2\n\
             2022-01-01T00:00:20,3\n\
             2022-01-01T00:01:00,4\n\
             2022-01-01T00:04:00,5\n"
                .as_bytes(),
        )
        .unwrap();
        let b = Binner::new(2).partition(&data, "t").unwrap();
        assert_eq!(b.spec.strategy, Strategy::Temporal);
        assert_eq!(b.spec.width(), 120.0);
        let t0 = b.spec.lo;
        assert_eq!(b.bins[0].rows, [0, 1, 2, 3]);
        assert_eq!(b.bins[0].x - t0, 30.0);
        assert_eq!(b.bins[1].x - t0, 240.0);

        let v = data.column("v").unwrap().numeric_values().unwrap();
        let agg = b.aggregate(v, 0.5);
        assert_eq!(agg[0].mean, 2.5);
        assert!(agg[1].sem.is_nan());
    }

    #[test]
    fn empty_temporal_bucket_keeps_nominal_midpoint() {
        let data = load("t\n2022-01-01T00:00:00\n2022-01-01T00:00:30\n".as_bytes()).unwrap();
        let b = Binner::new(3).partition(&data, "t").unwrap();
        assert_eq!(b.bins[1].count(), 0);
        assert_eq!(b.bins[1].x - b.spec.lo, 15.0);
        assert_eq!(b.histogram()[1], (b.bins[1].x, 0, 0.0));
    }

    #[test]
    fn aggregate_reports_all_statistics() {
        let data = load("x,y\n0,1\n0.1,3\n0.2,\n1,10\n".as_bytes()).unwrap();
        let b = Binner::new(2).partition(&data, "x").unwrap();
        let y = data.column("y").unwrap().numeric_values().unwrap();
        let agg = b.aggregate(y, 0.5);
        assert_eq!(agg[0].count, 2);
        assert_eq!(agg[0].mean, 2.0);
        assert!((agg[0].sem - 1.0).abs() < 1e-12);
        assert_eq!(agg[0].quantile, 2.0);
        assert_eq!(agg[0].counting_error(), 2f64.sqrt());
        assert_eq!(agg[1].count, 1);
        assert!(agg[1].sem.is_nan());
    }

    #[test]
    fn index_agrees_with_edges_at_rounding_boundaries() {
        let values: Vec<f64> = (0..=24).map(|k| f64::from(k) * 0.1).collect();
        let spec = BinSpec::probe(&numeric(&values), 24).unwrap();
        for &v in &values {
            let i = spec.index_of(v).unwrap();
            let (lo, hi) = spec.edges(i);
            assert!(lo <= v && (i == 23 || v < hi), "{v} in bin {i} [{lo}, {hi})");
        }
        assert_eq!(spec.index_of(f64::NAN), None);
    }

    #[test]
    fn missing_column_is_reported() {
        let data = load("x,y\n0,1\n".as_bytes()).unwrap();
        assert!(matches!(
            Binner::new(3).partition(&data, "zzz"),
            Err(GraphError::MissingColumns { .. })
        ));
    }

    proptest! {
        #[test]
        fn n_bins_span_the_domain_and_keep_every_row(
            values in prop::collection::vec(-1e6f64..1e6, 1..200),
            nbins in 1usize..100,
        ) {
            let col = numeric(&values);
            let b = Binner::cut(BinSpec::probe(&col, nbins).unwrap(), col.axis_values().unwrap());
            prop_assert_eq!(b.bins.len(), nbins);
            prop_assert_eq!(b.total(), values.len());

            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if min < max {
                prop_assert_eq!(b.bins[0].lo, min);
                prop_assert_eq!(b.bins[nbins - 1].hi, max);
            } else {
                prop_assert!(b.bins[0].lo <= min && b.bins[nbins - 1].hi >= max);
            }
            for w in b.bins.windows(2) {
                prop_assert!(w[0].lo <= w[1].lo);
            }
        }

        #[test]
        fn every_row_lies_within_its_bin_edges(
            steps in prop::collection::vec(0u32..500, 2..100),
            scale in prop::sample::select(vec![0.1, 0.3, 0.01, 1.0 / 3.0]),
            nbins in 1usize..200,
        ) {
            let values: Vec<f64> = steps.iter().map(|&k| f64::from(k) * scale).collect();
            let col = numeric(&values);
            let b = Binner::cut(BinSpec::probe(&col, nbins).unwrap(), col.axis_values().unwrap());
            for (i, bin) in b.bins.iter().enumerate() {
                let last = i + 1 == nbins;
                for &r in &bin.rows {
                    let v = values[r];
                    prop_assert!(bin.lo <= v, "bin {} lo {} > {}", i, bin.lo, v);
                    prop_assert!(last || v < bin.hi, "bin {} hi {} <= {}", i, bin.hi, v);
                }
            }
        }

        #[test]
        fn mean_plus_minus_sem_brackets_sample_mean(
            pairs in prop::collection::vec((0f64..100.0, -1e3f64..1e3), 2..200),
            nbins in 1usize..20,
        ) {
            let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
            let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
            let col = numeric(&xs);
            let b = Binner::cut(BinSpec::probe(&col, nbins).unwrap(), col.axis_values().unwrap());
            for (bin, agg) in b.bins.iter().zip(b.aggregate(&ys, 0.5)) {
                if bin.count() < 2 {
                    continue;
                }
                let own: f64 = bin.rows.iter().map(|&r| ys[r]).sum::<f64>() / bin.count() as f64;
                let tol = 1e-9 * own.abs().max(1.0);
                prop_assert!(agg.mean - agg.sem <= own + tol);
                prop_assert!(agg.mean + agg.sem >= own - tol);
            }
        }

        #[test]
        fn histogram_error_is_root_count(
            values in prop::collection::vec(-50f64..50.0, 1..300),
            nbins in 1usize..40,
        ) {
            let col = numeric(&values);
            let b = Binner::cut(BinSpec::probe(&col, nbins).unwrap(), col.axis_values().unwrap());
            for (_, count, err) in b.histogram() {
                prop_assert_eq!(err, (count as f64).sqrt());
            }
        }
    }
}
