//! Axis ranges for the chart.

use crate::core::data::Point;

/// Fraction of the span added above and below the y data.
const Y_PAD: f64 = 0.05;

/// Horizontal or value axis.
#[derive(Clone, Copy, Debug)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Inclusive bounds over the drawable points.
    ///
    /// * Y bounds include error bars.
    /// * If there are no finite points the fallback is `(0.0, 1.0)`.
    /// * Identical points widen to +-0.5 around the value.
    #[must_use]
    pub fn bounds<'a>(self, points: impl IntoIterator<Item = &'a Point>) -> (f64, f64) {
        let (mut low, mut high) = (f64::INFINITY, f64::NEG_INFINITY);

        for p in points.into_iter().filter(|p| p.is_finite()) {
            let (lo, hi) = match self {
                Self::X => (p.x, p.x),
                Self::Y => p.y_extent(),
            };
            low = low.min(lo);
            high = high.max(hi);
        }

        // nothing drawable
        if !low.is_finite() || !high.is_finite() {
            return (0.0, 1.0);
        }

        // flat series
        if (high - low).abs() < f64::EPSILON {
            return (low - 0.5, high + 0.5);
        }

        (low, high)
    }

    /// [`Axis::bounds`] with headroom on the value axis.
    #[must_use]
    pub fn padded_bounds<'a>(self, points: impl IntoIterator<Item = &'a Point>) -> (f64, f64) {
        let pad = matches!(self, Self::Y);
        let (low, high) = self.bounds(points);
        if pad {
            let d = (high - low) * Y_PAD;
            (low - d, high + d)
        } else {
            (low, high)
        }
    }
}
