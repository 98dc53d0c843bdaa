//! Descriptive statistics over already-filtered (non-null) samples.
//!
//! Undefined results are `NaN`, never a panic.

/// Arithmetic mean; `NaN` when empty.
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); `NaN` when n <= 1.
#[allow(clippy::cast_precision_loss)]
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Standard error of the mean: `sample_std / sqrt(n)`.
#[allow(clippy::cast_precision_loss)]
pub fn sem(values: &[f64]) -> f64 {
    sample_std(values) / (values.len() as f64).sqrt()
}

/// Quantile `q` in `[0, 1]`, linearly interpolated between order statistics.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Poisson counting error of a bin.
#[inline]
#[allow(clippy::cast_precision_loss)]
pub fn counting_error(count: usize) -> f64 {
    (count as f64).sqrt()
}
