//! Reduction of raw samples to mean and standard deviation.

/// Arithmetic mean and sample (N-1) standard deviation of `samples`.
///
/// The standard deviation is zero for fewer than two samples. The mean of no samples is NaN. A
/// NaN sample propagates into both values.
pub fn mean_std(samples: &[f64]) -> (f64, f64) {
    let n = samples.len();
    if n == 0 {
        return (f64::NAN, 0.0);
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }
    let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, var.sqrt())
}
