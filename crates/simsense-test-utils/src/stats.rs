//! Sample statistics for checking noise models.

/// Arithmetic mean. `0.0` for an empty slice.
pub fn mean(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&x| f64::from(x)).sum::<f64>() / samples.len() as f64
}

/// Unbiased sample variance. `0.0` for fewer than two samples.
pub fn variance(samples: &[f32]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let m = mean(samples);
    let sum_sq: f64 = samples
        .iter()
        .map(|&x| {
            let d = f64::from(x) - m;
            d * d
        })
        .sum();
    sum_sq / (samples.len() - 1) as f64
}

/// `true` if `actual` is within `rel` relative tolerance of `expected`.
pub fn within_relative(actual: f64, expected: f64, rel: f64) -> bool {
    (actual - expected).abs() <= rel * expected.abs()
}
