use serde::Serialize;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Mean and spread of the marks that define the relative curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CohortStats {
    pub count: usize,
    pub mean: f64,
    pub sd: f64,
}

impl CohortStats {
    pub fn from_marks(marks: &[f64]) -> Self {
        let mean = mean(marks);
        CohortStats {
            count: marks.len(),
            mean,
            sd: stddev(marks, mean),
        }
    }
}
