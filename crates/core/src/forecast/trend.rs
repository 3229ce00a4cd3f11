use serde::{Deserialize, Serialize};

/// Ordinary least-squares line over a series indexed `0..n`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Residual standard deviation, never negative.
    pub std_dev: f64,
}

impl RegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits `y = slope * x + intercept` using the closed-form OLS sums.
///
/// When the denominator `nΣx² - (Σx)²` is zero (fewer than two points) the fit
/// degrades to a flat line at the series mean. Residual spread uses
/// `max(n - 2, 1)` degrees of freedom.
pub fn linear_regression(values: &[f64]) -> RegressionResult {
    let n = values.len() as f64;
    if values.is_empty() {
        return RegressionResult::default();
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (index, y) in values.iter().enumerate() {
        let x = index as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    let (slope, intercept) = if denominator == 0.0 {
        (0.0, sum_y / n)
    } else {
        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        (slope, (sum_y - slope * sum_x) / n)
    };

    let squared_residuals: f64 = values
        .iter()
        .enumerate()
        .map(|(index, y)| {
            let residual = y - (slope * index as f64 + intercept);
            residual * residual
        })
        .sum();
    let degrees_of_freedom = (values.len().saturating_sub(2)).max(1) as f64;
    let std_dev = (squared_residuals / degrees_of_freedom).max(0.0).sqrt();

    RegressionResult { slope, intercept, std_dev }
}
