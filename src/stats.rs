//! Trend and volatility estimators
//!
//! Pure functions over a sample window. The trend estimator is an ordinary
//! least-squares fit of value against elapsed seconds since the window start;
//! the volatility estimator is the coefficient of variation of the values.

use crate::types::{FitResult, SampleWindow};
use crate::{ForesightError, Result};

/// Fit a least-squares line through the window
///
/// The x axis is seconds elapsed since the first sample, so the slope is in
/// value units per second and the intercept is the fitted value at the window
/// start. Fails with `DegenerateWindow` when the timestamps carry no variance.
pub fn fit_linear(window: &SampleWindow) -> Result<FitResult> {
    let n = window.len();
    if n < 2 {
        return Err(ForesightError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let xs = window.elapsed_seconds();
    let ys = window.values();
    let n_f = n as f64;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (x, y) in xs.iter().zip(ys.iter()) {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }

    let x_variance = n_f * sum_x2 - sum_x * sum_x;
    if x_variance.abs() < f64::EPSILON {
        return Err(ForesightError::DegenerateWindow(format!(
            "no time variance across {n} samples"
        )));
    }

    let slope = (n_f * sum_xy - sum_x * sum_y) / x_variance;
    let intercept = (sum_y - slope * sum_x) / n_f;

    // Constant values fit exactly but carry no correlation signal.
    let y_variance = n_f * sum_y2 - sum_y * sum_y;
    let correlation = if y_variance.abs() < f64::EPSILON {
        0.0
    } else {
        (n_f * sum_xy - sum_x * sum_y) / (x_variance * y_variance).sqrt()
    };

    Ok(FitResult {
        slope,
        intercept,
        correlation,
        sample_count: n,
    })
}

/// Coefficient of variation of the window's values
///
/// Population standard deviation over the mean. A zero mean (and an empty
/// window) yields `+infinity`, which the model selector reads as "highly
/// volatile"; the value itself never reaches a caller-facing result.
pub fn coefficient_of_variation(window: &SampleWindow) -> f64 {
    let values = window.values();
    if values.is_empty() {
        return f64::INFINITY;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return f64::INFINITY;
    }

    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    variance.sqrt() / mean.abs()
}
