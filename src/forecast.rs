//! The two forecasters: linear-trend projection and exponential smoothing
//!
//! Both are pure functions producing one [`Prediction`] per requested
//! horizon. The linear forecaster projects the fitted line forward with a
//! closed-form prediction interval; the smoothing forecaster damps noise into
//! a flat "last good estimate" with no interval of its own.

use chrono::Utc;

use crate::types::{FitResult, ModelType, Prediction, SampleWindow};

/// Normal-quantile width for the standard confidence levels
///
/// Nonstandard levels fall back to the 95% quantile.
fn z_score(confidence_level: f64) -> f64 {
    if (confidence_level - 0.90).abs() < 1e-9 {
        1.645
    } else if (confidence_level - 0.99).abs() < 1e-9 {
        2.576
    } else {
        1.96
    }
}

/// Project the linear fit to a future horizon
///
/// The prediction targets `window_duration + horizon` seconds past the window
/// start. The symmetric interval is `z * sqrt(residual_mean_square * (1 + 1/n))`
/// over the fit's residuals; with fewer than 3 samples it collapses to ±0 and
/// callers can spot the thin fit through `FitResult::sample_count`.
pub fn forecast_linear(
    window: &SampleWindow,
    fit: &FitResult,
    horizon_minutes: u32,
    confidence_level: f64,
) -> Prediction {
    let horizon_seconds = f64::from(horizon_minutes) * 60.0;
    let target_x = window.duration_seconds() + horizon_seconds;
    let predicted_value = fit.intercept + fit.slope * target_x;

    let n = fit.sample_count;
    let interval = if n < 3 {
        0.0
    } else {
        let xs = window.elapsed_seconds();
        let ys = window.values();
        let residual_mean_square = xs
            .iter()
            .zip(ys.iter())
            .map(|(x, y)| {
                let residual = y - (fit.intercept + fit.slope * x);
                residual * residual
            })
            .sum::<f64>()
            / n as f64;
        z_score(confidence_level) * (residual_mean_square * (1.0 + 1.0 / n as f64)).sqrt()
    };

    Prediction {
        entity_id: window.entity_id().to_string(),
        metric_name: window.metric_name().to_string(),
        predicted_value,
        confidence_lower: predicted_value - interval,
        confidence_upper: predicted_value + interval,
        horizon_minutes,
        model_type: ModelType::LinearTrend,
        confidence_level,
        computed_at: Utc::now(),
    }
}

/// Final smoothed level of the window
///
/// Sequential fold `S_0 = value_0`, `S_i = alpha * value_i + (1 - alpha) * S_{i-1}`.
/// Returns `None` on an empty window.
pub fn smoothed_level(window: &SampleWindow, alpha: f64) -> Option<f64> {
    let mut samples = window.samples().iter();
    let first = samples.next()?;
    Some(samples.fold(first.value, |level, sample| {
        alpha * sample.value + (1.0 - alpha) * level
    }))
}

/// Flat projection of the most recent smoothed level
///
/// Exponential smoothing here is a noise damper, not a trend projector: the
/// horizon only tags which requested time the Prediction answers for, and the
/// interval bounds sit on the predicted value itself.
pub fn forecast_smoothed(
    window: &SampleWindow,
    alpha: f64,
    horizon_minutes: u32,
    confidence_level: f64,
) -> Option<Prediction> {
    let level = smoothed_level(window, alpha)?;

    Some(Prediction {
        entity_id: window.entity_id().to_string(),
        metric_name: window.metric_name().to_string(),
        predicted_value: level,
        confidence_lower: level,
        confidence_upper: level,
        horizon_minutes,
        model_type: ModelType::ExponentialSmoothing,
        confidence_level,
        computed_at: Utc::now(),
    })
}
