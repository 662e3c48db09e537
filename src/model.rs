//! Model selection between the two forecasters
//!
//! The model set is closed: selection is an explicit match over the two
//! variants, never open-ended dispatch.

use tracing::debug;

use crate::config::ForecastConfig;
use crate::types::{FitResult, ModelType};

/// Choose a forecasting model from the fit and the series volatility
///
/// First match wins: a correlation above the trend gate selects
/// `LinearTrend` outright, then high volatility pushes the series to
/// `ExponentialSmoothing`, and everything else defaults to `LinearTrend`.
/// Trend strength is deliberately checked before volatility: a strong trend
/// holds even when absolute variance is high.
pub fn select_model(
    fit: &FitResult,
    coefficient_of_variation: f64,
    config: &ForecastConfig,
) -> ModelType {
    let selected = if fit.correlation.abs() > config.trend_correlation_gate {
        ModelType::LinearTrend
    } else if coefficient_of_variation > config.volatility_gate {
        ModelType::ExponentialSmoothing
    } else {
        ModelType::LinearTrend
    };

    debug!(
        correlation = fit.correlation,
        coefficient_of_variation, ?selected, "selected forecast model"
    );
    selected
}
