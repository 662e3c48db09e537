//! The forecasting engine: composition root and inbound operations
//!
//! Wires the estimators, model selector, forecasters, threshold solver, and
//! exhaustion evaluator behind the three operations the scheduler calls. The
//! engine owns its prediction cache (injected at construction, never a
//! process-wide singleton) and a set of monotone statistics counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::{CacheKey, CacheStatistics, CachedValue, PredictionCache};
use crate::config::EngineConfig;
use crate::exhaustion::evaluate_exhaustion;
use crate::forecast::{forecast_linear, forecast_smoothed};
use crate::model::select_model;
use crate::provider::SampleProvider;
use crate::stats::{coefficient_of_variation, fit_linear};
use crate::threshold::solve_threshold_crossing;
use crate::types::{
    ExhaustionWarning, FitResult, ModelType, Prediction, SampleWindow, ThresholdCrossing,
    ThresholdType,
};
use crate::{ForesightError, Result};

/// Snapshot of the engine's monotone counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStatistics {
    pub forecasts_generated: u64,
    pub crossings_evaluated: u64,
    pub exhaustion_checks: u64,
    pub cache: CacheStatistics,
}

/// Metric forecasting and threshold-crossing prediction engine
///
/// All computation is pure and synchronous; the only await point is the
/// sample fetch, and the only shared mutable state is the cache. The engine
/// is safe to share across concurrent callers.
#[derive(Debug)]
pub struct ForecastEngine<P> {
    config: EngineConfig,
    provider: P,
    cache: PredictionCache,
    forecasts_generated: AtomicU64,
    crossings_evaluated: AtomicU64,
    exhaustion_checks: AtomicU64,
}

impl<P: SampleProvider> ForecastEngine<P> {
    /// Create an engine with a cache sized from the configuration
    pub fn new(config: EngineConfig, provider: P) -> Self {
        let cache = PredictionCache::new(config.cache.ttl);
        Self::with_cache(config, provider, cache)
    }

    /// Create an engine around an explicitly constructed cache
    pub fn with_cache(config: EngineConfig, provider: P, cache: PredictionCache) -> Self {
        Self {
            config,
            provider,
            cache,
            forecasts_generated: AtomicU64::new(0),
            crossings_evaluated: AtomicU64::new(0),
            exhaustion_checks: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &PredictionCache {
        &self.cache
    }

    pub fn statistics(&self) -> EngineStatistics {
        EngineStatistics {
            forecasts_generated: self.forecasts_generated.load(Ordering::Relaxed),
            crossings_evaluated: self.crossings_evaluated.load(Ordering::Relaxed),
            exhaustion_checks: self.exhaustion_checks.load(Ordering::Relaxed),
            cache: self.cache.statistics(),
        }
    }

    /// Forecast a metric at each requested horizon
    ///
    /// Selects one model per call (never mixed within a horizon set) and
    /// returns one [`Prediction`] per horizon, in request order. Fails with
    /// `InsufficientData` below the configured sample minimum; a degenerate
    /// linear fit falls back to exponential smoothing.
    pub async fn forecast(
        &self,
        entity_id: &str,
        metric_name: &str,
        horizons_minutes: &[u32],
    ) -> Result<Vec<Prediction>> {
        if horizons_minutes.is_empty() {
            return Err(ForesightError::Configuration(
                "at least one horizon is required".into(),
            ));
        }

        let key = CacheKey::forecast(entity_id, metric_name, horizons_minutes);
        if self.config.cache.enabled {
            if let Some(CachedValue::Predictions(predictions)) = self.cache.get(&key) {
                return Ok(predictions);
            }
        }

        let window = self.fetch_window(entity_id, metric_name).await?;
        let model = self.select_model_for(&window)?;

        let forecast_config = &self.config.forecast;
        let mut predictions = Vec::with_capacity(horizons_minutes.len());
        for &horizon in horizons_minutes {
            let prediction = match &model {
                SelectedModel::Linear(fit) => {
                    forecast_linear(&window, fit, horizon, forecast_config.confidence_level)
                }
                SelectedModel::Smoothing => forecast_smoothed(
                    &window,
                    forecast_config.smoothing_alpha,
                    horizon,
                    forecast_config.confidence_level,
                )
                .ok_or_else(|| ForesightError::DegenerateWindow("empty window".into()))?,
            };

            if !prediction.predicted_value.is_finite()
                || !prediction.confidence_lower.is_finite()
                || !prediction.confidence_upper.is_finite()
            {
                return Err(ForesightError::DegenerateWindow(format!(
                    "non-finite forecast for {metric_name}"
                )));
            }
            predictions.push(prediction);
        }

        self.forecasts_generated
            .fetch_add(predictions.len() as u64, Ordering::Relaxed);
        if self.config.cache.enabled {
            self.cache
                .put(key, CachedValue::Predictions(predictions.clone()));
        }
        Ok(predictions)
    }

    /// Predict when a metric will cross a threshold, if it is heading there
    ///
    /// Linear-fit only: a degenerate window is an error on this path rather
    /// than a fallback. Gate rejections and out-of-range crossings return
    /// `Ok(None)`, keeping "nothing will happen" distinct from "something
    /// went wrong".
    pub async fn predict_threshold_crossing(
        &self,
        entity_id: &str,
        metric_name: &str,
        threshold_value: f64,
        threshold_type: ThresholdType,
        lookahead: Option<Duration>,
    ) -> Result<Option<ThresholdCrossing>> {
        let mut threshold_config = self.config.threshold.clone();
        if let Some(lookahead) = lookahead {
            threshold_config.max_lookahead = lookahead;
        }

        let key = CacheKey::crossing(
            entity_id,
            metric_name,
            threshold_value,
            threshold_type,
            threshold_config.max_lookahead,
        );
        if self.config.cache.enabled {
            if let Some(CachedValue::Crossing(crossing)) = self.cache.get(&key) {
                return Ok(crossing);
            }
        }

        let window = self.fetch_window(entity_id, metric_name).await?;
        let fit = fit_linear(&window)?;
        let crossing = solve_threshold_crossing(
            &window,
            &fit,
            threshold_value,
            threshold_type,
            &threshold_config,
        );

        self.crossings_evaluated.fetch_add(1, Ordering::Relaxed);
        if self.config.cache.enabled {
            self.cache
                .put(key, CachedValue::Crossing(crossing.clone()));
        }
        Ok(crossing)
    }

    /// Check every catalogued critical resource of an entity for predicted
    /// exhaustion
    ///
    /// A resource whose window cannot be fetched is skipped so one unreachable
    /// series does not hide the others; the result may be empty.
    pub async fn check_exhaustion(&self, entity_id: &str) -> Result<Vec<ExhaustionWarning>> {
        let key = CacheKey::exhaustion(entity_id);
        if self.config.cache.enabled {
            if let Some(CachedValue::Warnings(warnings)) = self.cache.get(&key) {
                return Ok(warnings);
            }
        }

        let mut windows = Vec::new();
        for (resource, _) in &self.config.exhaustion.resources {
            match self.fetch_window(entity_id, resource).await {
                Ok(window) => windows.push(window),
                Err(ForesightError::Unavailable(detail)) => {
                    warn!(entity_id, resource = %resource, %detail, "resource window unavailable");
                }
                Err(err) => return Err(err),
            }
        }

        let warnings = evaluate_exhaustion(
            &windows,
            &self.config.exhaustion,
            &self.config.threshold,
            self.config.forecast.min_samples,
        );

        self.exhaustion_checks.fetch_add(1, Ordering::Relaxed);
        if self.config.cache.enabled {
            self.cache.put(key, CachedValue::Warnings(warnings.clone()));
        }
        Ok(warnings)
    }

    async fn fetch_window(&self, entity_id: &str, metric_name: &str) -> Result<SampleWindow> {
        let window = self
            .provider
            .fetch_samples(entity_id, metric_name, self.config.lookback)
            .await?;

        let min_samples = self.config.forecast.min_samples;
        if window.len() < min_samples {
            return Err(ForesightError::InsufficientData {
                required: min_samples,
                actual: window.len(),
            });
        }
        Ok(window)
    }

    fn select_model_for(&self, window: &SampleWindow) -> Result<SelectedModel> {
        match fit_linear(window) {
            Ok(fit) => {
                let cv = coefficient_of_variation(window);
                match select_model(&fit, cv, &self.config.forecast) {
                    ModelType::LinearTrend => Ok(SelectedModel::Linear(fit)),
                    ModelType::ExponentialSmoothing => Ok(SelectedModel::Smoothing),
                }
            }
            Err(ForesightError::DegenerateWindow(reason)) => {
                warn!(
                    metric = window.metric_name(),
                    %reason,
                    "degenerate window, falling back to exponential smoothing"
                );
                Ok(SelectedModel::Smoothing)
            }
            Err(err) => Err(err),
        }
    }
}

/// Model choice for one forecast call, with the fit it rests on
enum SelectedModel {
    Linear(FitResult),
    Smoothing,
}
