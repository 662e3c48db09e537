//! Configuration for the forecasting engine
//!
//! All tunables live here as nested, serde-loadable config structs whose
//! `Default` impls encode the engine's standard policy: 20-sample minimum,
//! 95% confidence, 0.7/0.3 model-selection gates, 0.5 crossing gate, 6-hour
//! lookahead, 5-minute cache TTL.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ForesightError;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Forecast model parameters
    pub forecast: ForecastConfig,

    /// Threshold-crossing gates
    pub threshold: ThresholdConfig,

    /// Resource-exhaustion catalogue and severity breakpoints
    pub exhaustion: ExhaustionConfig,

    /// Prediction cache behavior
    pub cache: CacheConfig,

    /// How far back to ask the sample provider for history
    pub lookback: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            forecast: ForecastConfig::default(),
            threshold: ThresholdConfig::default(),
            exhaustion: ExhaustionConfig::default(),
            cache: CacheConfig::default(),
            lookback: Duration::from_secs(24 * 3600),
        }
    }
}

impl EngineConfig {
    /// Validate cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ForesightError> {
        let f = &self.forecast;
        if f.min_samples < 2 {
            return Err(ForesightError::Configuration(
                "min_samples must be at least 2".into(),
            ));
        }
        if !(f.smoothing_alpha > 0.0 && f.smoothing_alpha <= 1.0) {
            return Err(ForesightError::Configuration(format!(
                "smoothing_alpha must be in (0, 1], got {}",
                f.smoothing_alpha
            )));
        }
        if !(f.confidence_level > 0.0 && f.confidence_level < 1.0) {
            return Err(ForesightError::Configuration(format!(
                "confidence_level must be in (0, 1), got {}",
                f.confidence_level
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold.confidence_gate) {
            return Err(ForesightError::Configuration(format!(
                "confidence_gate must be in [0, 1], got {}",
                self.threshold.confidence_gate
            )));
        }
        Ok(())
    }
}

/// Parameters shared by the estimators and forecasters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Minimum samples before any forecast is attempted
    pub min_samples: usize,

    /// Confidence level for prediction intervals (0.90, 0.95, 0.99)
    pub confidence_level: f64,

    /// |r| above which a linear trend dominates model selection
    pub trend_correlation_gate: f64,

    /// Coefficient of variation above which the series counts as volatile
    pub volatility_gate: f64,

    /// Level-smoothing factor for exponential smoothing
    pub smoothing_alpha: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_samples: 20,
            confidence_level: 0.95,
            trend_correlation_gate: 0.7,
            volatility_gate: 0.3,
            smoothing_alpha: 0.3,
        }
    }
}

/// Gates for threshold-crossing extrapolation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum |r| before a crossing estimate is trusted
    pub confidence_gate: f64,

    /// Maximum look-ahead for a crossing estimate
    pub max_lookahead: Duration,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            confidence_gate: 0.5,
            max_lookahead: Duration::from_secs(6 * 3600),
        }
    }
}

/// Warning and critical levels for one catalogued resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceThreshold {
    pub warning: f64,
    pub critical: f64,
}

/// Catalogue of critical resources and the severity breakpoints applied to
/// their predicted time-to-exhaustion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExhaustionConfig {
    /// Monitored resource metrics and their usage thresholds
    pub resources: Vec<(String, ResourceThreshold)>,

    /// Time-to-exhaustion at or below this is Critical
    pub critical_within: Duration,

    /// Time-to-exhaustion at or below this is Error
    pub error_within: Duration,

    /// Time-to-exhaustion at or below this is Warning; beyond it, Info
    pub warning_within: Duration,
}

impl Default for ExhaustionConfig {
    fn default() -> Self {
        Self {
            resources: vec![
                (
                    "disk_usage".to_string(),
                    ResourceThreshold {
                        warning: 80.0,
                        critical: 95.0,
                    },
                ),
                (
                    "memory_usage".to_string(),
                    ResourceThreshold {
                        warning: 85.0,
                        critical: 95.0,
                    },
                ),
                (
                    "cpu_usage".to_string(),
                    ResourceThreshold {
                        warning: 90.0,
                        critical: 98.0,
                    },
                ),
            ],
            critical_within: Duration::from_secs(3600),
            error_within: Duration::from_secs(4 * 3600),
            warning_within: Duration::from_secs(12 * 3600),
        }
    }
}

/// Prediction cache behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether results are cached at all
    pub enabled: bool,

    /// How long a cached result stays servable
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300),
        }
    }
}
