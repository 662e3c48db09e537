//! # Foresight
//!
//! Proactive metric forecasting and resource-exhaustion prediction.
//!
//! This crate takes a time-ordered history of a numeric operational metric
//! (disk usage, memory, CPU, error rate) and provides:
//! - Value forecasts at fixed future horizons with confidence intervals
//! - Threshold-crossing prediction (when will this metric reach X?)
//! - Resource-exhaustion warnings with severity tiers
//! - Automatic model selection between linear-trend and
//!   exponential-smoothing forecasters
//!
//! The engine is a pure, in-process computation boundary: sample history is
//! supplied by a [`SampleProvider`] collaborator, results are plain
//! serializable values handed back to the caller, and the only cross-call
//! state is a TTL-bounded prediction cache.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use foresight::{EngineConfig, ForecastEngine, MemorySampleProvider, MetricSample};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> foresight::Result<()> {
//! let provider = MemorySampleProvider::new();
//! let start = Utc::now() - Duration::hours(2);
//! let samples: Vec<MetricSample> = (0..24)
//!     .map(|i| MetricSample::new(start + Duration::minutes(i * 5), 70.0 + i as f64 * 0.5))
//!     .collect();
//! provider.insert("server-1", "disk_usage", samples);
//!
//! let engine = ForecastEngine::new(EngineConfig::default(), provider);
//! let predictions = engine.forecast("server-1", "disk_usage", &[60, 180, 360]).await?;
//! assert_eq!(predictions.len(), 3);
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod cache;
pub mod config;
pub mod engine;
pub mod exhaustion;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod stats;
pub mod threshold;
pub mod types;

pub use cache::{CacheKey, CacheStatistics, CachedValue, PredictionCache};
pub use config::{
    CacheConfig, EngineConfig, ExhaustionConfig, ForecastConfig, ResourceThreshold,
    ThresholdConfig,
};
pub use engine::{EngineStatistics, ForecastEngine};
pub use exhaustion::{evaluate_exhaustion, severity_for_time_remaining};
pub use forecast::{forecast_linear, forecast_smoothed, smoothed_level};
pub use model::select_model;
pub use provider::{MemorySampleProvider, SampleProvider};
pub use stats::{coefficient_of_variation, fit_linear};
pub use threshold::solve_threshold_crossing;
pub use types::{
    ExhaustionWarning, FitResult, MetricSample, ModelType, Prediction, SampleWindow, Severity,
    ThresholdCrossing, ThresholdType, TrendDirection,
};

/// Core error type for forecasting operations
#[derive(Debug, Error)]
pub enum ForesightError {
    /// The sample window holds fewer points than the configured minimum.
    #[error("insufficient data: {actual} samples, {required} required")]
    InsufficientData { required: usize, actual: usize },

    /// The window cannot support a linear fit (zero variance in time).
    #[error("degenerate window: {0}")]
    DegenerateWindow(String),

    /// The upstream sample provider failed; propagated verbatim.
    #[error("sample provider unavailable: {0}")]
    Unavailable(String),

    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, ForesightError>;
