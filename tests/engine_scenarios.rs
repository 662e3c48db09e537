//! End-to-end scenarios for the forecasting engine
//!
//! Exercises the whole pipeline the way the external scheduler would: fetch
//! through the provider boundary, forecast, solve crossings, evaluate
//! exhaustion, and lean on the cache across calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use foresight::{
    EngineConfig, ForecastEngine, ForesightError, MemorySampleProvider, MetricSample, ModelType,
    Severity, ThresholdType,
};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn hourly(values: &[f64]) -> Vec<MetricSample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| MetricSample::new(ts(i as i64 * 3600), *v))
        .collect()
}

fn small_window_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.forecast.min_samples = 4;
    config
}

#[test]
fn test_engine_config_defaults() {
    let config = EngineConfig::default();

    assert_eq!(config.forecast.min_samples, 20);
    assert_eq!(config.forecast.confidence_level, 0.95);
    assert_eq!(config.threshold.confidence_gate, 0.5);
    assert_eq!(config.threshold.max_lookahead, Duration::from_secs(6 * 3600));
    assert_eq!(config.cache.ttl, Duration::from_secs(300));
    assert!(config
        .exhaustion
        .resources
        .iter()
        .any(|(name, levels)| name == "disk_usage" && levels.critical == 95.0));
}

#[tokio::test]
async fn test_disk_exhaustion_scenario() {
    // Steady 3/hour climb: 70, 73, 76, 79 against a 95 critical line.
    let provider = MemorySampleProvider::new();
    provider.insert("server-1", "disk_usage", hourly(&[70.0, 73.0, 76.0, 79.0]));
    let engine = ForecastEngine::new(small_window_config(), provider);

    let crossing = engine
        .predict_threshold_crossing("server-1", "disk_usage", 95.0, ThresholdType::Upper, None)
        .await
        .unwrap()
        .expect("a steady climb toward the threshold must predict a crossing");

    assert!((crossing.growth_rate_per_hour - 3.0).abs() < 1e-6);
    assert!((crossing.confidence - 1.0).abs() < 1e-9);

    // (95 - 79) / 3 = 5 hours 20 minutes past the last sample.
    let warnings = engine.check_exhaustion("server-1").await.unwrap();
    assert_eq!(warnings.len(), 1);
    let warning = &warnings[0];
    assert_eq!(warning.resource_name, "disk_usage");
    assert_eq!(warning.current_usage, 79.0);
    assert_eq!(warning.threshold, 95.0);
    let hours_left = warning.time_until_exhaustion.as_secs_f64() / 3600.0;
    assert!((hours_left - 16.0 / 3.0).abs() < 0.01);
    // Past the 4-hour band, inside the 12-hour band.
    assert_eq!(warning.severity, Severity::Warning);
}

#[tokio::test]
async fn test_forecast_across_horizons_with_default_minimum() {
    let provider = MemorySampleProvider::new();
    let samples: Vec<MetricSample> = (0..30)
        .map(|i| MetricSample::new(ts(i * 600), 40.0 + 0.2 * i as f64))
        .collect();
    provider.insert("server-1", "memory_usage", samples);
    let engine = ForecastEngine::new(EngineConfig::default(), provider);

    let predictions = engine
        .forecast("server-1", "memory_usage", &[60, 180, 360])
        .await
        .unwrap();

    assert_eq!(predictions.len(), 3);
    for prediction in &predictions {
        assert_eq!(prediction.model_type, ModelType::LinearTrend);
        assert!(prediction.confidence_lower <= prediction.predicted_value);
        assert!(prediction.predicted_value <= prediction.confidence_upper);
    }
    // 0.2 per 10 minutes: the six-hour horizon sits well above the one-hour one.
    assert!(predictions[2].predicted_value > predictions[0].predicted_value + 5.0);
}

#[tokio::test]
async fn test_concurrent_requests_share_cached_predictions() {
    let provider = MemorySampleProvider::new();
    let samples: Vec<MetricSample> = (0..24)
        .map(|i| MetricSample::new(ts(i * 300), 50.0 + 0.5 * i as f64))
        .collect();
    provider.insert("server-1", "disk_usage", samples);
    let engine = Arc::new(ForecastEngine::new(EngineConfig::default(), provider));

    let first = engine.forecast("server-1", "disk_usage", &[60, 180]).await.unwrap();

    let (a, b) = tokio::join!(
        {
            let engine = Arc::clone(&engine);
            async move { engine.forecast("server-1", "disk_usage", &[60, 180]).await }
        },
        {
            let engine = Arc::clone(&engine);
            async move { engine.forecast("server-1", "disk_usage", &[180, 60]).await }
        }
    );

    // Both land on the warm cache entry; the horizon order is normalized.
    assert_eq!(a.unwrap(), first);
    assert_eq!(b.unwrap(), first);
    assert_eq!(engine.statistics().cache.hits, 2);
}

#[tokio::test]
async fn test_ttl_expiry_triggers_fresh_computation() {
    let mut config = EngineConfig::default();
    config.cache.ttl = Duration::from_millis(50);

    let provider = MemorySampleProvider::new();
    let samples: Vec<MetricSample> = (0..24)
        .map(|i| MetricSample::new(ts(i * 300), 50.0 + 0.5 * i as f64))
        .collect();
    provider.insert("server-1", "disk_usage", samples);
    let engine = ForecastEngine::new(config, provider);

    engine.forecast("server-1", "disk_usage", &[60]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    engine.forecast("server-1", "disk_usage", &[60]).await.unwrap();

    let stats = engine.statistics();
    assert_eq!(stats.cache.hits, 0);
    assert_eq!(stats.forecasts_generated, 2);
}

#[tokio::test]
async fn test_exhaustion_skips_unreachable_resources() {
    // Only disk history exists; memory and cpu fetches fail Unavailable.
    let provider = MemorySampleProvider::new();
    provider.insert("server-1", "disk_usage", hourly(&[75.0, 80.0, 85.0, 90.0]));
    let engine = ForecastEngine::new(small_window_config(), provider);

    let warnings = engine.check_exhaustion("server-1").await.unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].resource_name, "disk_usage");
    assert_eq!(warnings[0].severity, Severity::Critical);
}

#[tokio::test]
async fn test_unavailable_provider_propagates_from_forecast() {
    let engine = ForecastEngine::new(EngineConfig::default(), MemorySampleProvider::new());

    let result = engine.forecast("ghost", "disk_usage", &[60]).await;
    match result {
        Err(ForesightError::Unavailable(detail)) => {
            assert!(detail.contains("ghost"));
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_warnings_serialize_for_the_alerting_boundary() {
    let provider = MemorySampleProvider::new();
    provider.insert("server-1", "disk_usage", hourly(&[75.0, 80.0, 85.0, 90.0]));
    let engine = ForecastEngine::new(small_window_config(), provider);

    let warnings = engine.check_exhaustion("server-1").await.unwrap();
    let json = serde_json::to_string(&warnings).unwrap();

    assert!(json.contains("\"resource_name\":\"disk_usage\""));
    assert!(json.contains("\"severity\":\"Critical\""));
}
