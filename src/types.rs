//! Core data types for forecasting, threshold crossing, and exhaustion
//! warnings.
//!
//! Everything here is an immutable value: constructed once, read by the
//! engine and the caller, never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single observation of a metric at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl MetricSample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// An ordered window of recent samples for one (entity, metric) pair
///
/// The constructor sorts ascending by timestamp. Duplicate timestamps are a
/// provider contract violation; the trend estimator converts the degenerate
/// all-identical case into `DegenerateWindow` rather than trusting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleWindow {
    entity_id: String,
    metric_name: String,
    samples: Vec<MetricSample>,
}

impl SampleWindow {
    pub fn new(
        entity_id: impl Into<String>,
        metric_name: impl Into<String>,
        mut samples: Vec<MetricSample>,
    ) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self {
            entity_id: entity_id.into(),
            metric_name: metric_name.into(),
            samples,
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&MetricSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&MetricSample> {
        self.samples.last()
    }

    /// Seconds elapsed from the first sample to the last
    pub fn duration_seconds(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => {
                (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0
            }
            _ => 0.0,
        }
    }

    /// Seconds elapsed from the first sample, per sample (the fit's x axis)
    pub fn elapsed_seconds(&self) -> Vec<f64> {
        let Some(first) = self.samples.first() else {
            return Vec::new();
        };
        self.samples
            .iter()
            .map(|s| (s.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0)
            .collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }
}

/// Ordinary least-squares fit of value against elapsed seconds
///
/// `correlation` is the signed Pearson correlation of value against time;
/// gates consume its magnitude, the slope sign carries the direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Rate of change in value units per second
    pub slope: f64,
    /// Fitted value at the window start
    pub intercept: f64,
    /// Pearson correlation coefficient, in [-1, 1]
    pub correlation: f64,
    pub sample_count: usize,
}

/// Forecasting model chosen for a forecast call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    /// Projects the linear fit forward with a prediction interval
    LinearTrend,
    /// Flat projection of the most recent smoothed level
    ExponentialSmoothing,
}

/// Direction of change implied by a linear fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Increasing
        } else if slope < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

/// Whether a threshold is breached from below or from above
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThresholdType {
    Upper,
    Lower,
}

/// A forecast value at one horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub entity_id: String,
    pub metric_name: String,
    pub predicted_value: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    pub horizon_minutes: u32,
    pub model_type: ModelType,
    pub confidence_level: f64,
    pub computed_at: DateTime<Utc>,
}

/// A predicted crossing of a configured threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCrossing {
    pub entity_id: String,
    pub metric_name: String,
    pub threshold_value: f64,
    pub threshold_type: ThresholdType,
    pub estimated_crossing_time: DateTime<Utc>,
    pub current_value: f64,
    pub trend: TrendDirection,
    pub growth_rate_per_hour: f64,
    /// Magnitude of the fit correlation, in [0, 1]
    pub confidence: f64,
}

/// Severity tier for an exhaustion warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// A critical resource predicted to cross its critical threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExhaustionWarning {
    pub resource_name: String,
    pub current_usage: f64,
    pub threshold: f64,
    pub time_until_exhaustion: Duration,
    pub estimated_exhaustion_time: DateTime<Utc>,
    pub growth_rate_per_hour: f64,
    pub confidence: f64,
    pub severity: Severity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_window_sorts_samples() {
        let window = SampleWindow::new(
            "dev-1",
            "cpu_usage",
            vec![
                MetricSample::new(ts(120), 3.0),
                MetricSample::new(ts(0), 1.0),
                MetricSample::new(ts(60), 2.0),
            ],
        );

        assert_eq!(window.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(window.elapsed_seconds(), vec![0.0, 60.0, 120.0]);
        assert_eq!(window.duration_seconds(), 120.0);
    }

    #[test]
    fn test_window_sort_is_stable_for_equal_timestamps() {
        let window = SampleWindow::new(
            "dev-1",
            "cpu_usage",
            vec![
                MetricSample::new(ts(60), 2.0),
                MetricSample::new(ts(0), 1.0),
                MetricSample::new(ts(60), 5.0),
            ],
        );

        assert_eq!(window.len(), 3);
        assert_eq!(window.values(), vec![1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_trend_direction_from_slope() {
        assert_eq!(TrendDirection::from_slope(0.5), TrendDirection::Increasing);
        assert_eq!(TrendDirection::from_slope(-0.5), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::from_slope(0.0), TrendDirection::Stable);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
