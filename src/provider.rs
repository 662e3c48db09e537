//! Outbound boundary to the metric store
//!
//! The engine never talks to storage directly; it asks a [`SampleProvider`]
//! for a window of recent history. Fetching is the only suspension point in
//! the whole pipeline. Provider failures surface as `Unavailable` and are
//! propagated verbatim, with no retry inside the core.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::types::{MetricSample, SampleWindow};
use crate::{ForesightError, Result};

/// Supplies sample history for one (entity, metric) pair
#[async_trait]
pub trait SampleProvider: Send + Sync {
    /// Fetch up to `lookback` of trailing history for the metric
    async fn fetch_samples(
        &self,
        entity_id: &str,
        metric_name: &str,
        lookback: Duration,
    ) -> Result<SampleWindow>;
}

/// In-memory provider backed by a concurrent map
///
/// The lookback window is anchored at the newest stored sample rather than
/// the wall clock, which keeps fixtures deterministic. An unknown series
/// fails with `Unavailable`, the same way a real store boundary does.
#[derive(Debug, Default)]
pub struct MemorySampleProvider {
    series: DashMap<(String, String), Vec<MetricSample>>,
}

impl MemorySampleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the stored series for an (entity, metric) pair
    pub fn insert(
        &self,
        entity_id: impl Into<String>,
        metric_name: impl Into<String>,
        samples: Vec<MetricSample>,
    ) {
        self.series
            .insert((entity_id.into(), metric_name.into()), samples);
    }

    /// Append a single sample to a series, creating it if absent
    pub fn push(
        &self,
        entity_id: impl Into<String>,
        metric_name: impl Into<String>,
        sample: MetricSample,
    ) {
        self.series
            .entry((entity_id.into(), metric_name.into()))
            .or_default()
            .push(sample);
    }
}

#[async_trait]
impl SampleProvider for MemorySampleProvider {
    async fn fetch_samples(
        &self,
        entity_id: &str,
        metric_name: &str,
        lookback: Duration,
    ) -> Result<SampleWindow> {
        let key = (entity_id.to_string(), metric_name.to_string());
        let samples = self.series.get(&key).ok_or_else(|| {
            ForesightError::Unavailable(format!("no series for {entity_id}/{metric_name}"))
        })?;

        // An oversized lookback simply keeps the whole series.
        let cutoff = samples.iter().map(|s| s.timestamp).max().and_then(|newest| {
            chrono::Duration::from_std(lookback)
                .ok()
                .and_then(|lookback| newest.checked_sub_signed(lookback))
        });
        let selected = samples
            .iter()
            .filter(|s| cutoff.map_or(true, |cutoff| s.timestamp >= cutoff))
            .copied()
            .collect();

        Ok(SampleWindow::new(entity_id, metric_name, selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_sorted_window() {
        let provider = MemorySampleProvider::new();
        provider.insert(
            "dev-1",
            "disk_usage",
            vec![
                MetricSample::new(ts(120), 3.0),
                MetricSample::new(ts(0), 1.0),
                MetricSample::new(ts(60), 2.0),
            ],
        );

        let window = provider
            .fetch_samples("dev-1", "disk_usage", Duration::from_secs(3600))
            .await
            .unwrap();

        assert_eq!(window.len(), 3);
        assert_eq!(window.values(), vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_lookback_trims_old_samples() {
        let provider = MemorySampleProvider::new();
        provider.insert(
            "dev-1",
            "disk_usage",
            vec![
                MetricSample::new(ts(0), 1.0),
                MetricSample::new(ts(3600), 2.0),
                MetricSample::new(ts(7200), 3.0),
            ],
        );

        let window = provider
            .fetch_samples("dev-1", "disk_usage", Duration::from_secs(3600))
            .await
            .unwrap();

        // Only samples within an hour of the newest survive.
        assert_eq!(window.values(), vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_unknown_series_is_unavailable() {
        let provider = MemorySampleProvider::new();
        let result = provider
            .fetch_samples("ghost", "disk_usage", Duration::from_secs(3600))
            .await;

        assert!(matches!(result, Err(ForesightError::Unavailable(_))));
    }
}
