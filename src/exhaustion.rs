//! Resource-exhaustion evaluation
//!
//! Runs the threshold-crossing solver against the catalogue of critical
//! resources and maps predicted time-to-exhaustion into a severity tier.
//! Pure compute over the supplied windows; persistence and alert emission
//! belong to the external alerting collaborator.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::{ExhaustionConfig, ThresholdConfig};
use crate::stats::fit_linear;
use crate::threshold::solve_threshold_crossing;
use crate::types::{ExhaustionWarning, SampleWindow, Severity, ThresholdType};

/// Map remaining time before exhaustion to a severity tier
///
/// A monotone step function with inclusive upper bounds: exactly one hour
/// remaining is still `Critical`. No interpolation between bands.
pub fn severity_for_time_remaining(remaining: Duration, config: &ExhaustionConfig) -> Severity {
    if remaining <= config.critical_within {
        Severity::Critical
    } else if remaining <= config.error_within {
        Severity::Error
    } else if remaining <= config.warning_within {
        Severity::Warning
    } else {
        Severity::Info
    }
}

/// Evaluate every catalogued resource window for predicted exhaustion
///
/// Windows whose metric is not in the catalogue are ignored; windows with too
/// little history or no usable trend are skipped rather than failing the
/// check. Each crossing found against a resource's critical threshold becomes
/// one [`ExhaustionWarning`].
pub fn evaluate_exhaustion(
    windows: &[SampleWindow],
    exhaustion: &ExhaustionConfig,
    threshold: &ThresholdConfig,
    min_samples: usize,
) -> Vec<ExhaustionWarning> {
    let mut warnings = Vec::new();

    for window in windows {
        let Some((_, levels)) = exhaustion
            .resources
            .iter()
            .find(|(name, _)| name == window.metric_name())
        else {
            continue;
        };

        if window.len() < min_samples {
            debug!(
                resource = window.metric_name(),
                samples = window.len(),
                min_samples,
                "skipping exhaustion check: not enough history"
            );
            continue;
        }

        let fit = match fit_linear(window) {
            Ok(fit) => fit,
            Err(err) => {
                debug!(
                    resource = window.metric_name(),
                    %err,
                    "skipping exhaustion check: no usable trend"
                );
                continue;
            }
        };

        let Some(crossing) =
            solve_threshold_crossing(window, &fit, levels.critical, ThresholdType::Upper, threshold)
        else {
            continue;
        };

        let last_seen = match window.last() {
            Some(sample) => sample.timestamp,
            None => continue,
        };
        let remaining = crossing
            .estimated_crossing_time
            .signed_duration_since(last_seen)
            .to_std()
            .unwrap_or_default();
        let severity = severity_for_time_remaining(remaining, exhaustion);

        info!(
            resource = window.metric_name(),
            entity = window.entity_id(),
            remaining_secs = remaining.as_secs(),
            ?severity,
            "resource heading toward exhaustion"
        );

        warnings.push(ExhaustionWarning {
            resource_name: window.metric_name().to_string(),
            current_usage: crossing.current_value,
            threshold: levels.critical,
            time_until_exhaustion: remaining,
            estimated_exhaustion_time: crossing.estimated_crossing_time,
            growth_rate_per_hour: crossing.growth_rate_per_hour,
            confidence: crossing.confidence,
            severity,
        });
    }

    warnings
}
