//! Threshold-crossing solver
//!
//! Inverts a linear fit to estimate when a metric will cross a configured
//! threshold. A crossing is only reported when the trend points at the
//! threshold, the fit is trustworthy, and the crossing lands inside the
//! look-ahead window; everything else is "no crossing predicted", which is an
//! absent result rather than an error.

use chrono::Duration as ChronoDuration;
use tracing::debug;

use crate::config::ThresholdConfig;
use crate::types::{
    FitResult, SampleWindow, ThresholdCrossing, ThresholdType, TrendDirection,
};

/// Solve the fitted line for the time at which it crosses `threshold_value`
///
/// Gates, in order: trend direction must agree with the threshold type
/// (an Upper threshold needs an increasing trend, a Lower one a decreasing
/// trend), `|r|` must reach the confidence gate, and the crossing must land
/// after the window end but within the look-ahead limit. Direction and
/// confidence are independent gates; both must hold.
pub fn solve_threshold_crossing(
    window: &SampleWindow,
    fit: &FitResult,
    threshold_value: f64,
    threshold_type: ThresholdType,
    config: &ThresholdConfig,
) -> Option<ThresholdCrossing> {
    let last = window.last()?;
    let trend = TrendDirection::from_slope(fit.slope);

    let direction_matches = matches!(
        (threshold_type, trend),
        (ThresholdType::Upper, TrendDirection::Increasing)
            | (ThresholdType::Lower, TrendDirection::Decreasing)
    );
    if !direction_matches {
        debug!(
            metric = window.metric_name(),
            ?threshold_type,
            ?trend,
            "crossing rejected: trend not approaching threshold"
        );
        return None;
    }

    let confidence = fit.correlation.abs();
    if confidence < config.confidence_gate {
        debug!(
            metric = window.metric_name(),
            confidence,
            gate = config.confidence_gate,
            "crossing rejected: fit below confidence gate"
        );
        return None;
    }

    // Seconds past the window start at which the fitted line meets the
    // threshold; the slope is nonzero once the direction gate passed.
    let cross_x = (threshold_value - fit.intercept) / fit.slope;
    let seconds_until_crossing = cross_x - window.duration_seconds();
    if !seconds_until_crossing.is_finite() || seconds_until_crossing <= 0.0 {
        debug!(
            metric = window.metric_name(),
            "crossing rejected: already at or past threshold"
        );
        return None;
    }
    if seconds_until_crossing > config.max_lookahead.as_secs_f64() {
        debug!(
            metric = window.metric_name(),
            seconds_until_crossing,
            lookahead_secs = config.max_lookahead.as_secs(),
            "crossing rejected: beyond look-ahead window"
        );
        return None;
    }

    let estimated_crossing_time =
        last.timestamp + ChronoDuration::milliseconds((seconds_until_crossing * 1000.0) as i64);

    Some(ThresholdCrossing {
        entity_id: window.entity_id().to_string(),
        metric_name: window.metric_name().to_string(),
        threshold_value,
        threshold_type,
        estimated_crossing_time,
        current_value: last.value,
        trend,
        growth_rate_per_hour: fit.slope * 3600.0,
        confidence,
    })
}
