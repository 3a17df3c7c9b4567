//! Per-metric value resolution with primary/fallback query chains.
//!
//! One generic routine dispatches on the metric's [`AggregationKind`]; each
//! fallback step is a named, independently testable function. Provider
//! failures on individual sub-queries are absorbed as "no value" and logged
//! at debug; they never abort the surrounding fetch cycle.

use crate::sleep::SleepStageClassifier;
use crate::types::SleepStages;
use daysense_provider::{
    AggregationKind, HealthProvider, IntervalCategory, LabelledInterval, MetricSample, MetricType,
    TimeWindow, WorkoutSession,
};
use std::sync::Arc;

/// Hours the sleep query start is widened before the nominal day start, so
/// sleep beginning the prior evening is captured.
pub const SLEEP_LOOKBACK_HOURS: i64 = 12;

/// A resolved metric value. Sleep carries its stage breakdown alongside the
/// scalar minutes so the summary can attach it when real stage data exists.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Scalar(f64),
    Sleep {
        minutes: f64,
        stages: Option<SleepStages>,
    },
}

impl MetricValue {
    pub fn value(&self) -> f64 {
        match self {
            MetricValue::Scalar(v) => *v,
            MetricValue::Sleep { minutes, .. } => *minutes,
        }
    }

    pub fn sleep_stages(&self) -> Option<&SleepStages> {
        match self {
            MetricValue::Sleep { stages, .. } => stages.as_ref(),
            MetricValue::Scalar(_) => None,
        }
    }
}

/// Resolves one value per metric type per day window.
pub struct MetricAggregator {
    provider: Arc<dyn HealthProvider>,
}

impl MetricAggregator {
    pub fn new(provider: Arc<dyn HealthProvider>) -> Self {
        Self { provider }
    }

    /// Resolve `metric` over `window`, trying the kind's primary query and
    /// then its fallbacks in order. `None` means the whole chain came up
    /// empty; the caller leaves the metric out of the day's map.
    pub async fn resolve(&self, metric: MetricType, window: TimeWindow) -> Option<MetricValue> {
        match metric.aggregation() {
            AggregationKind::CumulativeSum => self
                .resolve_cumulative(metric, window)
                .await
                .map(MetricValue::Scalar),
            AggregationKind::RepresentativeAverage => self
                .resolve_average(metric, window)
                .await
                .map(MetricValue::Scalar),
            AggregationKind::LatestSample => self
                .resolve_latest(metric, window)
                .await
                .map(MetricValue::Scalar),
            AggregationKind::IntervalClassified => self.resolve_sleep(window).await,
            AggregationKind::DurationAccumulation => self
                .resolve_session_minutes(metric, window)
                .await
                .map(MetricValue::Scalar),
        }
    }

    /// Pre-aggregated sum, else manual sum of raw samples. Active calories
    /// additionally fall back to workout-session energy; heart-rate-style
    /// metrics never do (exercise heart rate is a different signal than
    /// ambient heart rate and must not be conflated).
    async fn resolve_cumulative(&self, metric: MetricType, window: TimeWindow) -> Option<f64> {
        if let Some(v) = self
            .statistic(metric, window, AggregationKind::CumulativeSum)
            .await
        {
            return Some(v);
        }
        if let Some(v) = sum_values(&self.samples(metric, window).await) {
            return Some(v);
        }
        if metric == MetricType::ActiveCalories {
            let derived = workout_energy(&self.workouts(window).await, window);
            if derived.is_some() {
                tracing::debug!(metric = metric.as_str(), "derived value from workout energy");
            }
            return derived;
        }
        None
    }

    /// Pre-aggregated average, else unweighted mean of raw samples.
    async fn resolve_average(&self, metric: MetricType, window: TimeWindow) -> Option<f64> {
        match self
            .statistic(metric, window, AggregationKind::RepresentativeAverage)
            .await
        {
            Some(v) => Some(v),
            None => mean_values(&self.samples(metric, window).await),
        }
    }

    /// Pre-aggregated average, else the most recent single raw sample.
    async fn resolve_latest(&self, metric: MetricType, window: TimeWindow) -> Option<f64> {
        match self
            .statistic(metric, window, AggregationKind::RepresentativeAverage)
            .await
        {
            Some(v) => Some(v),
            None => latest_value(&self.samples(metric, window).await),
        }
    }

    /// Classified asleep-like total, else the coarse in-bed total. `None`
    /// only when both are zero.
    async fn resolve_sleep(&self, window: TimeWindow) -> Option<MetricValue> {
        let widened = window.widened_start(SLEEP_LOOKBACK_HOURS);
        let intervals = self.intervals(widened).await;
        let breakdown = SleepStageClassifier::classify(&intervals);
        let asleep = breakdown.asleep_minutes();
        if asleep > 0.0 {
            let stages = breakdown
                .stages
                .has_stage_data()
                .then_some(breakdown.stages);
            return Some(MetricValue::Sleep {
                minutes: asleep,
                stages,
            });
        }
        if breakdown.in_bed_minutes > 0.0 {
            return Some(MetricValue::Sleep {
                minutes: breakdown.in_bed_minutes,
                stages: None,
            });
        }
        None
    }

    /// Sum of session durations overlapping the window. Workout minutes
    /// come from workout-session records; mindful minutes from span samples.
    async fn resolve_session_minutes(
        &self,
        metric: MetricType,
        window: TimeWindow,
    ) -> Option<f64> {
        if metric == MetricType::WorkoutMinutes {
            workout_minutes(&self.workouts(window).await, window)
        } else {
            sample_span_minutes(&self.samples(metric, window).await, window)
        }
    }

    // Absorbed sub-queries: a provider error on any of these becomes "no
    // data" for this metric, never an error for the cycle.

    async fn statistic(
        &self,
        metric: MetricType,
        window: TimeWindow,
        kind: AggregationKind,
    ) -> Option<f64> {
        match self.provider.query_statistic(metric, window, kind).await {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(metric = metric.as_str(), error = %e, "statistic query absorbed");
                None
            }
        }
    }

    async fn samples(&self, metric: MetricType, window: TimeWindow) -> Vec<MetricSample> {
        match self.provider.query_samples(metric, window).await {
            Ok(samples) => samples,
            Err(e) => {
                tracing::debug!(metric = metric.as_str(), error = %e, "sample query absorbed");
                Vec::new()
            }
        }
    }

    async fn intervals(&self, window: TimeWindow) -> Vec<LabelledInterval> {
        match self
            .provider
            .query_intervals(IntervalCategory::Sleep, window)
            .await
        {
            Ok(intervals) => intervals,
            Err(e) => {
                tracing::debug!(error = %e, "interval query absorbed");
                Vec::new()
            }
        }
    }

    async fn workouts(&self, window: TimeWindow) -> Vec<WorkoutSession> {
        match self.provider.query_workout_sessions(window).await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::debug!(error = %e, "workout query absorbed");
                Vec::new()
            }
        }
    }
}

/// Sum of sample values; `None` for an empty set (absence, not zero).
fn sum_values(samples: &[MetricSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().map(|s| s.value).sum())
}

/// Unweighted mean of sample values.
fn mean_values(samples: &[MetricSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().map(|s| s.value).sum::<f64>() / samples.len() as f64)
}

/// Value of the most recent sample by start time, descending.
fn latest_value(samples: &[MetricSample]) -> Option<f64> {
    samples.iter().max_by_key(|s| s.start).map(|s| s.value)
}

/// Sum of energy fields across workout sessions overlapping the window.
/// `None` when no overlapping session carries an energy field.
fn workout_energy(sessions: &[WorkoutSession], window: TimeWindow) -> Option<f64> {
    let energies: Vec<f64> = sessions
        .iter()
        .filter(|s| window.overlaps(s.start, s.end))
        .filter_map(|s| s.energy_kcal)
        .collect();
    if energies.is_empty() {
        return None;
    }
    Some(energies.iter().sum())
}

/// Sum of full durations of workout sessions overlapping the window.
fn workout_minutes(sessions: &[WorkoutSession], window: TimeWindow) -> Option<f64> {
    let overlapping: Vec<&WorkoutSession> = sessions
        .iter()
        .filter(|s| window.overlaps(s.start, s.end))
        .collect();
    if overlapping.is_empty() {
        return None;
    }
    Some(overlapping.iter().map(|s| s.duration_minutes()).sum())
}

/// Sum of span durations of samples overlapping the window (mindfulness
/// sessions are recorded as span samples).
fn sample_span_minutes(samples: &[MetricSample], window: TimeWindow) -> Option<f64> {
    let overlapping: Vec<&MetricSample> = samples
        .iter()
        .filter(|s| window.overlaps(s.start, s.end))
        .collect();
    if overlapping.is_empty() {
        return None;
    }
    Some(
        overlapping
            .iter()
            .map(|s| (s.end - s.start).num_seconds().max(0) as f64 / 60.0)
            .sum(),
    )
}
