//! Shared health data model and the `HealthProvider` capability trait.
//!
//! Everything the reconciliation core knows about raw health data lives here:
//! the closed [`MetricType`] enumeration, raw sample/interval/session shapes,
//! and the async [`HealthProvider`] trait the engine consumes. The reqwest
//! implementation against the local health-bridge gateway is in
//! [`http_client`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;
pub mod retry;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("authorization denied: {0}")]
    Auth(String),
    #[error("health store unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected response ({status}): {body}")]
    UnexpectedStatus { status: u16, body: String },
}

impl ProviderError {
    /// Transient failures worth retrying; authorization and availability
    /// problems are terminal for the current cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(_) => true,
            ProviderError::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// How a metric's raw records are reduced to one value per day window.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    CumulativeSum,
    RepresentativeAverage,
    LatestSample,
    IntervalClassified,
    DurationAccumulation,
}

impl AggregationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationKind::CumulativeSum => "cumulative_sum",
            AggregationKind::RepresentativeAverage => "representative_average",
            AggregationKind::LatestSample => "latest_sample",
            AggregationKind::IntervalClassified => "interval_classified",
            AggregationKind::DurationAccumulation => "duration_accumulation",
        }
    }
}

/// Closed enumeration of the tracked metric types.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Steps,
    HeartRate,
    HeartRateVariability,
    RestingHeartRate,
    BloodOxygen,
    ActiveCalories,
    SleepDuration,
    MindfulMinutes,
    WorkoutMinutes,
}

impl MetricType {
    pub const ALL: [MetricType; 9] = [
        MetricType::Steps,
        MetricType::HeartRate,
        MetricType::HeartRateVariability,
        MetricType::RestingHeartRate,
        MetricType::BloodOxygen,
        MetricType::ActiveCalories,
        MetricType::SleepDuration,
        MetricType::MindfulMinutes,
        MetricType::WorkoutMinutes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Steps => "steps",
            MetricType::HeartRate => "heart_rate",
            MetricType::HeartRateVariability => "heart_rate_variability",
            MetricType::RestingHeartRate => "resting_heart_rate",
            MetricType::BloodOxygen => "blood_oxygen",
            MetricType::ActiveCalories => "active_calories",
            MetricType::SleepDuration => "sleep_duration",
            MetricType::MindfulMinutes => "mindful_minutes",
            MetricType::WorkoutMinutes => "workout_minutes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricType::Steps => "Steps",
            MetricType::HeartRate => "Heart Rate",
            MetricType::HeartRateVariability => "Heart Rate Variability",
            MetricType::RestingHeartRate => "Resting Heart Rate",
            MetricType::BloodOxygen => "Blood Oxygen",
            MetricType::ActiveCalories => "Active Calories",
            MetricType::SleepDuration => "Sleep",
            MetricType::MindfulMinutes => "Mindful Minutes",
            MetricType::WorkoutMinutes => "Workout Minutes",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            MetricType::Steps => "steps",
            MetricType::HeartRate | MetricType::RestingHeartRate => "bpm",
            MetricType::HeartRateVariability => "ms",
            MetricType::BloodOxygen => "%",
            MetricType::ActiveCalories => "kcal",
            MetricType::SleepDuration
            | MetricType::MindfulMinutes
            | MetricType::WorkoutMinutes => "min",
        }
    }

    pub fn aggregation(self) -> AggregationKind {
        match self {
            MetricType::Steps | MetricType::ActiveCalories => AggregationKind::CumulativeSum,
            MetricType::HeartRate => AggregationKind::RepresentativeAverage,
            MetricType::HeartRateVariability
            | MetricType::RestingHeartRate
            | MetricType::BloodOxygen => AggregationKind::LatestSample,
            MetricType::SleepDuration => AggregationKind::IntervalClassified,
            MetricType::MindfulMinutes | MetricType::WorkoutMinutes => {
                AggregationKind::DurationAccumulation
            }
        }
    }

    /// Whether the metric accrues over the waking day (steps, calories,
    /// session minutes) as opposed to settling once measured (sleep, HRV,
    /// resting HR, blood oxygen). Cumulative targets are scaled by the
    /// day-progress factor in time-aware scoring.
    pub fn is_cumulative(self) -> bool {
        matches!(
            self,
            MetricType::Steps
                | MetricType::ActiveCalories
                | MetricType::MindfulMinutes
                | MetricType::WorkoutMinutes
        )
    }
}

/// Half-open UTC time window `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The full calendar day `[00:00, 24:00)` for `date`, in UTC.
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc();
        Self {
            start,
            end: start + Duration::hours(24),
        }
    }

    /// Same window with the start moved earlier by `hours`. Used by the
    /// sleep query so a night beginning the prior evening is captured.
    pub fn widened_start(self, hours: i64) -> Self {
        Self {
            start: self.start - Duration::hours(hours),
            end: self.end,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    /// Whether `[start, end)` overlaps this window at all.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// Raw point or span sample owned by the provider; read-only to the core.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct MetricSample {
    pub metric: MetricType,
    pub value: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source_id: String,
}

/// Sleep interval labels as reported by the provider. Labels the bridge
/// does not recognize deserialize to `Unspecified`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SleepLabel {
    Awake,
    Rem,
    Core,
    Deep,
    InBed,
    #[serde(other)]
    Unspecified,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LabelledInterval {
    pub label: SleepLabel,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LabelledInterval {
    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_seconds().max(0) as f64 / 60.0
    }
}

/// Categories of labelled-interval queries the provider supports.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntervalCategory {
    Sleep,
}

impl IntervalCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            IntervalCategory::Sleep => "sleep",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WorkoutSession {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub energy_kcal: Option<f64>,
    pub distance_m: Option<f64>,
}

impl WorkoutSession {
    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_seconds().max(0) as f64 / 60.0
    }
}

/// Abstract capability surface of the external health data provider.
///
/// Authorization is owned by the caller; implementations surface denied
/// access through [`ProviderError::Auth`] and a missing backing store
/// through [`ProviderError::Unavailable`], both from [`availability`]
/// (checked once per fetch cycle, before any data queries).
///
/// [`availability`]: HealthProvider::availability
#[async_trait]
pub trait HealthProvider: Send + Sync + 'static {
    async fn availability(&self) -> Result<(), ProviderError>;

    /// Provider-side pre-aggregated statistic over the window, when it has
    /// one. `Ok(None)` means "no data", not an error.
    async fn query_statistic(
        &self,
        metric: MetricType,
        window: TimeWindow,
        kind: AggregationKind,
    ) -> Result<Option<f64>, ProviderError>;

    async fn query_samples(
        &self,
        metric: MetricType,
        window: TimeWindow,
    ) -> Result<Vec<MetricSample>, ProviderError>;

    async fn query_intervals(
        &self,
        category: IntervalCategory,
        window: TimeWindow,
    ) -> Result<Vec<LabelledInterval>, ProviderError>;

    async fn query_workout_sessions(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<WorkoutSession>, ProviderError>;
}
