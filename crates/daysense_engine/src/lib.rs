//! Reconciliation and scoring core for multi-source daily health data.
//!
//! A fetch cycle turns partial, heterogeneous provider records into one
//! trustworthy [`DailyHealthSummary`] per day, a 0-100 composite
//! [`WellnessScore`], a secondary [`RecoveryScore`] and a short ranked list
//! of [`HealthInsight`]s. Cycles are request-triggered, concurrent per
//! metric, and publish finished immutable results only.

pub mod aggregator;
pub mod insights;
pub mod recovery;
pub mod registry;
pub mod score;
pub mod service;
pub mod sleep;
pub mod summary;
pub mod types;

mod test_utils;

pub use aggregator::{MetricAggregator, MetricValue, SLEEP_LOOKBACK_HOURS};
pub use insights::{InsightEngine, MAX_INSIGHTS};
pub use recovery::{REST_THRESHOLD, RecoveryScoreEngine};
pub use registry::{Curve, MetricConfig, MetricRegistry};
pub use score::{ScoreEngine, ScoreMode, day_progress};
pub use service::{DEFAULT_FRESHNESS_TTL, EngineError, WellnessService};
pub use sleep::{SleepBreakdown, SleepStageClassifier};
pub use summary::{DailySummaryBuilder, TRAILING_DAYS, substitute_stale_today};
pub use types::{
    DailyHealthSummary, FetchCycle, HealthInsight, RecoveryScore, ScoreBreakdownEntry, ScoreLabel,
    SleepStages, WellnessScore,
};
