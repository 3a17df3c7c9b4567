//! Finished, read-only result values published to consumers.

use chrono::{DateTime, NaiveDate, Utc};
use daysense_provider::MetricType;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stage-duration breakdown of one night of sleep, in minutes.
///
/// Immutable once built. A breakdown with only a coarse total (no REM /
/// core / deep split) reports `has_stage_data() == false`.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct SleepStages {
    pub awake_minutes: f64,
    pub rem_minutes: f64,
    pub core_minutes: f64,
    pub deep_minutes: f64,
}

impl SleepStages {
    pub fn total_asleep_minutes(&self) -> f64 {
        self.rem_minutes + self.core_minutes + self.deep_minutes
    }

    pub fn total_minutes(&self) -> f64 {
        self.awake_minutes + self.total_asleep_minutes()
    }

    /// True iff a real stage breakdown exists, distinguishing it from a
    /// coarse total-duration-only estimate.
    pub fn has_stage_data(&self) -> bool {
        self.total_asleep_minutes() > 0.0
    }
}

/// One day's reconciled metrics. Built once per fetch cycle and replaced
/// wholesale on the next; a metric the fallback chain could not resolve is
/// absent from the map, never a sentinel zero.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DailyHealthSummary {
    pub date: NaiveDate,
    pub metrics: BTreeMap<MetricType, f64>,
    pub sleep_stages: Option<SleepStages>,
    pub score: Option<u8>,
}

impl DailyHealthSummary {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            metrics: BTreeMap::new(),
            sleep_stages: None,
            score: None,
        }
    }

    pub fn metric(&self, metric: MetricType) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }

    pub fn has_data(&self) -> bool {
        !self.metrics.is_empty()
    }
}

/// Per-metric contribution to a composite score, recomputed on every
/// scoring call.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ScoreBreakdownEntry {
    pub metric: MetricType,
    /// Normalized contribution in `[0, 1]`.
    pub normalized_score: f64,
    pub raw_value: f64,
}

/// Qualitative band for a 0-100 composite score.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum ScoreLabel {
    Excellent,
    Great,
    Good,
    Fair,
    NeedsAttention,
    Poor,
}

impl ScoreLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=100 => ScoreLabel::Excellent,
            75..=89 => ScoreLabel::Great,
            60..=74 => ScoreLabel::Good,
            40..=59 => ScoreLabel::Fair,
            20..=39 => ScoreLabel::NeedsAttention,
            _ => ScoreLabel::Poor,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::Great => "Great",
            ScoreLabel::Good => "Good",
            ScoreLabel::Fair => "Fair",
            ScoreLabel::NeedsAttention => "Needs Attention",
            ScoreLabel::Poor => "Poor",
        }
    }
}

/// Composite wellness score with its qualitative label, prose explanation
/// and per-metric breakdown (sorted descending by normalized score).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WellnessScore {
    pub value: u8,
    pub label: ScoreLabel,
    pub explanation: String,
    pub breakdown: Vec<ScoreBreakdownEntry>,
}

impl WellnessScore {
    pub fn top_contributor(&self) -> Option<&ScoreBreakdownEntry> {
        self.breakdown.first()
    }

    /// The weakest metric, only meaningful when more than one contributed.
    pub fn weakest_area(&self) -> Option<&ScoreBreakdownEntry> {
        if self.breakdown.len() > 1 {
            self.breakdown.last()
        } else {
            None
        }
    }
}

/// Secondary composite over HRV, resting heart rate and sleep duration.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RecoveryScore {
    pub value: u8,
    pub should_rest: bool,
}

/// Short ranked observation derived from a day summary and the trailing
/// week. Ephemeral: regenerated every cycle, never persisted.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HealthInsight {
    pub icon: String,
    pub text: String,
    pub color: String,
    pub priority: u8,
}

/// The owned, immutable result of one fetch cycle. Published atomically;
/// consumers never observe partial state.
#[derive(Clone, Debug, Serialize)]
pub struct FetchCycle {
    pub cycle_id: Uuid,
    pub completed_at: DateTime<Utc>,
    /// The effective "current" summary; when `substituted` is true this is
    /// the most recent non-empty day from the trailing week, not today.
    pub today: DailyHealthSummary,
    pub substituted: bool,
    /// Exactly 7 entries, oldest to newest. Empty days are present, not
    /// dropped, so downstream series have a fixed length.
    pub week: Vec<DailyHealthSummary>,
    pub wellness: Option<WellnessScore>,
    pub recovery: Option<RecoveryScore>,
    pub insights: Vec<HealthInsight>,
}
