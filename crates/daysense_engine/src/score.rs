//! Composite wellness scoring.
//!
//! Maps a day summary onto a 0-100 score, a qualitative label and a
//! per-metric breakdown. Time-aware mode scales cumulative targets by how
//! far through the waking day "now" is, so a full-day step target does not
//! punish a 9am reading; absolute mode (past days, staleness-substituted
//! todays) applies full-day targets unscaled.

use crate::registry::MetricRegistry;
use crate::types::{DailyHealthSummary, ScoreBreakdownEntry, ScoreLabel, WellnessScore};
use chrono::{DateTime, Timelike, Utc};

/// Reference waking day used for the day-progress factor.
const WAKING_START_HOUR: u32 = 6;
const WAKING_HOURS: f64 = 16.0;
/// Floor keeps the factor in `(0, 1]` even before the waking day begins.
const MIN_DAY_PROGRESS: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreMode {
    /// Today, with live data: cumulative targets scaled by day progress.
    TimeAware { now: DateTime<Utc> },
    /// Past days and substituted todays: full-day targets.
    Absolute,
}

/// Fraction of the waking reference day elapsed at `now`, in `(0, 1]`.
pub fn day_progress(now: DateTime<Utc>) -> f64 {
    let seconds_into_day = f64::from(now.num_seconds_from_midnight());
    let waking_start = f64::from(WAKING_START_HOUR) * 3600.0;
    let elapsed = (seconds_into_day - waking_start) / (WAKING_HOURS * 3600.0);
    elapsed.clamp(MIN_DAY_PROGRESS, 1.0)
}

pub struct ScoreEngine {
    registry: MetricRegistry,
}

impl ScoreEngine {
    pub fn new(registry: MetricRegistry) -> Self {
        Self { registry }
    }

    /// Score the summary under `mode`. Deterministic for a fixed
    /// (summary, mode) pair. Returns `None` when no present metric carries
    /// a registered configuration.
    ///
    /// Absent metrics contribute neither score nor weight: the composite is
    /// renormalized linearly over the weights of the present subset.
    pub fn score(&self, summary: &DailyHealthSummary, mode: ScoreMode) -> Option<WellnessScore> {
        let progress = match mode {
            ScoreMode::TimeAware { now } => day_progress(now),
            ScoreMode::Absolute => 1.0,
        };

        let mut weighted = 0.0;
        let mut weight_sum = 0.0;
        let mut breakdown = Vec::new();
        for (&metric, &raw_value) in &summary.metrics {
            // Missing configuration: the metric neither helps nor hurts.
            let Some(config) = self.registry.config(metric) else {
                continue;
            };
            let target_scale = if metric.is_cumulative() { progress } else { 1.0 };
            let normalized = config.curve.normalize(raw_value, target_scale);
            weighted += config.weight * normalized;
            weight_sum += config.weight;
            breakdown.push(ScoreBreakdownEntry {
                metric,
                normalized_score: normalized,
                raw_value,
            });
        }
        if weight_sum <= 0.0 {
            return None;
        }

        breakdown.sort_by(|a, b| {
            b.normalized_score
                .partial_cmp(&a.normalized_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let value = (100.0 * weighted / weight_sum).round() as u8;
        let label = ScoreLabel::from_score(value);
        Some(WellnessScore {
            value,
            label,
            explanation: explanation(label, mode),
            breakdown,
        })
    }
}

/// Prose for the label, phrased for where the day stands.
fn explanation(label: ScoreLabel, mode: ScoreMode) -> String {
    let phase = match mode {
        ScoreMode::TimeAware { now } => match now.hour() {
            0..=11 => "so far this morning",
            12..=17 => "so far today",
            _ => "today",
        },
        ScoreMode::Absolute => "for the day",
    };
    let verdict = match label {
        ScoreLabel::Excellent => "You're in top form",
        ScoreLabel::Great => "You're doing great",
        ScoreLabel::Good => "You're on track",
        ScoreLabel::Fair => "There's room to improve",
        ScoreLabel::NeedsAttention => "Your numbers need attention",
        ScoreLabel::Poor => "Take it easy and recover",
    };
    format!("{verdict} {phase}.")
}
