//! Threshold-rule insight generation, ranking and truncation.
//!
//! Each rule independently produces a candidate from the "today" summary
//! and the trailing week; candidates are sorted by priority descending and
//! cut to the top 4. Warnings and compound risk signals carry materially
//! higher priorities (85-95) than affirmations (15-30), so praise never
//! crowds out a warning in the same cycle.

use crate::types::{DailyHealthSummary, HealthInsight, RecoveryScore};
use daysense_provider::MetricType;

pub const MAX_INSIGHTS: usize = 4;

const SEVERE_SHORT_SLEEP_MINUTES: f64 = 360.0;
const SHORT_SLEEP_MINUTES: f64 = 420.0;
const LONG_SLEEP_MINUTES: f64 = 540.0;
const ELEVATED_RESTING_HR: f64 = 75.0;
const COMPOUND_RESTING_HR: f64 = 70.0;
const EXCELLENT_RESTING_HR: f64 = 55.0;
const VERY_LOW_STEPS: f64 = 3_000.0;
const STEP_GOAL: f64 = 10_000.0;
const EXCEPTIONAL_STEPS: f64 = 15_000.0;
/// Recent 3-day step mean below this fraction of the prior mean flags a
/// declining trend.
const TREND_DECLINE_RATIO: f64 = 0.8;

pub struct InsightEngine;

impl InsightEngine {
    pub fn generate(
        today: &DailyHealthSummary,
        week: &[DailyHealthSummary],
        recovery: Option<&RecoveryScore>,
    ) -> Vec<HealthInsight> {
        let mut candidates = Vec::new();
        compound_sleep_hr(today, &mut candidates);
        sleep_bands(today, &mut candidates);
        step_bands(today, &mut candidates);
        resting_hr_bands(today, &mut candidates);
        low_recovery(recovery, &mut candidates);
        weekly_step_trend(week, &mut candidates);

        // Stable sort: equal priorities keep rule order.
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
        candidates.truncate(MAX_INSIGHTS);
        candidates
    }
}

fn insight(icon: &str, color: &str, priority: u8, text: String) -> HealthInsight {
    HealthInsight {
        icon: icon.into(),
        text,
        color: color.into(),
        priority,
    }
}

/// Short sleep and elevated resting heart rate together: a compounding-risk
/// signal neither single-metric rule ranks as urgently.
fn compound_sleep_hr(today: &DailyHealthSummary, out: &mut Vec<HealthInsight>) {
    let (Some(sleep), Some(rhr)) = (
        today.metric(MetricType::SleepDuration),
        today.metric(MetricType::RestingHeartRate),
    ) else {
        return;
    };
    if sleep < SEVERE_SHORT_SLEEP_MINUTES && rhr > COMPOUND_RESTING_HR {
        out.push(insight(
            "warning",
            "red",
            95,
            format!(
                "Short sleep ({:.0} min) combined with an elevated resting heart rate \
                 ({:.0} bpm). Prioritize recovery today.",
                sleep, rhr
            ),
        ));
    }
}

fn sleep_bands(today: &DailyHealthSummary, out: &mut Vec<HealthInsight>) {
    let Some(sleep) = today.metric(MetricType::SleepDuration) else {
        return;
    };
    let hours = sleep / 60.0;
    if sleep < SEVERE_SHORT_SLEEP_MINUTES {
        out.push(insight(
            "sleep",
            "red",
            90,
            format!("Only {hours:.1} h of sleep. Aim for an earlier night tonight."),
        ));
    } else if sleep < SHORT_SLEEP_MINUTES {
        out.push(insight(
            "sleep",
            "orange",
            70,
            format!("{hours:.1} h of sleep is below your 7 h target."),
        ));
    } else if sleep <= LONG_SLEEP_MINUTES {
        out.push(insight(
            "sleep",
            "green",
            20,
            format!("{hours:.1} h of sleep, right in the ideal range."),
        ));
    } else {
        out.push(insight(
            "sleep",
            "blue",
            40,
            format!("{hours:.1} h of sleep is longer than usual. Unusually long sleep can signal extra fatigue."),
        ));
    }
}

fn step_bands(today: &DailyHealthSummary, out: &mut Vec<HealthInsight>) {
    let Some(steps) = today.metric(MetricType::Steps) else {
        return;
    };
    if steps < VERY_LOW_STEPS {
        out.push(insight(
            "steps",
            "orange",
            75,
            format!("Only {steps:.0} steps so far. Even a short walk helps."),
        ));
    } else if steps >= EXCEPTIONAL_STEPS {
        out.push(insight(
            "steps",
            "green",
            30,
            format!("{steps:.0} steps, an exceptional day of movement."),
        ));
    } else if steps >= STEP_GOAL {
        out.push(insight(
            "steps",
            "green",
            25,
            format!("Step goal met with {steps:.0} steps."),
        ));
    } else {
        out.push(insight(
            "steps",
            "yellow",
            25,
            format!("{steps:.0} steps and building toward your goal."),
        ));
    }
}

fn resting_hr_bands(today: &DailyHealthSummary, out: &mut Vec<HealthInsight>) {
    let Some(rhr) = today.metric(MetricType::RestingHeartRate) else {
        return;
    };
    if rhr > ELEVATED_RESTING_HR {
        out.push(insight(
            "heart",
            "red",
            85,
            format!(
                "Resting heart rate is elevated at {rhr:.0} bpm. Consider a lighter day."
            ),
        ));
    } else if rhr < EXCELLENT_RESTING_HR {
        out.push(insight(
            "heart",
            "green",
            25,
            format!("Resting heart rate of {rhr:.0} bpm is excellent."),
        ));
    } else {
        out.push(insight(
            "heart",
            "green",
            15,
            format!("Resting heart rate of {rhr:.0} bpm is in a healthy range."),
        ));
    }
}

fn low_recovery(recovery: Option<&RecoveryScore>, out: &mut Vec<HealthInsight>) {
    let Some(recovery) = recovery else { return };
    if recovery.should_rest {
        out.push(insight(
            "recovery",
            "red",
            88,
            format!(
                "Recovery score is low ({}). A rest day is recommended.",
                recovery.value
            ),
        ));
    }
}

/// Mean of the most recent 3 days' steps against the mean of the preceding
/// days; both sides need at least one value.
fn weekly_step_trend(week: &[DailyHealthSummary], out: &mut Vec<HealthInsight>) {
    if week.len() < 4 {
        return;
    }
    let split = week.len() - 3;
    let prior = step_mean(&week[..split]);
    let recent = step_mean(&week[split..]);
    let (Some(prior), Some(recent)) = (prior, recent) else {
        return;
    };

    if recent < prior * TREND_DECLINE_RATIO {
        out.push(insight(
            "trend",
            "orange",
            80,
            format!(
                "Your step count is trending down: {recent:.0}/day over the last 3 days \
                 vs {prior:.0}/day earlier in the week."
            ),
        ));
    } else if let Some(weekly) = step_mean(week) {
        out.push(insight(
            "trend",
            "blue",
            15,
            format!("Averaging a steady {weekly:.0} steps/day over the past week."),
        ));
    }
}

fn step_mean(days: &[DailyHealthSummary]) -> Option<f64> {
    let values: Vec<f64> = days
        .iter()
        .filter_map(|d| d.metric(MetricType::Steps))
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
