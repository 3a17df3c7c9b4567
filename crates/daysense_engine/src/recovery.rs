//! Secondary recovery composite over HRV, resting heart rate and sleep.

use crate::types::{DailyHealthSummary, RecoveryScore};
use daysense_provider::MetricType;

/// Below this score a rest day is recommended.
pub const REST_THRESHOLD: u8 = 40;

const HRV_WEIGHT: f64 = 0.4;
const RESTING_HR_WEIGHT: f64 = 0.3;
const SLEEP_WEIGHT: f64 = 0.3;

/// Resting HR mapping is inverted: lower is better. 45 bpm or less maps to
/// 1.0, 90 bpm or more to 0.0.
const RESTING_HR_BEST: f64 = 45.0;
const RESTING_HR_WORST: f64 = 90.0;
/// Full marks at or above this HRV (ms) and this much sleep (minutes).
const HRV_FULL: f64 = 60.0;
const SLEEP_FULL_MINUTES: f64 = 480.0;

pub struct RecoveryScoreEngine;

impl RecoveryScoreEngine {
    /// Combine whichever of the three inputs are present, renormalizing the
    /// weights over that subset. A missing input contributes neither value
    /// nor weight; it is never treated as zero. `None` when all three are
    /// absent.
    pub fn score(summary: &DailyHealthSummary) -> Option<RecoveryScore> {
        let components = [
            (
                HRV_WEIGHT,
                summary
                    .metric(MetricType::HeartRateVariability)
                    .map(normalize_hrv),
            ),
            (
                RESTING_HR_WEIGHT,
                summary
                    .metric(MetricType::RestingHeartRate)
                    .map(normalize_resting_hr),
            ),
            (
                SLEEP_WEIGHT,
                summary
                    .metric(MetricType::SleepDuration)
                    .map(normalize_sleep),
            ),
        ];

        let mut weighted = 0.0;
        let mut weight_sum = 0.0;
        for (weight, normalized) in components {
            if let Some(n) = normalized {
                weighted += weight * n;
                weight_sum += weight;
            }
        }
        if weight_sum <= 0.0 {
            return None;
        }

        let value = (100.0 * weighted / weight_sum).round() as u8;
        Some(RecoveryScore {
            value,
            should_rest: Self::should_rest(value),
        })
    }

    pub fn should_rest(score: u8) -> bool {
        score < REST_THRESHOLD
    }
}

fn normalize_hrv(value: f64) -> f64 {
    (value / HRV_FULL).clamp(0.0, 1.0)
}

fn normalize_resting_hr(value: f64) -> f64 {
    ((RESTING_HR_WORST - value) / (RESTING_HR_WORST - RESTING_HR_BEST)).clamp(0.0, 1.0)
}

fn normalize_sleep(minutes: f64) -> f64 {
    (minutes / SLEEP_FULL_MINUTES).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture_date;
    use std::collections::BTreeMap;

    fn summary(metrics: &[(MetricType, f64)]) -> DailyHealthSummary {
        DailyHealthSummary {
            date: fixture_date(),
            metrics: metrics.iter().copied().collect::<BTreeMap<_, _>>(),
            sleep_stages: None,
            score: None,
        }
    }

    #[test]
    fn full_inputs_at_targets_score_100() {
        let s = summary(&[
            (MetricType::HeartRateVariability, 65.0),
            (MetricType::RestingHeartRate, 45.0),
            (MetricType::SleepDuration, 480.0),
        ]);
        let r = RecoveryScoreEngine::score(&s).unwrap();
        assert_eq!(r.value, 100);
        assert!(!r.should_rest);
    }

    #[test]
    fn missing_hrv_renormalizes_to_half_half() {
        // Resting HR perfect, sleep at zero: with HRV absent the effective
        // weights are 0.5/0.5, so the composite lands at exactly 50.
        let s = summary(&[
            (MetricType::RestingHeartRate, 45.0),
            (MetricType::SleepDuration, 0.0),
        ]);
        let r = RecoveryScoreEngine::score(&s).unwrap();
        assert_eq!(r.value, 50);
    }

    #[test]
    fn missing_hrv_is_not_treated_as_zero() {
        let with_perfect_pair = summary(&[
            (MetricType::RestingHeartRate, 45.0),
            (MetricType::SleepDuration, 480.0),
        ]);
        // If absent HRV counted as 0 at weight 0.4, this would cap at 60.
        let r = RecoveryScoreEngine::score(&with_perfect_pair).unwrap();
        assert_eq!(r.value, 100);
    }

    #[test]
    fn all_inputs_absent_yields_none() {
        let s = summary(&[(MetricType::Steps, 9000.0)]);
        assert!(RecoveryScoreEngine::score(&s).is_none());
    }

    #[test]
    fn low_recovery_recommends_rest() {
        let s = summary(&[
            (MetricType::HeartRateVariability, 18.0),
            (MetricType::RestingHeartRate, 82.0),
            (MetricType::SleepDuration, 240.0),
        ]);
        let r = RecoveryScoreEngine::score(&s).unwrap();
        assert!(r.value < REST_THRESHOLD);
        assert!(r.should_rest);
    }

    #[test]
    fn inverted_resting_hr_rewards_lower_values() {
        assert!(normalize_resting_hr(50.0) > normalize_resting_hr(70.0));
        assert_eq!(normalize_resting_hr(40.0), 1.0);
        assert_eq!(normalize_resting_hr(95.0), 0.0);
    }
}
