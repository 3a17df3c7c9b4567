//! Data-driven scoring configuration: one table mapping each tracked
//! metric type to its target curve and composite weight.
//!
//! The aggregation routine, score engine and recovery engine all read this
//! table instead of carrying per-type branching. A metric present in a
//! summary but missing from the registry is silently excluded from scoring.

use daysense_provider::MetricType;
use std::collections::BTreeMap;

/// Normalization curve mapping a raw value onto `[0, 1]` against a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    /// Activity-style target: anything at or above `lower` scores 1.0,
    /// below it scores `value / lower`.
    RampUp { lower: f64 },
    /// Two-sided "goldilocks" target: in `[lower, upper]` scores 1.0,
    /// deviation is penalized on both sides.
    Goldilocks { lower: f64, upper: f64 },
}

impl Curve {
    /// Normalize `value`, with the target scaled by `target_scale`
    /// (the day-progress factor for cumulative metrics; 1.0 otherwise).
    pub fn normalize(&self, value: f64, target_scale: f64) -> f64 {
        match *self {
            Curve::RampUp { lower } => {
                let lower = lower * target_scale;
                if lower <= 0.0 {
                    return 1.0;
                }
                (value / lower).clamp(0.0, 1.0)
            }
            Curve::Goldilocks { lower, upper } => {
                let lower = lower * target_scale;
                let upper = upper * target_scale;
                if value < lower {
                    (value / lower).clamp(0.0, 1.0)
                } else if value > upper {
                    (upper / value).clamp(0.0, 1.0)
                } else {
                    1.0
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MetricConfig {
    pub curve: Curve,
    /// Contribution weight; weights across the standard registry sum to 1.0.
    pub weight: f64,
}

#[derive(Clone, Debug, Default)]
pub struct MetricRegistry {
    entries: BTreeMap<MetricType, MetricConfig>,
}

impl MetricRegistry {
    /// The standard tracked-metric table.
    pub fn standard() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            MetricType::Steps,
            MetricConfig {
                curve: Curve::RampUp { lower: 10_000.0 },
                weight: 0.20,
            },
        );
        entries.insert(
            MetricType::SleepDuration,
            MetricConfig {
                curve: Curve::Goldilocks {
                    lower: 420.0,
                    upper: 540.0,
                },
                weight: 0.20,
            },
        );
        entries.insert(
            MetricType::ActiveCalories,
            MetricConfig {
                curve: Curve::RampUp { lower: 500.0 },
                weight: 0.15,
            },
        );
        entries.insert(
            MetricType::HeartRateVariability,
            MetricConfig {
                curve: Curve::RampUp { lower: 60.0 },
                weight: 0.10,
            },
        );
        entries.insert(
            MetricType::RestingHeartRate,
            MetricConfig {
                curve: Curve::Goldilocks {
                    lower: 40.0,
                    upper: 60.0,
                },
                weight: 0.10,
            },
        );
        entries.insert(
            MetricType::WorkoutMinutes,
            MetricConfig {
                curve: Curve::RampUp { lower: 30.0 },
                weight: 0.10,
            },
        );
        entries.insert(
            MetricType::HeartRate,
            MetricConfig {
                curve: Curve::Goldilocks {
                    lower: 50.0,
                    upper: 80.0,
                },
                weight: 0.05,
            },
        );
        entries.insert(
            MetricType::BloodOxygen,
            MetricConfig {
                curve: Curve::RampUp { lower: 95.0 },
                weight: 0.05,
            },
        );
        entries.insert(
            MetricType::MindfulMinutes,
            MetricConfig {
                curve: Curve::RampUp { lower: 10.0 },
                weight: 0.05,
            },
        );
        Self { entries }
    }

    pub fn insert(&mut self, metric: MetricType, config: MetricConfig) {
        self.entries.insert(metric, config);
    }

    pub fn config(&self, metric: MetricType) -> Option<&MetricConfig> {
        self.entries.get(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricType, &MetricConfig)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_weights_sum_to_one() {
        let total: f64 = MetricRegistry::standard().iter().map(|(_, c)| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-9, "weights sum to {total}");
    }

    #[test]
    fn every_tracked_metric_has_a_config() {
        let registry = MetricRegistry::standard();
        for metric in MetricType::ALL {
            assert!(registry.config(metric).is_some(), "missing {metric:?}");
        }
    }

    #[test]
    fn ramp_up_scores_full_at_and_above_target() {
        let curve = Curve::RampUp { lower: 10_000.0 };
        assert_eq!(curve.normalize(10_000.0, 1.0), 1.0);
        assert_eq!(curve.normalize(15_000.0, 1.0), 1.0);
        assert_eq!(curve.normalize(4_000.0, 1.0), 0.4);
        assert_eq!(curve.normalize(0.0, 1.0), 0.0);
    }

    #[test]
    fn ramp_up_scales_target_by_day_progress() {
        // 4000 steps against a 10000 target at half a day scores 0.8.
        let curve = Curve::RampUp { lower: 10_000.0 };
        assert_eq!(curve.normalize(4_000.0, 0.5), 0.8);
    }

    #[test]
    fn goldilocks_penalizes_both_sides() {
        let curve = Curve::Goldilocks {
            lower: 40.0,
            upper: 60.0,
        };
        assert_eq!(curve.normalize(50.0, 1.0), 1.0);
        assert_eq!(curve.normalize(40.0, 1.0), 1.0);
        assert_eq!(curve.normalize(60.0, 1.0), 1.0);
        assert_eq!(curve.normalize(30.0, 1.0), 0.75);
        assert_eq!(curve.normalize(80.0, 1.0), 0.75);
    }
}
