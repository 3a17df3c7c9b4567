//! Reduction of raw labelled sleep intervals into a stage breakdown.

use crate::types::SleepStages;
use daysense_provider::{LabelledInterval, SleepLabel};

/// Classified night: the stage breakdown plus the coarse in-bed total used
/// only as the fallback duration when no asleep-like data exists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SleepBreakdown {
    pub stages: SleepStages,
    pub in_bed_minutes: f64,
}

impl SleepBreakdown {
    /// Total minutes labelled asleep-like (REM + core + deep, with
    /// unspecified already folded into core).
    pub fn asleep_minutes(&self) -> f64 {
        self.stages.total_asleep_minutes()
    }
}

pub struct SleepStageClassifier;

impl SleepStageClassifier {
    /// Accumulate per-stage durations.
    ///
    /// `Unspecified` buckets into core: an ambiguous asleep state defaults
    /// to light sleep rather than being dropped. `InBed` is excluded from
    /// the stage breakdown entirely; it feeds only the coarse fallback
    /// total.
    pub fn classify(intervals: &[LabelledInterval]) -> SleepBreakdown {
        let mut breakdown = SleepBreakdown::default();
        for interval in intervals {
            let minutes = interval.duration_minutes();
            match interval.label {
                SleepLabel::Awake => breakdown.stages.awake_minutes += minutes,
                SleepLabel::Rem => breakdown.stages.rem_minutes += minutes,
                SleepLabel::Core | SleepLabel::Unspecified => {
                    breakdown.stages.core_minutes += minutes
                }
                SleepLabel::Deep => breakdown.stages.deep_minutes += minutes,
                SleepLabel::InBed => breakdown.in_bed_minutes += minutes,
            }
        }
        breakdown
    }
}
