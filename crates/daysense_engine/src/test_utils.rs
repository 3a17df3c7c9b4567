//! Shared scripted `HealthProvider` mock used by unit tests.
//!
//! Keep this module `#[cfg(test)]`-only; integration tests under `tests/`
//! carry their own copies.
#![cfg(test)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use daysense_provider::{
    AggregationKind, HealthProvider, IntervalCategory, LabelledInterval, MetricSample, MetricType,
    ProviderError, SleepLabel, TimeWindow, WorkoutSession,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// The fixed fixture day used across engine tests.
pub fn fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
}

pub fn sample(metric: MetricType, value: f64, hour: u32, minute: u32) -> MetricSample {
    let at = Utc
        .with_ymd_and_hms(2026, 8, 30, hour, minute, 0)
        .unwrap();
    MetricSample {
        metric,
        value,
        start: at,
        end: at,
        source_id: "watch-1".into(),
    }
}

/// A span sample covering `minutes` from the given hour (mindfulness
/// sessions are recorded this way).
pub fn span_sample(metric: MetricType, value: f64, hour: u32, minutes: i64) -> MetricSample {
    let start = Utc.with_ymd_and_hms(2026, 8, 30, hour, 0, 0).unwrap();
    MetricSample {
        metric,
        value,
        start,
        end: start + Duration::minutes(minutes),
        source_id: "watch-1".into(),
    }
}

pub fn workout(hour: u32, minutes: i64, energy_kcal: Option<f64>) -> WorkoutSession {
    let start = Utc.with_ymd_and_hms(2026, 8, 30, hour, 0, 0).unwrap();
    WorkoutSession {
        start,
        end: start + Duration::minutes(minutes),
        energy_kcal,
        distance_m: None,
    }
}

pub fn sleep_interval(label: SleepLabel, start_hour: u32, minutes: i64) -> LabelledInterval {
    // Starts the prior evening so the widened sleep window picks it up.
    let start = Utc
        .with_ymd_and_hms(2026, 8, 29, start_hour, 0, 0)
        .unwrap();
    LabelledInterval {
        label,
        start,
        end: start + Duration::minutes(minutes),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Availability {
    Ready,
    AuthDenied,
    Unavailable,
}

/// Scripted provider: returns exactly the data it was configured with and
/// counts data queries so tests can assert cycle-start failures happen
/// before any sub-query is issued.
pub struct ScriptedProvider {
    statistics: HashMap<MetricType, f64>,
    samples: HashMap<MetricType, Vec<MetricSample>>,
    intervals: Vec<LabelledInterval>,
    workouts: Vec<WorkoutSession>,
    availability: Availability,
    fail_data_queries: bool,
    query_delay: Option<std::time::Duration>,
    pub data_queries: Arc<AtomicU32>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            statistics: HashMap::new(),
            samples: HashMap::new(),
            intervals: Vec::new(),
            workouts: Vec::new(),
            availability: Availability::Ready,
            fail_data_queries: false,
            query_delay: None,
            data_queries: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_statistic(mut self, metric: MetricType, value: f64) -> Self {
        self.statistics.insert(metric, value);
        self
    }

    pub fn with_samples(mut self, metric: MetricType, samples: Vec<MetricSample>) -> Self {
        self.samples.insert(metric, samples);
        self
    }

    pub fn with_intervals(mut self, intervals: Vec<LabelledInterval>) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn with_workouts(mut self, workouts: Vec<WorkoutSession>) -> Self {
        self.workouts = workouts;
        self
    }

    pub fn auth_denied(mut self) -> Self {
        self.availability = Availability::AuthDenied;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.availability = Availability::Unavailable;
        self
    }

    /// Every data query errors; availability still succeeds.
    pub fn failing_queries(mut self) -> Self {
        self.fail_data_queries = true;
        self
    }

    /// Slow every data query down, so tests can overlap fetch cycles.
    pub fn with_query_delay(mut self, delay: std::time::Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    async fn count_query(&self) -> Result<(), ProviderError> {
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        self.data_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_data_queries {
            return Err(ProviderError::UnexpectedStatus {
                status: 500,
                body: "scripted failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl HealthProvider for ScriptedProvider {
    async fn availability(&self) -> Result<(), ProviderError> {
        match self.availability {
            Availability::Ready => Ok(()),
            Availability::AuthDenied => Err(ProviderError::Auth("denied by user".into())),
            Availability::Unavailable => {
                Err(ProviderError::Unavailable("no store on device".into()))
            }
        }
    }

    async fn query_statistic(
        &self,
        metric: MetricType,
        _window: TimeWindow,
        _kind: AggregationKind,
    ) -> Result<Option<f64>, ProviderError> {
        self.count_query().await?;
        Ok(self.statistics.get(&metric).copied())
    }

    async fn query_samples(
        &self,
        metric: MetricType,
        window: TimeWindow,
    ) -> Result<Vec<MetricSample>, ProviderError> {
        self.count_query().await?;
        Ok(self
            .samples
            .get(&metric)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| window.overlaps(s.start, s.end) || window.contains(s.start))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_intervals(
        &self,
        _category: IntervalCategory,
        window: TimeWindow,
    ) -> Result<Vec<LabelledInterval>, ProviderError> {
        self.count_query().await?;
        Ok(self
            .intervals
            .iter()
            .filter(|i| window.overlaps(i.start, i.end))
            .cloned()
            .collect())
    }

    async fn query_workout_sessions(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<WorkoutSession>, ProviderError> {
        self.count_query().await?;
        Ok(self
            .workouts
            .iter()
            .filter(|w| window.overlaps(w.start, w.end))
            .cloned()
            .collect())
    }
}
