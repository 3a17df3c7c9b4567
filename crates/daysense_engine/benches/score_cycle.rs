use async_trait::async_trait;
use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use daysense_engine::{
    DailyHealthSummary, InsightEngine, MetricRegistry, ScoreEngine, ScoreMode, WellnessService,
};
use daysense_provider::{
    AggregationKind, HealthProvider, IntervalCategory, LabelledInterval, MetricSample, MetricType,
    ProviderError, TimeWindow, WorkoutSession,
};
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Builder;

/// Answers every query instantly with a plausible value, so the bench
/// measures the cycle machinery rather than provider latency.
struct InstantProvider;

#[async_trait]
impl HealthProvider for InstantProvider {
    async fn availability(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn query_statistic(
        &self,
        metric: MetricType,
        _window: TimeWindow,
        _kind: AggregationKind,
    ) -> Result<Option<f64>, ProviderError> {
        Ok(Some(match metric {
            MetricType::Steps => 8_432.0,
            MetricType::HeartRate => 72.0,
            MetricType::HeartRateVariability => 55.0,
            MetricType::RestingHeartRate => 58.0,
            MetricType::ActiveCalories => 430.0,
            MetricType::BloodOxygen => 97.0,
            MetricType::SleepDuration => 451.0,
            MetricType::MindfulMinutes => 12.0,
            MetricType::WorkoutMinutes => 35.0,
        }))
    }

    async fn query_samples(
        &self,
        _metric: MetricType,
        _window: TimeWindow,
    ) -> Result<Vec<MetricSample>, ProviderError> {
        Ok(vec![])
    }

    async fn query_intervals(
        &self,
        _category: IntervalCategory,
        _window: TimeWindow,
    ) -> Result<Vec<LabelledInterval>, ProviderError> {
        Ok(vec![])
    }

    async fn query_workout_sessions(
        &self,
        _window: TimeWindow,
    ) -> Result<Vec<WorkoutSession>, ProviderError> {
        Ok(vec![])
    }
}

fn populated_summary() -> DailyHealthSummary {
    let mut summary = DailyHealthSummary::empty(Utc::now().date_naive());
    summary.metrics.insert(MetricType::Steps, 8_432.0);
    summary.metrics.insert(MetricType::SleepDuration, 451.0);
    summary.metrics.insert(MetricType::ActiveCalories, 430.0);
    summary.metrics.insert(MetricType::HeartRateVariability, 55.0);
    summary.metrics.insert(MetricType::RestingHeartRate, 58.0);
    summary.metrics.insert(MetricType::WorkoutMinutes, 35.0);
    summary.metrics.insert(MetricType::HeartRate, 72.0);
    summary.metrics.insert(MetricType::BloodOxygen, 97.0);
    summary.metrics.insert(MetricType::MindfulMinutes, 12.0);
    summary
}

fn bench_score_full_summary(c: &mut Criterion) {
    let engine = ScoreEngine::new(MetricRegistry::standard());
    let summary = populated_summary();
    c.bench_function("score_full_summary", |b| {
        b.iter(|| engine.score(black_box(&summary), ScoreMode::Absolute))
    });
}

fn bench_insights_over_week(c: &mut Criterion) {
    let today = populated_summary();
    let week: Vec<DailyHealthSummary> = (0..7).map(|_| populated_summary()).collect();
    c.bench_function("insights_over_week", |b| {
        b.iter(|| InsightEngine::generate(black_box(&today), black_box(&week), None))
    });
}

fn bench_forced_fetch_cycle(c: &mut Criterion) {
    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let service = WellnessService::new(Arc::new(InstantProvider));
    c.bench_function("forced_fetch_cycle", |b| {
        b.to_async(&rt)
            .iter(|| async { service.fetch(true).await.expect("cycle") })
    });
}

criterion_group!(
    benches,
    bench_score_full_summary,
    bench_insights_over_week,
    bench_forced_fetch_cycle
);
criterion_main!(benches);
