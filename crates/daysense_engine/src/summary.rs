//! Fan-out of per-metric resolution into immutable day summaries.

use crate::aggregator::{MetricAggregator, MetricValue};
use crate::types::DailyHealthSummary;
use chrono::{Duration, NaiveDate};
use daysense_provider::{MetricType, TimeWindow};
use futures_util::future::join_all;
use std::collections::BTreeMap;

/// Length of the trailing window preceding "today".
pub const TRAILING_DAYS: i64 = 7;

pub struct DailySummaryBuilder {
    aggregator: MetricAggregator,
}

impl DailySummaryBuilder {
    pub fn new(aggregator: MetricAggregator) -> Self {
        Self { aggregator }
    }

    /// Build one day's summary. All tracked metrics are resolved
    /// concurrently and merged keyed by metric type, so the result does not
    /// depend on completion order.
    pub async fn build_day(&self, date: NaiveDate) -> DailyHealthSummary {
        let window = TimeWindow::day(date);
        let resolutions = join_all(MetricType::ALL.map(|metric| async move {
            (metric, self.aggregator.resolve(metric, window).await)
        }))
        .await;

        let mut metrics = BTreeMap::new();
        let mut sleep_stages = None;
        for (metric, resolved) in resolutions {
            let Some(value) = resolved else { continue };
            if let MetricValue::Sleep { stages, .. } = &value {
                sleep_stages = stages.clone();
            }
            metrics.insert(metric, value.value());
        }

        DailyHealthSummary {
            date,
            metrics,
            sleep_stages,
            score: None,
        }
    }

    /// Build the 7 days preceding `today`, oldest to newest.
    ///
    /// Days run sequentially to bound total concurrent query fan-out, while
    /// metrics within each day stay concurrent. A day whose aggregation
    /// comes up empty still yields a summary so the series keeps its fixed
    /// length.
    pub async fn build_trailing_week(&self, today: NaiveDate) -> Vec<DailyHealthSummary> {
        let mut week = Vec::with_capacity(TRAILING_DAYS as usize);
        for offset in (1..=TRAILING_DAYS).rev() {
            let date = today - Duration::days(offset);
            week.push(self.build_day(date).await);
        }
        week
    }
}

/// Staleness substitution: when "today" resolved empty (wearable sync lag),
/// stand in the most recent non-empty day from the trailing week and flag
/// the swap so scoring switches to absolute mode.
pub fn substitute_stale_today(
    today: DailyHealthSummary,
    week: &[DailyHealthSummary],
) -> (DailyHealthSummary, bool) {
    if today.has_data() {
        return (today, false);
    }
    match week.iter().rev().find(|day| day.has_data()) {
        Some(recent) => (recent.clone(), true),
        None => (today, false),
    }
}
