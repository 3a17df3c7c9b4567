//! Fetch-cycle orchestration.
//!
//! A cycle is request-triggered only: availability check, trailing-week and
//! today aggregation, staleness substitution, scoring, insights, then one
//! atomic publication of an immutable [`FetchCycle`] through a watch
//! channel. The only shared mutable state is the cycle guard and the
//! freshness timestamp; everything else is cycle-local.

use crate::aggregator::MetricAggregator;
use crate::insights::InsightEngine;
use crate::recovery::RecoveryScoreEngine;
use crate::registry::MetricRegistry;
use crate::score::{ScoreEngine, ScoreMode};
use crate::summary::{DailySummaryBuilder, substitute_stale_today};
use crate::types::FetchCycle;
use chrono::Utc;
use daysense_provider::{HealthProvider, ProviderError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::Instrument;
use uuid::Uuid;

/// Default freshness window: a fetch within it returns the cached cycle
/// unless forced.
pub const DEFAULT_FRESHNESS_TTL: Duration = Duration::from_secs(300);

/// The two cycle-start failures are the only errors that cross the core's
/// boundary; per-query failures degrade into absent metrics instead.
#[derive(Clone, Debug, Error)]
pub enum EngineError {
    #[error("health data access not authorized: {0}")]
    AuthorizationDenied(String),
    #[error("health store unavailable on this device: {0}")]
    StoreUnavailable(String),
    #[error("provider failure at cycle start: {0}")]
    Provider(String),
}

impl From<ProviderError> for EngineError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Auth(reason) => EngineError::AuthorizationDenied(reason),
            ProviderError::Unavailable(reason) => EngineError::StoreUnavailable(reason),
            other => EngineError::Provider(other.to_string()),
        }
    }
}

struct CycleState {
    last_completed: Option<Instant>,
    /// Monotonic count of finished cycles (successful or failed), used by
    /// piggybacking callers to detect that a cycle finished while they
    /// waited for the guard.
    finished: u64,
    last_outcome: Option<Result<Arc<FetchCycle>, EngineError>>,
}

/// Owns the provider handle and orchestrates fetch cycles.
pub struct WellnessService {
    provider: Arc<dyn HealthProvider>,
    builder: DailySummaryBuilder,
    score_engine: ScoreEngine,
    freshness_ttl: Duration,
    /// Held for the duration of a cycle; a second fetch arriving mid-cycle
    /// waits here instead of starting another cycle.
    cycle_guard: Mutex<()>,
    state: Mutex<CycleState>,
    publish: watch::Sender<Option<Arc<FetchCycle>>>,
}

impl WellnessService {
    pub fn new(provider: Arc<dyn HealthProvider>) -> Self {
        Self::with_ttl(provider, DEFAULT_FRESHNESS_TTL)
    }

    pub fn with_ttl(provider: Arc<dyn HealthProvider>, freshness_ttl: Duration) -> Self {
        let builder = DailySummaryBuilder::new(MetricAggregator::new(provider.clone()));
        let (publish, _) = watch::channel(None);
        Self {
            provider,
            builder,
            score_engine: ScoreEngine::new(MetricRegistry::standard()),
            freshness_ttl,
            cycle_guard: Mutex::new(()),
            state: Mutex::new(CycleState {
                last_completed: None,
                finished: 0,
                last_outcome: None,
            }),
            publish,
        }
    }

    /// Subscribe to cycle publications. Receivers see only finished,
    /// immutable cycles, never partial state.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<FetchCycle>>> {
        self.publish.subscribe()
    }

    /// The most recently published cycle, if any.
    pub fn latest(&self) -> Option<Arc<FetchCycle>> {
        self.publish.borrow().clone()
    }

    /// Run (or reuse) a fetch cycle.
    ///
    /// Within the freshness TTL the cached cycle is returned unless
    /// `force` is set. A fetch arriving while a cycle is in flight never
    /// starts a second cycle: it waits for the in-flight one and returns
    /// its outcome (hard serialization; no two cycles race to publish).
    pub async fn fetch(&self, force: bool) -> Result<Arc<FetchCycle>, EngineError> {
        let finished_on_arrival = self.state.lock().await.finished;
        let _guard = self.cycle_guard.lock().await;

        {
            let state = self.state.lock().await;
            // A cycle completed while we waited for the guard: piggyback on
            // its outcome rather than running again.
            if state.finished != finished_on_arrival {
                if let Some(outcome) = &state.last_outcome {
                    return outcome.clone();
                }
            }
            if !force {
                if let (Some(at), Some(Ok(cycle))) = (state.last_completed, &state.last_outcome) {
                    if at.elapsed() < self.freshness_ttl {
                        tracing::debug!(cycle_id = %cycle.cycle_id, "returning fresh cached cycle");
                        return Ok(cycle.clone());
                    }
                }
            }
        }

        let started = Instant::now();
        let cycle_id = Uuid::new_v4();
        metrics::counter!("daysense_fetch_cycles_started_total").increment(1);
        let result = self
            .run_cycle(cycle_id)
            .instrument(tracing::info_span!("fetch_cycle", %cycle_id))
            .await
            .map(Arc::new);

        let mut state = self.state.lock().await;
        state.finished += 1;
        state.last_outcome = Some(result.clone());
        match &result {
            Ok(cycle) => {
                state.last_completed = Some(Instant::now());
                metrics::counter!("daysense_fetch_cycles_completed_total").increment(1);
                metrics::histogram!("daysense_fetch_cycle_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                // send_replace stores the value even when no receiver
                // exists yet, so latest() and late subscribers see it.
                self.publish.send_replace(Some(cycle.clone()));
            }
            Err(e) => {
                metrics::counter!("daysense_fetch_cycles_failed_total").increment(1);
                tracing::warn!(error = %e, "fetch cycle failed");
            }
        }
        result
    }

    async fn run_cycle(&self, cycle_id: Uuid) -> Result<FetchCycle, EngineError> {
        // The only failures that cross the boundary: checked once, before
        // any per-metric sub-query is issued.
        self.provider.availability().await?;

        let now = Utc::now();
        let today_date = now.date_naive();

        let week = self.builder.build_trailing_week(today_date).await;
        let today = self.builder.build_day(today_date).await;
        let (mut effective, substituted) = substitute_stale_today(today, &week);
        if substituted {
            tracing::info!(date = %effective.date, "today was empty; substituted most recent non-empty day");
        }

        let mode = if substituted {
            ScoreMode::Absolute
        } else {
            ScoreMode::TimeAware { now }
        };
        let wellness = self.score_engine.score(&effective, mode);
        effective.score = wellness.as_ref().map(|w| w.value);

        let recovery = RecoveryScoreEngine::score(&effective);
        let insights = InsightEngine::generate(&effective, &week, recovery.as_ref());

        tracing::info!(
            score = ?effective.score,
            substituted,
            insights = insights.len(),
            "fetch cycle complete"
        );
        Ok(FetchCycle {
            cycle_id,
            completed_at: Utc::now(),
            today: effective,
            substituted,
            week,
            wellness,
            recovery,
            insights,
        })
    }
}
