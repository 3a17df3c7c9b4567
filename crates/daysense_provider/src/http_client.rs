//! HTTP implementation of [`HealthProvider`] against the local health-bridge
//! gateway.
//!
//! The bridge exposes the device health store over a small REST surface:
//! `/api/v1/status`, `/statistics`, `/samples`, `/intervals`, `/workouts`.
//! Transient transport failures (5xx, connection errors) are retried with
//! backoff; authorization and availability failures are surfaced as typed
//! errors and never retried.

use crate::observability::{record_failure, record_query};
use crate::retry::RetryPolicy;
use crate::{
    AggregationKind, HealthProvider, IntervalCategory, LabelledInterval, MetricSample, MetricType,
    ProviderError, TimeWindow, WorkoutSession,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StatusPayload {
    ready: bool,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatisticPayload {
    value: Option<f64>,
}

/// Provider implementation backed by the health-bridge REST gateway.
pub struct ReqwestHealthProvider {
    base_url: String,
    access_token: SecretString,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ReqwestHealthProvider {
    pub fn new(base_url: &str, access_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
    }

    /// Execute an authenticated GET with query parameters, expecting JSON.
    /// Retries transient failures per the configured policy.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        record_query(endpoint);
        let url = self.url(endpoint);
        let result = self
            .retry
            .retry_async(
                || async {
                    let resp = self.get_request(&url).query(query).send().await?;
                    self.handle_response(resp).await
                },
                ProviderError::is_transient,
            )
            .await;
        if let Err(e) = &result {
            record_failure(endpoint);
            tracing::debug!(endpoint, error = %e, "bridge query failed");
        }
        result
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> ProviderError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            401 | 403 => ProviderError::Auth(body_snippet),
            503 => ProviderError::Unavailable(body_snippet),
            _ => ProviderError::UnexpectedStatus {
                status,
                body: body_snippet,
            },
        }
    }

    fn window_params(window: TimeWindow) -> [(&'static str, String); 2] {
        [
            ("start", window.start.to_rfc3339()),
            ("end", window.end.to_rfc3339()),
        ]
    }
}

#[async_trait]
impl HealthProvider for ReqwestHealthProvider {
    async fn availability(&self) -> Result<(), ProviderError> {
        let status: StatusPayload = self.get_json("status", &[]).await?;
        if status.ready {
            Ok(())
        } else {
            Err(ProviderError::Unavailable(
                status.reason.unwrap_or_else(|| "store not ready".into()),
            ))
        }
    }

    async fn query_statistic(
        &self,
        metric: MetricType,
        window: TimeWindow,
        kind: AggregationKind,
    ) -> Result<Option<f64>, ProviderError> {
        let [start, end] = Self::window_params(window);
        let payload: StatisticPayload = self
            .get_json(
                "statistics",
                &[
                    ("metric", metric.as_str().to_string()),
                    ("kind", kind.as_str().to_string()),
                    start,
                    end,
                ],
            )
            .await?;
        Ok(payload.value)
    }

    async fn query_samples(
        &self,
        metric: MetricType,
        window: TimeWindow,
    ) -> Result<Vec<MetricSample>, ProviderError> {
        let [start, end] = Self::window_params(window);
        self.get_json(
            "samples",
            &[("metric", metric.as_str().to_string()), start, end],
        )
        .await
    }

    async fn query_intervals(
        &self,
        category: IntervalCategory,
        window: TimeWindow,
    ) -> Result<Vec<LabelledInterval>, ProviderError> {
        let [start, end] = Self::window_params(window);
        self.get_json(
            "intervals",
            &[("category", category.as_str().to_string()), start, end],
        )
        .await
    }

    async fn query_workout_sessions(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<WorkoutSession>, ProviderError> {
        self.get_json("workouts", &Self::window_params(window)).await
    }
}
