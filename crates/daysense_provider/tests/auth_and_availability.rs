use daysense_provider::http_client::ReqwestHealthProvider;
use daysense_provider::retry::RetryPolicy;
use daysense_provider::{HealthProvider, MetricType, ProviderError, TimeWindow};
use chrono::NaiveDate;
use secrecy::SecretString;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day_window() -> TimeWindow {
    TimeWindow::day(NaiveDate::from_ymd_opt(2026, 8, 30).unwrap())
}

fn provider(uri: &str) -> ReqwestHealthProvider {
    ReqwestHealthProvider::new(uri, SecretString::new("tok".into())).with_retry(RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
    })
}

#[tokio::test]
async fn availability_ok_when_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ready": true})))
        .mount(&server)
        .await;

    assert!(provider(&server.uri()).availability().await.is_ok());
}

#[tokio::test]
async fn availability_maps_401_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(401).set_body_string("no access"))
        .mount(&server)
        .await;

    let err = provider(&server.uri()).availability().await.unwrap_err();
    assert!(matches!(err, ProviderError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn availability_maps_not_ready_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"ready": false, "reason": "no health store on this device"}),
        ))
        .mount(&server)
        .await;

    let err = provider(&server.uri()).availability().await.unwrap_err();
    match err {
        ProviderError::Unavailable(reason) => {
            assert_eq!(reason, "no health store on this device")
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn availability_maps_503_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = provider(&server.uri()).availability().await.unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable(_)), "got {err:?}");
}

#[tokio::test]
async fn transient_500_is_retried_until_success() {
    let server = MockServer::start().await;

    // First two attempts fail, third succeeds.
    Mock::given(method("GET"))
        .and(path("/api/v1/samples"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/samples"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let samples = provider(&server.uri())
        .query_samples(MetricType::Steps, day_window())
        .await
        .expect("samples after retries");
    assert!(samples.is_empty());
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/samples"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server.uri())
        .query_samples(MetricType::Steps, day_window())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Auth(_)), "got {err:?}");
}
