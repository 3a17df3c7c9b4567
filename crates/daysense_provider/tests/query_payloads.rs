use chrono::{NaiveDate, TimeZone, Utc};
use daysense_provider::http_client::ReqwestHealthProvider;
use daysense_provider::{
    AggregationKind, HealthProvider, IntervalCategory, MetricType, SleepLabel, TimeWindow,
};
use secrecy::SecretString;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day_window() -> TimeWindow {
    TimeWindow::day(NaiveDate::from_ymd_opt(2026, 8, 30).unwrap())
}

fn provider(uri: &str) -> ReqwestHealthProvider {
    ReqwestHealthProvider::new(uri, SecretString::new("test-token".into()))
}

#[tokio::test]
async fn query_statistic_sends_bearer_token_and_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("metric", "steps"))
        .and(query_param("kind", "cumulative_sum"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 8432.0})))
        .mount(&server)
        .await;

    let value = provider(&server.uri())
        .query_statistic(MetricType::Steps, day_window(), AggregationKind::CumulativeSum)
        .await
        .expect("statistic");
    assert_eq!(value, Some(8432.0));
}

#[tokio::test]
async fn query_statistic_null_value_is_none_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": null})))
        .mount(&server)
        .await;

    let value = provider(&server.uri())
        .query_statistic(
            MetricType::HeartRate,
            day_window(),
            AggregationKind::RepresentativeAverage,
        )
        .await
        .expect("statistic");
    assert_eq!(value, None);
}

#[tokio::test]
async fn query_samples_decodes_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/samples"))
        .and(query_param("metric", "heart_rate_variability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "metric": "heart_rate_variability",
                "value": 52.5,
                "start": "2026-08-30T07:00:00Z",
                "end": "2026-08-30T07:00:00Z",
                "source_id": "watch-1"
            }
        ])))
        .mount(&server)
        .await;

    let samples = provider(&server.uri())
        .query_samples(MetricType::HeartRateVariability, day_window())
        .await
        .expect("samples");
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].value, 52.5);
    assert_eq!(samples[0].source_id, "watch-1");
    assert_eq!(
        samples[0].start,
        Utc.with_ymd_and_hms(2026, 8, 30, 7, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn query_intervals_decodes_labels() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/intervals"))
        .and(query_param("category", "sleep"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"label": "deep", "start": "2026-08-30T01:00:00Z", "end": "2026-08-30T02:30:00Z"},
            {"label": "in_bed", "start": "2026-08-30T00:30:00Z", "end": "2026-08-30T08:00:00Z"},
            {"label": "mystery", "start": "2026-08-30T02:30:00Z", "end": "2026-08-30T03:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let intervals = provider(&server.uri())
        .query_intervals(IntervalCategory::Sleep, day_window().widened_start(12))
        .await
        .expect("intervals");
    assert_eq!(intervals.len(), 3);
    assert_eq!(intervals[0].label, SleepLabel::Deep);
    assert_eq!(intervals[1].label, SleepLabel::InBed);
    assert_eq!(intervals[2].label, SleepLabel::Unspecified);
}

#[tokio::test]
async fn query_workout_sessions_decodes_optional_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "start": "2026-08-30T17:00:00Z",
                "end": "2026-08-30T17:45:00Z",
                "energy_kcal": 310.0,
                "distance_m": null
            }
        ])))
        .mount(&server)
        .await;

    let sessions = provider(&server.uri())
        .query_workout_sessions(day_window())
        .await
        .expect("workouts");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].energy_kcal, Some(310.0));
    assert_eq!(sessions[0].distance_m, None);
    assert_eq!(sessions[0].duration_minutes(), 45.0);
}
