//! Integration tests for the Open-Meteo source against a mock server.

use forecast_core::{
    ForecastDays, ForecastError, ForecastRequest, ForecastService, ForecastSource,
    provider::openmeteo::OpenMeteoSource,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ForecastRequest {
    ForecastRequest {
        latitude: 49.922,
        longitude: 14.446,
        timezone: "Europe/Berlin".into(),
    }
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 49.92,
        "longitude": 14.44,
        "elevation": 351.0,
        "timezone": "Europe/Berlin",
        "utc_offset_seconds": 7200,
        "hourly_units": {"time": "iso8601", "temperature_2m": "°C"},
        "hourly": {
            "time": ["2024-05-01T00:00", "2024-05-01T01:00", "2024-05-02T00:00"],
            "temperature_2m": [8.1, 7.6, 9.0],
            "relative_humidity_2m": [81, 84, 70],
            "weather_code": [61, 61, 3],
            "rain": [0.4, 0.0, null],
            "surface_pressure": [1002.3, 1002.0, 1004.1]
        },
        "daily": {
            "time": ["2024-05-01", "2024-05-02"],
            "sunrise": ["2024-05-01T05:31", "2024-05-02T05:29"],
            "sunset": ["2024-05-01T20:22", "2024-05-02T20:24"]
        }
    })
}

#[tokio::test]
async fn fetch_sends_location_and_parses_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "49.922"))
        .and(query_param("longitude", "14.446"))
        .and(query_param("timezone", "Europe/Berlin"))
        .and(query_param("daily", "sunrise,sunset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = OpenMeteoSource::with_base_url(format!("{}/v1/forecast", mock_server.uri()))
        .expect("client builds");

    let raw = source.fetch(&request()).await.expect("fetch succeeds");
    assert_eq!(raw.elevation, Some(351.0));
    assert_eq!(raw.utc_offset_seconds, Some(7200));
    assert!(raw.hourly.get("time").is_some());
}

#[tokio::test]
async fn fetch_reports_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": true,
                "reason": "Latitude must be in range"
            })),
        )
        .mount(&mock_server)
        .await;

    let source = OpenMeteoSource::with_base_url(mock_server.uri()).expect("client builds");

    let err = source.fetch(&request()).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("400"));
    assert!(msg.contains("Latitude must be in range"));
}

#[tokio::test]
async fn fetch_reports_invalid_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let source = OpenMeteoSource::with_base_url(mock_server.uri()).expect("client builds");

    let err = source.fetch(&request()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse Open-Meteo forecast JSON"));
}

#[tokio::test]
async fn service_load_feeds_every_view() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let source = OpenMeteoSource::with_base_url(mock_server.uri()).expect("client builds");
    let service = ForecastService::new(Box::new(source), request());

    let forecast = service.load().await.expect("load succeeds");
    assert_eq!(forecast.table().len(), 3);
    assert_eq!(forecast.table().rows()[2].rain, 0.0);

    let days = ForecastDays::try_from(1).expect("valid days");
    let report = forecast.report(days);
    assert_eq!(report.daily.len(), 1);
    assert_eq!(report.location.timezone.as_deref(), Some("Europe/Berlin"));
    assert!(report.current.is_some());

    let summary = forecast.summary().expect("table not empty");
    assert_eq!(summary.summary.data_points, 3);
    assert_eq!(summary.summary.precipitation.rainy_hours, 1);
    assert_eq!(summary.summary.temperature.max, 9.0);

    assert_eq!(forecast.week().daily_summaries.len(), 7);
}

#[tokio::test]
async fn service_load_with_empty_hourly_block() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 49.92,
            "longitude": 14.44,
            "hourly": {"time": []},
            "hourly_units": null
        })))
        .mount(&mock_server)
        .await;

    let source = OpenMeteoSource::with_base_url(mock_server.uri()).expect("client builds");
    let service = ForecastService::new(Box::new(source), request());

    let forecast = service.load().await.expect("load succeeds");
    assert!(forecast.table().is_empty());
    assert!(forecast.current().is_none());
    assert_eq!(forecast.summary().unwrap_err(), ForecastError::EmptyTable);
}
