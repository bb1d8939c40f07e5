// tests/providers_http.rs
//
// Providers against a local wiremock server: payload parsing, non-2xx, timeouts.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use spearfishing_conditions::ingest::{
    collect_readings, metservice::MetServiceProvider, open_meteo::OpenMeteoProvider,
    webcam::WebcamProvider, SourceProvider, KAIKOURA,
};
use spearfishing_conditions::model::{Availability, RawQuantity, RawValue, SourceKind};
use spearfishing_conditions::{Pipeline, ScoringConfig, SourceScore};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(2);

fn marine_body() -> serde_json::Value {
    json!({
        "latitude": -42.4,
        "longitude": 173.7,
        "hourly_units": {"time": "iso8601", "wave_height": "m", "wave_direction": "°", "wave_period": "s"},
        "hourly": {
            "time": ["2026-10-16T06:00", "2026-10-16T07:00", "2026-10-16T08:00"],
            "wave_height": [0.6, 0.7, 0.8],
            "wave_direction": [140.0, 140.0, 145.0],
            "wave_period": [9.0, 10.0, 11.0]
        },
        "daily_units": {"time": "iso8601", "wave_height_max": "m"},
        "daily": {"time": ["2026-10-16"], "wave_height_max": [1.0]}
    })
}

fn forecast_body(unit: &str) -> serde_json::Value {
    json!({
        "hourly_units": {"time": "iso8601", "wind_speed_10m": unit, "wind_direction_10m": "°"},
        "hourly": {
            "time": ["2026-10-16T06:00", "2026-10-16T07:00"],
            "temperature_2m": [11.2, 12.0],
            "wind_speed_10m": [20.0, 10.8],
            "wind_direction_10m": [300.0, 290.0],
            "precipitation_probability": [10.0, 5.0]
        }
    })
}

async fn mount_open_meteo(server: &MockServer, wind_unit: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/marine"))
        .and(query_param("daily", "wave_height_max"))
        .respond_with(ResponseTemplate::new(200).set_body_json(marine_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("wind_speed_unit", "ms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(wind_unit)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn open_meteo_reads_morning_values_with_declared_units() {
    let server = MockServer::start().await;
    mount_open_meteo(&server, "km/h").await;

    let p = OpenMeteoProvider::with_base_urls(&KAIKOURA, TIMEOUT, &server.uri(), &server.uri());
    let readings = p.fetch().await.unwrap();

    assert_eq!(readings.len(), 2);
    assert_eq!(
        readings[0].availability,
        Availability::Present(RawValue::Swell {
            height: RawQuantity::number(1.0, "m"),
            period: Some(RawQuantity::number(10.0, "s")),
        })
    );
    assert_eq!(
        readings[1].availability,
        Availability::Present(RawValue::Wind {
            speed: RawQuantity::number(10.8, "km/h"),
            direction: Some(RawQuantity::number(290.0, "°")),
            precipitation: Some(RawQuantity::number(5.0, "%")),
        })
    );
}

#[tokio::test]
async fn open_meteo_marine_outage_only_affects_swell() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/marine"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("m/s")))
        .mount(&server)
        .await;

    let p = OpenMeteoProvider::with_base_urls(&KAIKOURA, TIMEOUT, &server.uri(), &server.uri());
    let readings = p.fetch().await.unwrap();
    assert!(matches!(&readings[0].availability, Availability::Error(e) if e.contains("502")));
    assert!(matches!(readings[1].availability, Availability::Present(_)));
}

#[tokio::test]
async fn metservice_non_2xx_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let p = MetServiceProvider::with_url(&format!("{}/publicData/localForecastKaikoura", server.uri()), TIMEOUT);
    let err = p.fetch().await.unwrap_err();
    assert!(err.to_string().contains("HTTP 500"), "{err}");
}

#[tokio::test]
async fn metservice_bad_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let p = MetServiceProvider::with_url(&server.uri(), TIMEOUT);
    let err = p.fetch().await.unwrap_err();
    assert!(err.to_string().contains("unexpected payload"), "{err}");
}

#[tokio::test]
async fn webcams_count_non_empty_images() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::<u8>::new()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let cams = ["a", "b", "c"]
        .iter()
        .map(|n| (n.to_string(), format!("{}/{n}.jpg", server.uri())))
        .collect();
    let readings = WebcamProvider::new(cams, TIMEOUT).fetch().await.unwrap();
    assert_eq!(
        readings[0].availability,
        Availability::Present(RawValue::Webcam {
            image_sizes: vec![4],
            attempted: 3,
        })
    );
}

#[tokio::test]
async fn all_webcams_down_is_error_reading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let cams = vec![("only".to_string(), format!("{}/x.jpg", server.uri()))];
    let readings = WebcamProvider::new(cams, TIMEOUT).fetch().await.unwrap();
    assert!(matches!(&readings[0].availability, Availability::Error(e) if e.starts_with("only:")));
}

#[tokio::test]
async fn slow_upstream_hits_timeout_and_cycle_completes() {
    let server = MockServer::start().await;
    mount_open_meteo(&server, "m/s").await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({"days": [{"forecastWord": "Fine"}]})),
        )
        .mount(&server)
        .await;

    let timeout = Duration::from_secs(1);
    let providers: Vec<Arc<dyn SourceProvider>> = vec![
        Arc::new(OpenMeteoProvider::with_base_urls(&KAIKOURA, timeout, &server.uri(), &server.uri())),
        Arc::new(MetServiceProvider::with_url(&format!("{}/forecast", server.uri()), timeout)),
    ];

    let started = std::time::Instant::now();
    let readings = collect_readings(&providers, timeout).await;
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(matches!(readings[2].availability, Availability::Error(_)));

    let pipeline = Pipeline::new(providers, Arc::new(ScoringConfig::default()), timeout);
    let rating = pipeline.rate().await;
    assert_eq!(
        rating.source(SourceKind::Forecast).unwrap().score.value(),
        None
    );
    // swell 1.0 m @ 10 s → 76; wind 10.8 m/s offshore → 31; mean 53.5 → 54
    assert_eq!(rating.source(SourceKind::Swell).unwrap().score, SourceScore::Available(76));
    assert_eq!(rating.source(SourceKind::Wind).unwrap().score, SourceScore::Available(31));
    assert_eq!(rating.overall, Some(54));
}

#[tokio::test]
async fn one_hanging_webcam_does_not_starve_the_others() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_bytes(vec![0xFF; 16]),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xAB; 64]))
        .mount(&server)
        .await;

    let timeout = Duration::from_secs(1);
    let cams = vec![
        ("slow".to_string(), format!("{}/slow.jpg", server.uri())),
        ("ok-1".to_string(), format!("{}/ok.jpg", server.uri())),
        ("ok-2".to_string(), format!("{}/ok.jpg", server.uri())),
    ];
    let providers: Vec<Arc<dyn SourceProvider>> = vec![Arc::new(WebcamProvider::new(cams, timeout))];

    let readings = collect_readings(&providers, timeout).await;
    assert_eq!(
        readings[3].availability,
        Availability::Present(RawValue::Webcam {
            image_sizes: vec![64, 64],
            attempted: 3,
        })
    );
}
