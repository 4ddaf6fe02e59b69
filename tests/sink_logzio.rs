// tests/sink_logzio.rs
mod common;

use axum::http::StatusCode;
use common::{dead_url, listener_router, serve, Listener};
use reqwest::Url;
use weather_poller::sink::{logzio::LogzIoSink, BatchSink};
use weather_poller::{Batch, WeatherRecord};

fn batch() -> Batch {
    Batch::from(vec![
        WeatherRecord {
            city: "Paris".into(),
            temperature_celsius: 18.5,
            description: "Partly cloudy".into(),
            source_provider: "weatherapi".into(),
        },
        WeatherRecord {
            city: "Zürich".into(),
            temperature_celsius: 9.75,
            description: "Fog".into(),
            source_provider: "snapshot".into(),
        },
    ])
}

async fn sink_for(listener: Listener, status: StatusCode) -> LogzIoSink {
    let base = serve(listener_router(listener, status)).await;
    let url = Url::parse_with_params(&format!("{base}/"), &[("token", "s3cr3t")]).unwrap();
    LogzIoSink::with_url(url)
}

#[tokio::test]
async fn posts_one_json_object_per_line_with_token() {
    let listener = Listener::default();
    let sink = sink_for(listener.clone(), StatusCode::OK).await;

    let status = sink.send(&batch()).await;
    assert_eq!(status, Some(200));

    let shipments = listener.shipments.lock().unwrap();
    assert_eq!(shipments.len(), 1);
    let shipped = &shipments[0];
    assert_eq!(shipped.query.get("token").map(String::as_str), Some("s3cr3t"));
    assert_eq!(shipped.content_type.as_deref(), Some("application/json"));

    let lines: Vec<WeatherRecord> = shipped
        .body
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines, batch().into_records());
}

#[tokio::test]
async fn listener_status_is_passed_through() {
    let sink = sink_for(Listener::default(), StatusCode::UNAUTHORIZED).await;
    assert_eq!(sink.send(&batch()).await, Some(401));
}

#[tokio::test]
async fn unreachable_listener_yields_none() {
    let url = Url::parse(&format!("{}/?token=t", dead_url().await)).unwrap();
    let sink = LogzIoSink::with_url(url).with_timeout(2);
    assert_eq!(sink.send(&batch()).await, None);
}
