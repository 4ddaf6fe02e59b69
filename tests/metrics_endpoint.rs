// tests/metrics_endpoint.rs
// Own test binary: the Prometheus recorder is process-global.
mod common;

use common::serve;
use weather_poller::metrics::Metrics;

#[tokio::test]
async fn metrics_endpoint_describes_polling_interval() {
    let metrics = Metrics::init(45).expect("install recorder");
    let base = serve(metrics.router()).await;

    let body = reqwest::get(format!("{base}/metrics"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(
        body.contains("# HELP weather_polling_interval_secs Configured seconds between fetch cycles."),
        "{body}"
    );
    assert!(body.contains("weather_polling_interval_secs 45"), "{body}");

    let health = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(health.status().as_u16(), 200);
    assert_eq!(health.text().await.unwrap(), "OK");
}
