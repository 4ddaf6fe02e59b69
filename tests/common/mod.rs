//! Local stand-ins for the weather vendors and the Logz.io listener.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use weather_poller::ingest::types::{ApiKey, CsvColumns, DataSourceSpec, SourceType};

pub const TEST_KEY: &str = "test-key";

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

type Params = Query<HashMap<String, String>>;

// ---------------------------------------------------------------------------
// WeatherAPI: Paris, Oslo and São Paulo are known, Garbled answers 200 with
// a body missing its fields, everything else is 404.
// ---------------------------------------------------------------------------

async fn weatherapi_current(Query(q): Params) -> Response {
    if q.get("key").map(String::as_str) != Some(TEST_KEY) {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }
    if q.get("aqi").map(String::as_str) != Some("no") {
        return (StatusCode::BAD_REQUEST, "aqi").into_response();
    }
    let (name, temp, text) = match q.get("q").map(String::as_str) {
        Some("Paris") => ("Paris", 18.5, "Partly cloudy"),
        Some("Oslo") => ("Oslo", -1.0, "Light snow"),
        Some("São Paulo") => ("São Paulo", 24.0, "Sunny"),
        Some("Garbled") => {
            return Json(json!({"location": {"name": "Garbled"}, "current": {}})).into_response()
        }
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"code": 1006, "message": "No matching location found."}})),
            )
                .into_response()
        }
    };
    Json(json!({
        "location": {"name": name, "region": "", "country": ""},
        "current": {"temp_c": temp, "condition": {"text": text, "code": 1003}}
    }))
    .into_response()
}

pub fn weatherapi_router() -> Router {
    Router::new().route("/v1/current.json", get(weatherapi_current))
}

/// Same as `weatherapi_router` but every answer takes `delay`.
pub fn slow_weatherapi_router(delay: Duration) -> Router {
    Router::new().route(
        "/v1/current.json",
        get(move |q: Params| async move {
            tokio::time::sleep(delay).await;
            weatherapi_current(q).await
        }),
    )
}

// ---------------------------------------------------------------------------
// OpenWeatherMap: geocoding + one call.
//   Paris, New York → coordinates with weather
//   Atlantis        → empty candidate list
//   Broken          → geocoding 500
//   Garbled         → geocoding 200 with an object instead of a list
//   Nowhere         → coordinates whose one-call answer has no conditions
//   Gone            → coordinates whose one-call answer is 503
// ---------------------------------------------------------------------------

async fn owm_geocode(Query(q): Params) -> Response {
    if q.get("appid").map(String::as_str) != Some(TEST_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if q.get("limit").map(String::as_str) != Some("5") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let hits = match q.get("q").map(String::as_str) {
        Some("Paris") => json!([
            {"name": "Paris", "lat": 48.85, "lon": 2.35, "country": "FR"},
            {"name": "Paris", "lat": 33.66, "lon": -95.55, "country": "US"}
        ]),
        Some("New York") => json!([{"name": "New York", "lat": 40.71, "lon": -74.0}]),
        Some("Nowhere") => json!([{"name": "Nowhere", "lat": 1.0, "lon": 1.0}]),
        Some("Gone") => json!([{"name": "Gone", "lat": 2.0, "lon": 2.0}]),
        Some("Broken") => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Some("Garbled") => json!({"lat": "north", "lon": 0}),
        _ => json!([]),
    };
    Json(hits).into_response()
}

async fn owm_onecall(Query(q): Params) -> Response {
    if q.get("appid").map(String::as_str) != Some(TEST_KEY)
        || q.get("units").map(String::as_str) != Some("metric")
    {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let lat: f64 = q.get("lat").and_then(|v| v.parse().ok()).unwrap_or(f64::NAN);
    let body = if (lat - 48.85).abs() < 1e-6 {
        json!({"current": {"temp": 17.2, "weather": [{"id": 802, "description": "scattered clouds"}]}})
    } else if (lat - 40.71).abs() < 1e-6 {
        json!({"current": {"temp": 9.0, "weather": [{"id": 500, "description": "light rain"}]}})
    } else if (lat - 1.0).abs() < 1e-6 {
        json!({"current": {"temp": 30.0, "weather": []}})
    } else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };
    Json(body).into_response()
}

pub fn openweathermap_router() -> Router {
    Router::new()
        .route("/geo/1.0/direct", get(owm_geocode))
        .route("/data/3.0/onecall", get(owm_onecall))
}

// ---------------------------------------------------------------------------
// Logz.io listener: records every POST.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Shipment {
    pub query: HashMap<String, String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct Listener {
    pub shipments: Arc<Mutex<Vec<Shipment>>>,
}

async fn listener_post(
    State(state): State<(Listener, StatusCode)>,
    Query(query): Params,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let (listener, status) = state;
    listener.shipments.lock().unwrap().push(Shipment {
        query,
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    status
}

pub fn listener_router(listener: Listener, status: StatusCode) -> Router {
    Router::new()
        .route("/", post(listener_post))
        .with_state((listener, status))
}

// ---------------------------------------------------------------------------
// Specs and fixtures
// ---------------------------------------------------------------------------

pub fn cities(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn api_spec(vendor: &str, base_url: &str, names: &[&str]) -> DataSourceSpec {
    DataSourceSpec {
        source_type: SourceType::Api,
        source_name: vendor.to_string(),
        cities: cities(names),
        credentials: Some(ApiKey::new(TEST_KEY)),
        location: None,
        columns: CsvColumns::default(),
        endpoint: Some(base_url.to_string()),
    }
}

pub fn csv_spec(path: &Path, names: &[&str]) -> DataSourceSpec {
    DataSourceSpec {
        source_type: SourceType::Csv,
        source_name: "snapshot".to_string(),
        cities: cities(names),
        credentials: None,
        location: Some(path.to_path_buf()),
        columns: CsvColumns::default(),
        endpoint: None,
    }
}

pub fn csv_snapshot() -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp csv");
    f.write_all(
        "city,temperature_celsius,description\n\
         Berlin,12.5,Overcast\n\
         Madrid,27,Clear\n\
         Zürich,9.75,Fog\n"
            .as_bytes(),
    )
    .expect("write csv");
    f
}
