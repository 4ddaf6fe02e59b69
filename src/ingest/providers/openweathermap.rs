// src/ingest/providers/openweathermap.rs
use async_trait::async_trait;
use metrics::histogram;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{join_url, CityProvider};
use crate::error::FetchError;
use crate::ingest::types::{ApiKey, WeatherRecord};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// How many geocoding candidates to ask for; only the first is used.
const GEOCODE_LIMIT: &str = "5";

#[derive(Debug, Deserialize)]
struct GeoCandidate {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp: f64,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

/// OpenWeatherMap: geocoding lookup, then a One Call lookup on the coordinates.
#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    api_key: ApiKey,
    base_url: String,
}

impl OpenWeatherMapProvider {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn geocode(&self, client: &Client, city: &str) -> Result<(f64, f64), FetchError> {
        let rsp = client
            .get(join_url(&self.base_url, "/geo/1.0/direct"))
            .query(&[
                ("q", city),
                ("limit", GEOCODE_LIMIT),
                ("appid", self.api_key.expose()),
            ])
            .send()
            .await?;
        if rsp.status() != StatusCode::OK {
            return Err(FetchError::status("geocoding", rsp.status()));
        }
        let candidates: Vec<GeoCandidate> = rsp.json().await?;
        let first = candidates.first().ok_or(FetchError::NoGeocodeMatch)?;
        Ok((first.lat, first.lon))
    }
}

#[async_trait]
impl CityProvider for OpenWeatherMapProvider {
    async fn fetch_one_city(
        &self,
        client: &Client,
        city: &str,
    ) -> Result<WeatherRecord, FetchError> {
        let t0 = std::time::Instant::now();
        let (lat, lon) = self.geocode(client, city).await?;

        let rsp = client
            .get(join_url(&self.base_url, "/data/3.0/onecall"))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.expose().to_string()),
            ])
            .send()
            .await?;
        if rsp.status() != StatusCode::OK {
            return Err(FetchError::status("one call", rsp.status()));
        }
        let body: OneCallResponse = rsp.json().await?;
        let description = body
            .current
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or(FetchError::MissingField("current.weather[0]"))?;
        histogram!("weather_fetch_ms", "provider" => self.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);

        Ok(WeatherRecord {
            city: city.to_string(),
            temperature_celsius: body.current.temp,
            description,
            source_provider: self.name().to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "openweathermap"
    }
}
