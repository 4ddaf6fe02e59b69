// src/ingest/providers/weatherapi.rs
use async_trait::async_trait;
use metrics::histogram;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{join_url, CityProvider};
use crate::error::FetchError;
use crate::ingest::types::{ApiKey, WeatherRecord};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    location: Location,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_c: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

/// WeatherAPI.com: a single `current.json` lookup per city.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: ApiKey,
    base_url: String,
}

impl WeatherApiProvider {
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
}

#[async_trait]
impl CityProvider for WeatherApiProvider {
    async fn fetch_one_city(
        &self,
        client: &Client,
        city: &str,
    ) -> Result<WeatherRecord, FetchError> {
        let t0 = std::time::Instant::now();
        let rsp = client
            .get(join_url(&self.base_url, "/v1/current.json"))
            .query(&[("key", self.api_key.expose()), ("q", city), ("aqi", "no")])
            .send()
            .await?;
        if rsp.status() != StatusCode::OK {
            return Err(FetchError::status("current weather", rsp.status()));
        }
        let body: CurrentResponse = rsp.json().await?;
        histogram!("weather_fetch_ms", "provider" => self.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);

        Ok(WeatherRecord {
            city: body.location.name,
            temperature_celsius: body.current.temp_c,
            description: body.current.condition.text,
            source_provider: self.name().to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "weatherapi"
    }
}
