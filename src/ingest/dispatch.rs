// src/ingest/dispatch.rs
use metrics::counter;
use reqwest::Client;

use crate::error::{ConfigError, ReadError};
use crate::ingest::providers::{
    csv_file::CsvSource, openweathermap::OpenWeatherMapProvider, weatherapi::WeatherApiProvider,
    CityProvider,
};
use crate::ingest::types::{DataSourceSpec, FetchOutcome, SourceType, WeatherRecord};

/// The closed set of adapters a source can resolve to.
#[derive(Debug, Clone)]
pub enum SourceAdapter {
    Csv(CsvSource),
    WeatherApi(WeatherApiProvider),
    OpenWeatherMap(OpenWeatherMapProvider),
}

/// A data source resolved to its adapter once, at configuration load.
#[derive(Debug, Clone)]
pub struct ConfiguredSource {
    name: String,
    cities: Vec<String>,
    adapter: SourceAdapter,
}

impl ConfiguredSource {
    pub fn from_spec(spec: &DataSourceSpec) -> Result<Self, ConfigError> {
        if spec.cities.is_empty() {
            return Err(ConfigError::NoCities {
                source_name: spec.source_name.clone(),
            });
        }

        let adapter = match spec.source_type {
            SourceType::Csv => {
                let path = spec
                    .location
                    .clone()
                    .ok_or_else(|| ConfigError::MissingLocation {
                        source_name: spec.source_name.clone(),
                    })?;
                // A csv source named after its own file has no separate vendor tag.
                let provider = (spec.source_name != path.display().to_string())
                    .then(|| spec.source_name.clone());
                SourceAdapter::Csv(CsvSource::new(path, spec.columns.clone(), provider))
            }
            SourceType::Api => {
                let key = || {
                    spec.credentials
                        .clone()
                        .ok_or_else(|| ConfigError::MissingApiKey {
                            source_name: spec.source_name.clone(),
                        })
                };
                match spec.source_name.to_ascii_lowercase().as_str() {
                    "weatherapi" => {
                        let mut p = WeatherApiProvider::new(key()?);
                        if let Some(url) = &spec.endpoint {
                            p = p.with_base_url(url.clone());
                        }
                        SourceAdapter::WeatherApi(p)
                    }
                    "openweathermap" => {
                        let mut p = OpenWeatherMapProvider::new(key()?);
                        if let Some(url) = &spec.endpoint {
                            p = p.with_base_url(url.clone());
                        }
                        SourceAdapter::OpenWeatherMap(p)
                    }
                    _ => return Err(ConfigError::UnknownVendor(spec.source_name.clone())),
                }
            }
        };

        Ok(Self {
            name: spec.source_name.clone(),
            cities: spec.cities.clone(),
            adapter,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn adapter(&self) -> &SourceAdapter {
        &self.adapter
    }

    /// Run this source for every configured city. Never returns an error:
    /// per-city failures are logged and skipped, a source-wide failure comes
    /// back as `FetchOutcome::Failed`.
    pub async fn fetch(&self, client: &Client) -> FetchOutcome {
        let outcome = match &self.adapter {
            SourceAdapter::Csv(csv) => match read_csv_off_thread(csv.clone(), &self.cities).await {
                Ok(records) => FetchOutcome::Fetched(records),
                Err(e) => {
                    tracing::warn!(source = %self.name, error = %e, "csv source failed");
                    counter!("weather_source_failures_total", "source" => self.name.clone())
                        .increment(1);
                    FetchOutcome::Failed(e.to_string())
                }
            },
            SourceAdapter::WeatherApi(p) => {
                FetchOutcome::Fetched(fetch_cities(p, &self.name, client, &self.cities).await)
            }
            SourceAdapter::OpenWeatherMap(p) => {
                FetchOutcome::Fetched(fetch_cities(p, &self.name, client, &self.cities).await)
            }
        };

        if let FetchOutcome::Fetched(records) = &outcome {
            counter!("weather_records_total", "source" => self.name.clone())
                .increment(records.len() as u64);
        }
        outcome
    }
}

async fn read_csv_off_thread(
    csv: CsvSource,
    cities: &[String],
) -> Result<Vec<WeatherRecord>, ReadError> {
    let cities = cities.to_vec();
    tokio::task::spawn_blocking(move || csv.read_cities(&cities)).await?
}

/// One request chain per city, in order; a failed city is logged and dropped.
async fn fetch_cities<P: CityProvider>(
    provider: &P,
    source: &str,
    client: &Client,
    cities: &[String],
) -> Vec<WeatherRecord> {
    let mut out = Vec::with_capacity(cities.len());
    for city in cities {
        match provider.fetch_one_city(client, city).await {
            Ok(record) => out.push(record),
            Err(e) => {
                tracing::warn!(
                    source = source,
                    provider = provider.name(),
                    city = %city,
                    error = %e,
                    "city fetch failed"
                );
                counter!("weather_city_failures_total", "source" => source.to_string())
                    .increment(1);
            }
        }
    }
    out
}

/// Resolve `spec` and fetch it. A configuration error is logged and yields no
/// records.
pub async fn dispatch(spec: &DataSourceSpec, client: &Client) -> Vec<WeatherRecord> {
    match ConfiguredSource::from_spec(spec) {
        Ok(source) => source.fetch(client).await.into_records(),
        Err(e) => {
            tracing::error!(source = %spec.source_name, error = %e, "source misconfigured");
            counter!("weather_source_failures_total", "source" => spec.source_name.clone())
                .increment(1);
            Vec::new()
        }
    }
}
