// src/ingest/providers/csv_file.rs
//! CSV snapshot adapter.
//!
//! The file is read whole on every cycle (snapshots are small and may be
//! rewritten between cycles). For each requested city, in request order, the
//! first matching row becomes one record; cities missing from the file simply
//! produce nothing.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::error::ReadError;
use crate::ingest::types::{CsvColumns, WeatherRecord};

const CITY_COLUMN: &str = "city";

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    columns: CsvColumns,
    provider: String,
}

impl CsvSource {
    /// `provider` defaults to the file path when no vendor name is configured.
    pub fn new(path: impl Into<PathBuf>, columns: CsvColumns, provider: Option<String>) -> Self {
        let path = path.into();
        let provider = provider.unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            columns,
            provider,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Blocking read. Call from `spawn_blocking` inside async code.
    pub fn read_cities(&self, cities: &[String]) -> Result<Vec<WeatherRecord>, ReadError> {
        let file = File::open(&self.path).map_err(|source| ReadError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers().map_err(|e| self.malformed(e))?.clone();
        let city_idx = self.column_index(&headers, CITY_COLUMN)?;
        let temp_idx = self.column_index(&headers, &self.columns.temperature)?;
        let desc_idx = self.column_index(&headers, &self.columns.description)?;

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| self.malformed(e))?;
            let city = row.get(city_idx).unwrap_or_default();
            if cities.iter().any(|c| c == city) {
                rows.push(row);
            }
        }

        let mut out = Vec::with_capacity(cities.len());
        for city in cities {
            let Some(row) = rows.iter().find(|r| r.get(city_idx) == Some(city.as_str())) else {
                tracing::debug!(
                    path = %self.path.display(),
                    city = %city,
                    "city not in csv snapshot"
                );
                continue;
            };
            let raw_temp = row.get(temp_idx).unwrap_or_default();
            let temperature_celsius = match raw_temp.parse::<f64>() {
                Ok(t) if t.is_finite() => t,
                _ => {
                    tracing::warn!(
                        path = %self.path.display(),
                        city = %city,
                        value = raw_temp,
                        "skipping csv row with non-numeric temperature"
                    );
                    continue;
                }
            };
            out.push(WeatherRecord {
                city: city.clone(),
                temperature_celsius,
                description: row.get(desc_idx).unwrap_or_default().to_string(),
                source_provider: self.provider.clone(),
            });
        }
        Ok(out)
    }

    fn column_index(&self, headers: &StringRecord, column: &str) -> Result<usize, ReadError> {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ReadError::MissingColumn {
                path: self.path.clone(),
                column: column.to_string(),
            })
    }

    fn malformed(&self, source: csv::Error) -> ReadError {
        ReadError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}
