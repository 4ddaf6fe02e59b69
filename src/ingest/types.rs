// src/ingest/types.rs
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// The normalized shape every adapter maps its vendor data into.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct WeatherRecord {
    pub city: String,
    pub temperature_celsius: f64,
    pub description: String,
    pub source_provider: String, // e.g. "weatherapi", "data/snapshot.csv"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Csv,
    Api,
}

impl FromStr for SourceType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(SourceType::Csv),
            "api" => Ok(SourceType::Api),
            other => Err(ConfigError::UnknownSourceType(other.to_string())),
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Csv => f.write_str("csv"),
            SourceType::Api => f.write_str("api"),
        }
    }
}

/// Static per-source key. Never printed.
#[derive(Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<{} chars>)", self.0.len())
    }
}

/// Column names a CSV snapshot uses for the mapped fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumns {
    pub temperature: String,
    pub description: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            temperature: "temperature_celsius".to_string(),
            description: "description".to_string(),
        }
    }
}

/// One configured source, as read from the settings file.
#[derive(Debug, Clone)]
pub struct DataSourceSpec {
    pub source_type: SourceType,
    /// Vendor tag for API sources; vendor or file path for CSV sources.
    pub source_name: String,
    pub cities: Vec<String>,
    pub credentials: Option<ApiKey>,
    pub location: Option<PathBuf>,
    pub columns: CsvColumns,
    /// Base URL override for API vendors.
    pub endpoint: Option<String>,
}

/// Result of running one source for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(Vec<WeatherRecord>),
    Failed(String),
}

impl FetchOutcome {
    pub fn into_records(self) -> Vec<WeatherRecord> {
        match self {
            FetchOutcome::Fetched(records) => records,
            FetchOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

/// Records gathered during one cycle, in source order then city order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    records: Vec<WeatherRecord>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = WeatherRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<WeatherRecord> {
        self.records
    }

    /// One JSON object per line, no trailing newline.
    pub fn to_ndjson(&self) -> serde_json::Result<String> {
        let mut lines = Vec::with_capacity(self.records.len());
        for r in &self.records {
            lines.push(serde_json::to_string(r)?);
        }
        Ok(lines.join("\n"))
    }
}

impl From<Vec<WeatherRecord>> for Batch {
    fn from(records: Vec<WeatherRecord>) -> Self {
        Self { records }
    }
}
