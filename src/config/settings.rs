// src/config/settings.rs
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::ingest::dispatch::ConfiguredSource;
use crate::ingest::types::{ApiKey, CsvColumns, DataSourceSpec, SourceType};

pub const ENV_CONFIG_PATH: &str = "WEATHER_POLLER_CONFIG";

fn default_polling_interval() -> u64 {
    60
}
fn default_http_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub data_sources: Vec<DataSourceConfig>,
    pub logz_io: LogzIoConfig,
    /// Seconds between cycles.
    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,
    /// Per-request timeout for vendor APIs and the listener.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    /// Serve `/metrics` and `/health` here when set.
    #[serde(default)]
    pub metrics_addr: Option<SocketAddr>,
}

#[derive(Clone, Deserialize)]
pub struct LogzIoConfig {
    pub listener_host: String,
    pub listener_port: u16,
    pub listener_token: String,
}

impl fmt::Debug for LogzIoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogzIoConfig")
            .field("listener_host", &self.listener_host)
            .field("listener_port", &self.listener_port)
            .field("listener_token", &"<redacted>")
            .finish()
    }
}

/// One entry of `data_sources` as written in the file.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSourceConfig {
    /// "csv" | "api"
    pub source_type: String,
    /// Vendor for api sources. For csv sources: the file path, or the vendor
    /// name when `path` is given.
    pub source: String,
    #[serde(default)]
    pub cities: Vec<String>,
    /// "ENV" means: read from WEATHERAPI_API_KEY / OPENWEATHERMAP_API_KEY.
    #[serde(default, alias = "API_KEY")]
    pub api_key: Option<ApiKey>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub temperature_column: Option<String>,
    #[serde(default)]
    pub description_column: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl DataSourceConfig {
    pub fn to_spec(&self) -> Result<DataSourceSpec, ConfigError> {
        let source_type: SourceType = self.source_type.parse()?;
        let source_name = self.source.trim().to_string();

        let location = match source_type {
            SourceType::Csv => Some(
                self.path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&source_name)),
            ),
            SourceType::Api => None,
        };

        let mut columns = CsvColumns::default();
        if let Some(c) = &self.temperature_column {
            columns.temperature = c.clone();
        }
        if let Some(c) = &self.description_column {
            columns.description = c.clone();
        }

        Ok(DataSourceSpec {
            source_type,
            credentials: self.resolve_key(&source_name)?,
            source_name,
            cities: self.cities.iter().map(|c| c.trim().to_string()).collect(),
            location,
            columns,
            endpoint: self.base_url.clone(),
        })
    }

    fn resolve_key(&self, source_name: &str) -> Result<Option<ApiKey>, ConfigError> {
        let Some(key) = &self.api_key else {
            return Ok(None);
        };
        let raw = key.expose().trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if !raw.eq_ignore_ascii_case("env") {
            return Ok(Some(key.clone()));
        }
        let var = match source_name.to_ascii_lowercase().as_str() {
            "weatherapi" => "WEATHERAPI_API_KEY",
            "openweathermap" => "OPENWEATHERMAP_API_KEY",
            // unknown vendors are rejected when the adapter is resolved
            _ => return Ok(Some(key.clone())),
        };
        std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| Some(ApiKey::new(v.trim())))
            .ok_or(ConfigError::MissingEnvKey {
                source_name: source_name.to_string(),
                var,
            })
    }
}

impl Settings {
    /// Load from an explicit path. JSON or TOML, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let settings = Self::parse(&content, &ext)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load using env var + fallbacks:
    /// 1) $WEATHER_POLLER_CONFIG
    /// 2) config.json
    /// 3) config/poller.toml
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            return Self::load_from(&pb);
        }
        for candidate in ["config.json", "config/poller.toml"] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Err(anyhow!(
            "no settings file found (set {ENV_CONFIG_PATH} or create config.json)"
        ))
    }

    fn parse(s: &str, hint_ext: &str) -> Result<Self> {
        match hint_ext {
            "toml" => Ok(toml::from_str(s)?),
            "json" => Ok(serde_json::from_str(s)?),
            _ => serde_json::from_str(s)
                .or_else(|_| toml::from_str(s))
                .map_err(|e| anyhow!("unsupported settings format: {e}")),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.data_sources.is_empty() {
            bail!("data_sources must list at least one source");
        }
        if self.polling_interval == 0 {
            bail!("polling_interval must be at least 1 second");
        }
        if self.logz_io.listener_host.trim().is_empty() {
            bail!("logz_io.listener_host is empty");
        }
        if self.logz_io.listener_token.trim().is_empty() {
            bail!("logz_io.listener_token is empty");
        }
        Ok(())
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// Every source that parses into a spec.
    pub fn data_source_specs(&self) -> Vec<DataSourceSpec> {
        let mut out = Vec::with_capacity(self.data_sources.len());
        for (idx, ds) in self.data_sources.iter().enumerate() {
            match ds.to_spec() {
                Ok(spec) => out.push(spec),
                Err(e) => tracing::error!(
                    index = idx,
                    source = %ds.source,
                    error = %e,
                    "skipping data source"
                ),
            }
        }
        out
    }

    /// Resolve each source to its adapter. Misconfigured sources are logged and
    /// left out so the rest keep polling.
    pub fn resolve_sources(&self) -> Vec<Arc<ConfiguredSource>> {
        let mut out = Vec::new();
        for spec in self.data_source_specs() {
            match ConfiguredSource::from_spec(&spec) {
                Ok(src) => {
                    tracing::info!(
                        source = src.name(),
                        source_type = %spec.source_type,
                        cities = src.cities().len(),
                        has_key = spec.credentials.is_some(),
                        "data source ready"
                    );
                    out.push(Arc::new(src));
                }
                Err(e) => {
                    tracing::error!(source = %spec.source_name, error = %e, "skipping data source");
                }
            }
        }
        out
    }
}
