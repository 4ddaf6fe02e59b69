//! Error types for the fetch pipeline.
//!
//! Everything here stays inside a source boundary: the dispatcher turns these
//! into log lines and zero records, never into a failed cycle.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// A source whose configuration cannot be turned into an adapter.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown source_type '{0}' (expected 'csv' or 'api')")]
    UnknownSourceType(String),

    #[error("unsupported api source '{0}'")]
    UnknownVendor(String),

    #[error("source '{source_name}' lists no cities")]
    NoCities { source_name: String },

    #[error("source '{source_name}' needs an api key")]
    MissingApiKey { source_name: String },

    #[error("api key for '{source_name}' is 'ENV' but {var} is not set")]
    MissingEnvKey { source_name: String, var: &'static str },

    #[error("csv source '{source_name}' has no file path")]
    MissingLocation { source_name: String },
}

/// One city that could not be fetched from an API vendor.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("malformed response body: {0}")]
    Malformed(#[source] reqwest::Error),

    #[error("{stage} returned HTTP {status}")]
    Status {
        stage: &'static str,
        status: StatusCode,
    },

    #[error("no geocoding match")]
    NoGeocodeMatch,

    #[error("response is missing {0}")]
    MissingField(&'static str),
}

impl FetchError {
    pub fn status(stage: &'static str, status: StatusCode) -> Self {
        Self::Status { stage, status }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Malformed(e)
        } else {
            Self::Http(e)
        }
    }
}

/// A CSV snapshot that could not be read at all.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("csv reader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
