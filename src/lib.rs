// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod scheduler;
pub mod sink;

// ---- Re-exports for stable public API ----
pub use crate::config::Settings;
pub use crate::ingest::dispatch::{dispatch, ConfiguredSource};
pub use crate::ingest::run_cycle;
pub use crate::ingest::types::{Batch, DataSourceSpec, FetchOutcome, WeatherRecord};
pub use crate::scheduler::{spawn_poller, Poller};
pub use crate::sink::BatchSink;
