// src/ingest/mod.rs
pub mod dispatch;
pub mod providers;
pub mod types;

use std::sync::Arc;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use reqwest::Client;

use crate::ingest::dispatch::ConfiguredSource;
use crate::ingest::types::{Batch, FetchOutcome};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "weather_records_total",
            "Normalized records produced, per source."
        );
        describe_counter!(
            "weather_city_failures_total",
            "Per-city fetch failures (non-200, empty geocode, network)."
        );
        describe_counter!(
            "weather_source_failures_total",
            "Sources that failed as a whole (csv read, misconfiguration, task panic)."
        );
        describe_histogram!("weather_fetch_ms", "Per-city vendor fetch time in milliseconds.");
        describe_histogram!("weather_cycle_duration_ms", "Whole fetch cycle time in milliseconds.");
        describe_gauge!("weather_last_cycle_ts", "Unix ts when the last cycle finished.");
        describe_gauge!(
            "weather_polling_interval_secs",
            "Configured seconds between fetch cycles."
        );
        describe_gauge!("weather_ingest_status", "HTTP status of the last Logz.io shipment.");
        describe_counter!(
            "weather_ingest_errors_total",
            "Shipments that could not be attempted or completed."
        );
    });
}

/// Fetch every source concurrently and merge the results.
///
/// Each source runs on its own task; results are collected in source order so
/// the batch is deterministic no matter which source answers first. A source
/// that fails (or whose task panics) contributes nothing.
pub async fn run_cycle(sources: &[Arc<ConfiguredSource>], client: &Client) -> Batch {
    ensure_metrics_described();
    let t0 = std::time::Instant::now();

    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let source = Arc::clone(source);
            let client = client.clone();
            tokio::spawn(async move { source.fetch(&client).await })
        })
        .collect();

    let mut batch = Batch::new();
    let mut failed_sources = 0usize;
    for (source, handle) in sources.iter().zip(handles) {
        match handle.await {
            Ok(FetchOutcome::Fetched(records)) => batch.extend(records),
            Ok(FetchOutcome::Failed(_)) => failed_sources += 1,
            Err(e) => {
                tracing::error!(source = source.name(), error = %e, "source task aborted");
                counter!("weather_source_failures_total", "source" => source.name().to_string())
                    .increment(1);
                failed_sources += 1;
            }
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("weather_cycle_duration_ms").record(ms);
    let now = chrono::Utc::now().timestamp().max(0);
    gauge!("weather_last_cycle_ts").set(now as f64);

    tracing::info!(
        sources = sources.len(),
        failed_sources,
        records = batch.len(),
        elapsed_ms = ms as u64,
        "fetch cycle finished"
    );
    batch
}
