// src/scheduler.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::Settings;
use crate::ingest::{self, dispatch::ConfiguredSource};
use crate::sink::{logzio::LogzIoSink, BatchSink};

/// One pooled client for every vendor request of every cycle.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("weather-poller/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4).min(timeout))
        .timeout(timeout)
        .build()
}

/// Fetch-then-ship on a fixed interval.
pub struct Poller<S> {
    sources: Vec<Arc<ConfiguredSource>>,
    client: Client,
    sink: S,
    interval: Duration,
}

impl Poller<LogzIoSink> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let sources = settings.resolve_sources();
        if sources.is_empty() {
            bail!("none of the configured data sources is usable");
        }
        let client = build_http_client(settings.http_timeout()).context("building http client")?;
        let sink = LogzIoSink::from_config(&settings.logz_io)
            .context("building logz.io listener url")?
            .with_client(client.clone())
            .with_timeout(settings.http_timeout_secs.max(1));
        Ok(Self::new(sources, client, sink, settings.polling_interval()))
    }
}

impl<S: BatchSink> Poller<S> {
    pub fn new(
        sources: Vec<Arc<ConfiguredSource>>,
        client: Client,
        sink: S,
        interval: Duration,
    ) -> Self {
        Self {
            sources,
            client,
            sink,
            interval,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// One cycle: fetch everything, ship the batch, report the status.
    /// A failed shipment drops this cycle's batch.
    pub async fn run_once(&self) -> Option<u16> {
        let batch = ingest::run_cycle(&self.sources, &self.client).await;
        let records = batch.len();
        let status = self.sink.send(&batch).await;
        match status {
            Some(code) => tracing::info!(status = code, records, "batch shipped"),
            None => tracing::warn!(records, "batch dropped, ingestion request failed"),
        }
        status
    }

    /// Cycle until `shutdown` resolves. The first cycle starts immediately;
    /// a cycle slower than the interval delays the next tick instead of
    /// bunching them up.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, poller stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
    }
}

/// Run the poller on its own task until the handle is aborted.
pub fn spawn_poller<S: BatchSink + 'static>(poller: Poller<S>) -> JoinHandle<()> {
    tokio::spawn(async move {
        poller.run(std::future::pending::<()>()).await;
    })
}
