// src/sink/logzio.rs
use std::time::Duration;

use metrics::{counter, gauge};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

use super::BatchSink;
use crate::config::LogzIoConfig;
use crate::ingest::types::Batch;

/// Bulk HTTPS listener of Logz.io. Each batch is one POST of NDJSON.
#[derive(Clone)]
pub struct LogzIoSink {
    url: Url,
    client: Client,
    timeout: Duration,
}

impl LogzIoSink {
    /// `https://{host}:{port}/?token={token}`
    pub fn from_config(cfg: &LogzIoConfig) -> anyhow::Result<Self> {
        let base = format!("https://{}:{}/", cfg.listener_host, cfg.listener_port);
        let url = Url::parse_with_params(&base, &[("token", cfg.listener_token.as_str())])?;
        Ok(Self::with_url(url))
    }

    /// Point the sink at an arbitrary listener URL (token already in the query).
    pub fn with_url(url: Url) -> Self {
        Self {
            url,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Listener address for logs, without the token.
    fn redacted(&self) -> String {
        format!(
            "{}://{}:{}",
            self.url.scheme(),
            self.url.host_str().unwrap_or_default(),
            self.url.port_or_known_default().unwrap_or_default()
        )
    }
}

#[async_trait::async_trait]
impl BatchSink for LogzIoSink {
    async fn send(&self, batch: &Batch) -> Option<u16> {
        let body = match batch.to_ndjson() {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "cannot serialize batch");
                counter!("weather_ingest_errors_total").increment(1);
                return None;
            }
        };

        let res = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        match res {
            Ok(rsp) => {
                let status = rsp.status().as_u16();
                gauge!("weather_ingest_status").set(f64::from(status));
                if !rsp.status().is_success() {
                    tracing::warn!(listener = %self.redacted(), status, "logz.io rejected batch");
                }
                Some(status)
            }
            Err(e) => {
                // reqwest errors carry the URL; strip it so the token stays out of logs
                tracing::warn!(
                    listener = %self.redacted(),
                    error = %e.without_url(),
                    "logz.io request failed"
                );
                counter!("weather_ingest_errors_total").increment(1);
                None
            }
        }
    }
}
