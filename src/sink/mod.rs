// src/sink/mod.rs
pub mod logzio;

use crate::ingest::types::Batch;

#[async_trait::async_trait]
pub trait BatchSink: Send + Sync {
    /// Ship one cycle's batch. Returns the transport status code, or `None`
    /// when the request could not be made at all. Never retries.
    async fn send(&self, batch: &Batch) -> Option<u16>;
}

// --- Test helper ---
/// Keeps every batch it is handed and answers with a fixed status.
pub struct MockSink {
    pub calls: std::sync::Mutex<Vec<Batch>>,
    status: Option<u16>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::with_status(Some(200))
    }

    pub fn with_status(status: Option<u16>) -> Self {
        Self {
            calls: std::sync::Mutex::new(vec![]),
            status,
        }
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BatchSink for MockSink {
    async fn send(&self, batch: &Batch) -> Option<u16> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(batch.clone());
        }
        self.status
    }
}
