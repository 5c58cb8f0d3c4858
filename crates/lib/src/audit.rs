//! Audit sink: append-only record of every finalized gateway response.
//!
//! Fire-and-forget relative to the response path; a failed write is logged
//! and never surfaces to the caller.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// One audit record: who answered, the final envelope, when, and which
/// inbound message it answers.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub sender: String,
    pub message: Value,
    pub timestamp: String,
    pub response_to: String,
}

impl AuditEntry {
    /// Entry for a finalized gateway response. `response_to` is the caller's
    /// message id, or the original message text when no id was supplied.
    pub fn new(message: Value, response_to: impl Into<String>) -> Self {
        Self {
            sender: "ai".to_string(),
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
            response_to: response_to.into(),
        }
    }
}

/// Durable log of finalized request/response pairs. Append-only; no reads.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), String>;
}

/// Sink that POSTs entries to a document store collection
/// (`{base_url}/{collection}`).
pub struct DocumentStoreSink {
    base_url: String,
    collection: String,
    client: reqwest::Client,
}

impl DocumentStoreSink {
    pub fn new(base_url: String, collection: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            collection,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AuditSink for DocumentStoreSink {
    async fn record(&self, entry: AuditEntry) -> Result<(), String> {
        let url = format!("{}/{}", self.base_url, self.collection);
        let res = self
            .client
            .post(&url)
            .json(&entry)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("audit write failed: {} {}", status, body));
        }
        log::debug!("audit: recorded response for '{}'", entry.response_to);
        Ok(())
    }
}

/// Sink used when no audit store is configured: logs the entry and drops it.
pub struct LogOnlySink;

#[async_trait]
impl AuditSink for LogOnlySink {
    async fn record(&self, entry: AuditEntry) -> Result<(), String> {
        log::info!(
            "audit (log only): response_to='{}' message={}",
            entry.response_to,
            entry.message
        );
        Ok(())
    }
}
