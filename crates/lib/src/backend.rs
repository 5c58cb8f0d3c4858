//! Billing backend client: executes an operation descriptor and captures
//! the raw outcome (status plus JSON-or-text body) for normalization.
//!
//! No retry policy: billing operations such as pay-bill are not safely
//! idempotent to retry blindly, so transport failures surface immediately.

use crate::config::BackendConfig;
use crate::routing::{HttpMethod, OperationDescriptor, ParamPlacement};
use serde_json::Value;
use std::time::Duration;

const EMPTY_BODY_PLACEHOLDER: &str = "(empty response body)";

/// Client for the downstream billing backend.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

/// Exactly what the backend returned, before normalization. A non-JSON
/// body is not an error here; the normalizer classifies by status code.
#[derive(Debug, Clone)]
pub struct BackendOutcome {
    pub status: u16,
    pub payload: Value,
    pub is_json: bool,
}

/// The backend could not be reached (connection refused, timeout, DNS).
#[derive(Debug, thiserror::Error)]
#[error("backend request failed: {0}")]
pub struct BackendUnavailable(#[from] reqwest::Error);

impl BackendClient {
    /// Build a client from config and a resolved base URL (env overrides
    /// config; see `config::resolve_backend_url`).
    pub fn new(base_url: String, config: &BackendConfig) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    /// Execute one operation. The sender token is forwarded as a bearer
    /// credential even when empty; the backend owns credential validity.
    pub async fn invoke(
        &self,
        op: OperationDescriptor,
        parameters: &serde_json::Map<String, Value>,
        sender_token: &str,
    ) -> Result<BackendOutcome, BackendUnavailable> {
        let url = format!("{}{}", self.base_url, op.path);
        let req = match op.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        let req = match op.placement {
            ParamPlacement::Body => req.json(&Value::Object(parameters.clone())),
            ParamPlacement::Query => req.query(&query_pairs(parameters)),
        };
        let res = req
            .bearer_auth(sender_token)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = res.status().as_u16();
        let text = res.text().await?;
        let (payload, is_json) = match serde_json::from_str::<Value>(&text) {
            Ok(v) => (v, true),
            Err(_) => {
                let raw = if text.is_empty() {
                    EMPTY_BODY_PLACEHOLDER.to_string()
                } else {
                    text
                };
                (Value::String(raw), false)
            }
        };
        Ok(BackendOutcome {
            status,
            payload,
            is_json,
        })
    }
}

/// Flatten parameters into query-string pairs. String values go verbatim;
/// anything else is rendered as its JSON text.
fn query_pairs(parameters: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    parameters
        .iter()
        .map(|(k, v)| {
            let s = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), s)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_pairs_keep_strings_verbatim() {
        let mut params = serde_json::Map::new();
        params.insert("subscriber_id".to_string(), json!("123"));
        params.insert("month".to_string(), json!("2025-12"));
        let pairs = query_pairs(&params);
        assert!(pairs.contains(&("subscriber_id".to_string(), "123".to_string())));
        assert!(pairs.contains(&("month".to_string(), "2025-12".to_string())));
    }

    #[test]
    fn query_pairs_render_non_strings_as_json_text() {
        let mut params = serde_json::Map::new();
        params.insert("amount".to_string(), json!(42.5));
        params.insert("paid".to_string(), json!(true));
        let pairs = query_pairs(&params);
        assert!(pairs.contains(&("amount".to_string(), "42.5".to_string())));
        assert!(pairs.contains(&("paid".to_string(), "true".to_string())));
    }
}
