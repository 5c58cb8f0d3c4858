//! OpenAI-compatible chat completions client (POST {base}/chat/completions).

use crate::config::LlmConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for an OpenAI-compatible completion endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion api error: {0}")]
    Api(String),
}

impl CompletionClient {
    /// Build a client from config and a resolved API key (env overrides config;
    /// see `config::resolve_api_key`).
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    /// One non-streaming completion: system instruction plus user text.
    /// Temperature is pinned to 0.0 so identical input yields identical
    /// structured output, within the model's own determinism guarantees.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: 0.0,
        };
        let mut req = self.client.post(&url).timeout(self.timeout).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| CompletionError::Api("completion response had no choices".to_string()))?;
        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessage>,
}
