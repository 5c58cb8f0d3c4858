//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.billgate/config.json`) and
//! environment. Endpoint URLs and credentials live here so the pipeline
//! components receive already-constructed handles instead of reading
//! process-wide state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Completion service settings (OpenAI-compatible endpoint).
    #[serde(default)]
    pub llm: LlmConfig,

    /// Billing backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Audit sink settings (document store).
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Gateway bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// HTTP port (default 5000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Completion service config: base URL, credential, model, and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    /// OpenAI-compatible base URL (default "https://api.openai.com/v1").
    /// Point at a local OpenAI-compatible server to run without a cloud key.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// API key for the completion service. Overridden by OPENAI_API_KEY env.
    pub api_key: Option<String>,

    /// Model name (default "gpt-3.5-turbo").
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Completion token limit (default 150). The extraction output is a
    /// single small JSON object; keep this tight.
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds (default 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_llm_max_tokens() -> u32 {
    150
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            model: default_llm_model(),
            max_tokens: default_llm_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Billing backend config: base URL and timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Base URL of the billing backend (e.g. "http://127.0.0.1:9000").
    /// Overridden by BILLGATE_BACKEND_URL env. Required to start the gateway.
    pub base_url: Option<String>,

    /// Request timeout in seconds (default 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Audit sink config: document store base URL and collection name.
/// When `base_url` is unset the gateway logs finalized responses instead of
/// writing them anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    /// Base URL of the document store the audit entries are POSTed to.
    pub base_url: Option<String>,

    /// Collection (path segment) appended to the base URL (default "messages").
    #[serde(default = "default_audit_collection")]
    pub collection: String,
}

fn default_audit_collection() -> String {
    "messages".to_string()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            collection: default_audit_collection(),
        }
    }
}

/// Resolve the completion API key: env OPENAI_API_KEY overrides config.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    std::env::var("OPENAI_API_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .llm
                .api_key
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the backend base URL: env BILLGATE_BACKEND_URL overrides config.
pub fn resolve_backend_url(config: &Config) -> Option<String> {
    std::env::var("BILLGATE_BACKEND_URL")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .backend
                .base_url
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("BILLGATE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".billgate").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or BILLGATE_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
