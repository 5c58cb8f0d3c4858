//! Gateway HTTP server: GET /ping and POST /gateway/message.
//!
//! The message handler runs the linear pipeline (extract -> validate ->
//! route -> invoke) and funnels every outcome through `envelope::normalize`.
//! The audit write happens after the response is finalized and never blocks
//! or alters it.

use crate::audit::{AuditEntry, AuditSink, DocumentStoreSink, LogOnlySink};
use crate::backend::{BackendClient, BackendOutcome};
use crate::config::{self, Config};
use crate::envelope::{self, PipelineError, ResponseEnvelope};
use crate::intent;
use crate::llm::CompletionClient;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Shared state: already-constructed collaborator handles. Read-only after
/// startup; requests share nothing else.
#[derive(Clone)]
pub struct GatewayState {
    pub completion: CompletionClient,
    pub backend: BackendClient,
    pub audit: Arc<dyn AuditSink>,
}

impl GatewayState {
    /// Construct all collaborator handles from config. Fails when the
    /// backend base URL is not configured; everything else has defaults.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend_url = config::resolve_backend_url(config).ok_or_else(|| {
            anyhow::anyhow!(
                "backend base URL not configured (set backend.baseUrl or BILLGATE_BACKEND_URL)"
            )
        })?;
        let api_key = config::resolve_api_key(config);
        if api_key.is_none() {
            log::warn!("no completion API key configured (set llm.apiKey or OPENAI_API_KEY)");
        }
        let audit: Arc<dyn AuditSink> = match config.audit.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Arc::new(DocumentStoreSink::new(
                url.trim().to_string(),
                config.audit.collection.clone(),
            )),
            _ => {
                log::info!("no audit store configured, finalized responses are logged only");
                Arc::new(LogOnlySink)
            }
        };
        Ok(Self {
            completion: CompletionClient::new(&config.llm, api_key),
            backend: BackendClient::new(backend_url, &config.backend),
            audit,
        })
    }
}

/// Inbound message body. All fields optional at parse time; the handler
/// rejects a missing `message` before any pipeline stage runs.
#[derive(Debug, Default, Deserialize)]
struct MessageRequest {
    message: Option<String>,
    sender: Option<String>,
    message_id: Option<String>,
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_gateway(config: Config) -> Result<()> {
    let state = GatewayState::from_config(&config)?;

    let app = Router::new()
        .route("/ping", get(ping))
        .route("/gateway/message", post(gateway_message))
        .with_state(state);

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET /ping — liveness probe, no pipeline involvement.
async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "msg": "pong" }))
}

/// POST /gateway/message — run the pipeline for one inbound message.
async fn gateway_message(
    State(state): State<GatewayState>,
    body: Bytes,
) -> (StatusCode, Json<ResponseEnvelope>) {
    // Lenient body parse: a malformed or empty body is treated like a body
    // with no fields, then rejected below with the envelope shape.
    let req: MessageRequest = serde_json::from_slice(&body).unwrap_or_default();

    let message = match req.message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => {
            log::debug!("gateway: request missing 'message' field");
            return (
                StatusCode::BAD_REQUEST,
                Json(ResponseEnvelope::error("Missing 'message' field", None)),
            );
        }
    };
    let correlation_id = req
        .message_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    log::info!("gateway: [{}] handling message", correlation_id);
    let outcome = run_pipeline(&state, &correlation_id, &message, req.sender.as_deref()).await;
    let (status, envelope) = envelope::normalize(outcome);
    log::info!("gateway: [{}] responding with {}", correlation_id, status);

    // The response is decided; record it without blocking the reply.
    let sink = state.audit.clone();
    let response_to = req.message_id.unwrap_or(message);
    let entry = AuditEntry::new(
        serde_json::to_value(&envelope).unwrap_or_else(|_| json!({})),
        response_to,
    );
    tokio::spawn(async move {
        if let Err(e) = sink.record(entry).await {
            log::warn!("audit: write failed: {}", e);
        }
    });

    (status, Json(envelope))
}

/// The linear pipeline: extract -> validate -> route -> invoke. Stops at the
/// first failure; `envelope::normalize` classifies whatever comes out.
async fn run_pipeline(
    state: &GatewayState,
    correlation_id: &str,
    message: &str,
    sender: Option<&str>,
) -> Result<BackendOutcome, PipelineError> {
    let raw = intent::extract_intent(&state.completion, message).await?;
    let validated = intent::validate(raw)?;
    let op = validated.intent.descriptor();
    log::info!(
        "gateway: [{}] dispatching {} as {} {}",
        correlation_id,
        validated.intent.wire_name(),
        op.method.as_str(),
        op.path
    );
    let outcome = state
        .backend
        .invoke(op, &validated.parameters, sender.unwrap_or(""))
        .await?;
    log::info!(
        "gateway: [{}] backend returned status {}",
        correlation_id,
        outcome.status
    );
    Ok(outcome)
}
