//! Response normalization: the single point that converts every pipeline
//! outcome — extraction failure, validation failure, backend transport
//! failure, or a backend response of any shape — into exactly one
//! `ResponseEnvelope` plus one HTTP status code.
//!
//! Every exit path of the message handler funnels through `normalize`;
//! nothing else in the crate builds caller-facing error shapes.

use crate::backend::{BackendOutcome, BackendUnavailable};
use crate::intent::{ExtractError, UnknownIntent};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope status: success carries `data`, error carries `message` and
/// optionally `details`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// The sole response shape returned to the caller. Built only through the
/// `success`/`error` constructors so exactly one side is ever populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: EnvelopeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data: Some(data),
            message: None,
            details: None,
        }
    }

    pub fn error(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            data: None,
            message: Some(message.into()),
            details,
        }
    }
}

/// Any failure on the way to a backend outcome. Every variant is terminal
/// for the request; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    UnknownIntent(#[from] UnknownIntent),
    #[error(transparent)]
    Backend(#[from] BackendUnavailable),
}

/// Map a finished pipeline run to the caller's envelope and HTTP status.
///
/// | outcome | status | HTTP |
/// |---|---|---|
/// | extraction transport/format error | error | 500 |
/// | unknown intent | error | 400 |
/// | backend unreachable | error | 503 |
/// | backend status < 400 | success | 200 |
/// | backend status >= 400 | error | passthrough |
pub fn normalize(outcome: Result<BackendOutcome, PipelineError>) -> (StatusCode, ResponseEnvelope) {
    match outcome {
        Ok(out) if out.status < 400 => (StatusCode::OK, ResponseEnvelope::success(out.payload)),
        Ok(out) => {
            let status = StatusCode::from_u16(out.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let message = backend_error_message(&out.payload, out.status);
            (status, ResponseEnvelope::error(message, Some(out.payload)))
        }
        Err(PipelineError::Extract(ExtractError::Transport(e))) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ResponseEnvelope::error("LLM request failed", Some(Value::String(e))),
        ),
        Err(PipelineError::Extract(ExtractError::Format(e))) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ResponseEnvelope::error("LLM parsing failed", Some(Value::String(e))),
        ),
        Err(PipelineError::UnknownIntent(UnknownIntent(name))) => (
            StatusCode::BAD_REQUEST,
            ResponseEnvelope::error("Unknown intent", Some(Value::String(name))),
        ),
        Err(PipelineError::Backend(e)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ResponseEnvelope::error("Backend request failed", Some(Value::String(e.to_string()))),
        ),
    }
}

/// Ordered extraction rules for a backend error message: the payload's
/// `error` field, then its `message` field, then a generic fallback.
/// Applied to the parsed payload only; the HTTP-status mapping is separate.
pub fn backend_error_message(payload: &Value, status: u16) -> String {
    for field in ["error", "message"] {
        if let Some(s) = payload.get(field).and_then(|v| v.as_str()) {
            if !s.trim().is_empty() {
                return s.to_string();
            }
        }
    }
    format!("Backend error: status {}", status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(status: u16, payload: Value, is_json: bool) -> BackendOutcome {
        BackendOutcome {
            status,
            payload,
            is_json,
        }
    }

    #[test]
    fn success_below_400_carries_payload_verbatim() {
        let payload = json!({"amount": 42.5});
        let (status, env) = normalize(Ok(outcome(200, payload.clone(), true)));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(env.status, EnvelopeStatus::Success);
        assert_eq!(env.data, Some(payload));
        assert!(env.message.is_none());
        assert!(env.details.is_none());
    }

    #[test]
    fn redirect_status_still_maps_to_success_200() {
        let (status, env) = normalize(Ok(outcome(302, json!({"moved": true}), true)));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(env.status, EnvelopeStatus::Success);
    }

    #[test]
    fn backend_error_status_passes_through() {
        let payload = json!({"error": "subscriber not found"});
        let (status, env) = normalize(Ok(outcome(404, payload.clone(), true)));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(env.status, EnvelopeStatus::Error);
        assert_eq!(env.message.as_deref(), Some("subscriber not found"));
        assert_eq!(env.details, Some(payload));
    }

    #[test]
    fn backend_error_message_is_never_empty() {
        let (status, env) = normalize(Ok(outcome(500, json!({}), true)));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(env.message.as_deref(), Some("Backend error: status 500"));
    }

    #[test]
    fn non_json_backend_error_keeps_raw_text_in_details() {
        let (status, env) = normalize(Ok(outcome(
            502,
            Value::String("<html>bad gateway</html>".to_string()),
            false,
        )));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(env.message.as_deref(), Some("Backend error: status 502"));
        assert_eq!(
            env.details,
            Some(Value::String("<html>bad gateway</html>".to_string()))
        );
    }

    #[test]
    fn unusual_backend_status_codes_pass_through_exactly() {
        let (status, env) = normalize(Ok(outcome(999, json!({}), true)));
        assert_eq!(status.as_u16(), 999);
        assert_eq!(env.status, EnvelopeStatus::Error);
        assert_eq!(env.message.as_deref(), Some("Backend error: status 999"));
    }

    #[test]
    fn unrepresentable_backend_status_code_falls_back_to_502() {
        let (status, env) = normalize(Ok(outcome(1000, json!({}), true)));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(env.status, EnvelopeStatus::Error);
    }

    #[test]
    fn extraction_transport_error_maps_to_500() {
        let err = PipelineError::Extract(ExtractError::Transport("connect refused".to_string()));
        let (status, env) = normalize(Err(err));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(env.message.as_deref(), Some("LLM request failed"));
        assert_eq!(
            env.details,
            Some(Value::String("connect refused".to_string()))
        );
    }

    #[test]
    fn extraction_format_error_maps_to_500() {
        let err = PipelineError::Extract(ExtractError::Format("invalid JSON".to_string()));
        let (status, env) = normalize(Err(err));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(env.message.as_deref(), Some("LLM parsing failed"));
    }

    #[test]
    fn unknown_intent_maps_to_400_with_name_in_details() {
        let err = PipelineError::UnknownIntent(UnknownIntent("delete_account".to_string()));
        let (status, env) = normalize(Err(err));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(env.message.as_deref(), Some("Unknown intent"));
        assert_eq!(
            env.details,
            Some(Value::String("delete_account".to_string()))
        );
    }

    #[test]
    fn message_extraction_prefers_error_then_message_then_generic() {
        let both = json!({"error": "from error", "message": "from message"});
        assert_eq!(backend_error_message(&both, 400), "from error");
        let only_message = json!({"message": "from message"});
        assert_eq!(backend_error_message(&only_message, 400), "from message");
        let empty_error = json!({"error": "  ", "message": "from message"});
        assert_eq!(backend_error_message(&empty_error, 400), "from message");
        let neither = json!({"code": 7});
        assert_eq!(backend_error_message(&neither, 418), "Backend error: status 418");
        let non_string = json!({"error": {"nested": true}});
        assert_eq!(
            backend_error_message(&non_string, 400),
            "Backend error: status 400"
        );
    }

    #[test]
    fn envelope_deserializes_from_wire_json() {
        // The CLI `send` command parses gateway replies into the typed envelope.
        let env: ResponseEnvelope =
            serde_json::from_str(r#"{"status":"error","message":"boom","details":"why"}"#)
                .expect("deserialize");
        assert_eq!(env.status, EnvelopeStatus::Error);
        assert_eq!(env.message.as_deref(), Some("boom"));
        assert_eq!(env.details, Some(Value::String("why".to_string())));
        assert!(env.data.is_none());
    }

    #[test]
    fn envelope_serialization_omits_absent_fields() {
        let success = serde_json::to_value(ResponseEnvelope::success(json!({"ok": 1})))
            .expect("serialize");
        assert_eq!(success, json!({"status": "success", "data": {"ok": 1}}));
        let error = serde_json::to_value(ResponseEnvelope::error("boom", None)).expect("serialize");
        assert_eq!(error, json!({"status": "error", "message": "boom"}));
    }
}
