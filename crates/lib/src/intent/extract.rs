//! Intent extraction: one completion call, then a strict JSON parse.

use crate::llm::{CompletionClient, CompletionError};
use serde_json::Value;

/// Fixed instruction constraining the model to a single intent JSON object.
const SYSTEM_PROMPT: &str = concat!(
    "You are an API command generator. For each user message, respond ONLY with a JSON like this:\n",
    "{ \"intent\": \"calculate_bill\", \"parameters\": { \"subscriber_id\": \"123\", \"month\": \"2025-12\" } }\n",
    "or:\n",
    "{ \"intent\": \"pay_bill\", \"parameters\": { \"subscriber_id\": \"123\", \"month\": \"2025-12\" } }\n",
    "or:\n",
    "{ \"intent\": \"get_bill_details\", \"parameters\": { \"subscriber_id\": \"123\", \"month\": \"2025-12\" } }\n",
    "Valid intents: calculate_bill, pay_bill, get_bill_details.\n",
    "Respond ONLY with valid JSON. No explanations.",
);

/// Unvalidated intent as the model produced it. The intent name is a free
/// string and the parameters are raw JSON values; only `validate` promotes
/// this to a typed intent.
#[derive(Debug, Clone)]
pub struct RawIntent {
    pub intent: String,
    pub parameters: serde_json::Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The completion call itself failed (network, auth, rate limit).
    #[error("completion request failed: {0}")]
    Transport(String),
    /// The model answered, but not with a usable intent JSON object.
    #[error("completion output was not an intent object: {0}")]
    Format(String),
}

impl From<CompletionError> for ExtractError {
    fn from(e: CompletionError) -> Self {
        ExtractError::Transport(e.to_string())
    }
}

/// Extract a raw intent from free user text via one completion call.
pub async fn extract_intent(
    client: &CompletionClient,
    text: &str,
) -> Result<RawIntent, ExtractError> {
    let output = client.complete(SYSTEM_PROMPT, text).await?;
    log::debug!("extract: raw completion output: {}", output);
    parse_intent_output(&output)
}

/// Parse the model output strictly as a single JSON object with an `intent`
/// string field and an optional `parameters` object.
fn parse_intent_output(output: &str) -> Result<RawIntent, ExtractError> {
    let value: Value = serde_json::from_str(output)
        .map_err(|e| ExtractError::Format(format!("invalid JSON: {}", e)))?;
    let obj = value
        .as_object()
        .ok_or_else(|| ExtractError::Format("output is not a JSON object".to_string()))?;
    let intent = obj
        .get("intent")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ExtractError::Format("missing \"intent\" field".to_string()))?
        .to_string();
    let parameters = match obj.get("parameters") {
        None | Some(Value::Null) => serde_json::Map::new(),
        Some(Value::Object(m)) => m.clone(),
        Some(_) => {
            return Err(ExtractError::Format(
                "\"parameters\" is not an object".to_string(),
            ))
        }
    };
    Ok(RawIntent { intent, parameters })
}
