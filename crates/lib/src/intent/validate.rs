//! Intent validation: free-form intent name -> closed enum.

use crate::intent::RawIntent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of commands the gateway dispatches. Adding a variant
/// forces the routing table to handle it (exhaustive match).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CalculateBill,
    PayBill,
    GetBillDetails,
}

impl Intent {
    /// Wire name as the model emits it (snake_case).
    pub fn wire_name(&self) -> &'static str {
        match self {
            Intent::CalculateBill => "calculate_bill",
            Intent::PayBill => "pay_bill",
            Intent::GetBillDetails => "get_bill_details",
        }
    }

    /// Parse a wire name; None for anything outside the known set.
    pub fn parse(name: &str) -> Option<Intent> {
        match name {
            "calculate_bill" => Some(Intent::CalculateBill),
            "pay_bill" => Some(Intent::PayBill),
            "get_bill_details" => Some(Intent::GetBillDetails),
            _ => None,
        }
    }
}

/// A validated command: typed intent plus pass-through parameters. The
/// backend, not the gateway, is the authority on parameter completeness.
#[derive(Debug, Clone)]
pub struct ExtractedIntent {
    pub intent: Intent,
    pub parameters: serde_json::Map<String, Value>,
}

/// The model produced an intent name outside the known set. Client-visible
/// (HTTP 400): the caller's request could not be serviced.
#[derive(Debug, thiserror::Error)]
#[error("intent '{0}' is not recognized")]
pub struct UnknownIntent(pub String);

/// Check the raw intent against the known command set.
pub fn validate(raw: RawIntent) -> Result<ExtractedIntent, UnknownIntent> {
    match Intent::parse(&raw.intent) {
        Some(intent) => Ok(ExtractedIntent {
            intent,
            parameters: raw.parameters,
        }),
        None => Err(UnknownIntent(raw.intent)),
    }
}
