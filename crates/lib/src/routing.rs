//! Intent -> backend operation table.
//!
//! Pure lookup: every validated intent owns exactly one operation
//! descriptor. The table is static; an unhandled variant is a compile
//! error, not a runtime fallthrough.

use crate::intent::Intent;

/// HTTP method of a backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Where the intent parameters go on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamPlacement {
    /// JSON request body.
    Body,
    /// URL query string.
    Query,
}

/// One backend operation: method, path, and parameter placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub method: HttpMethod,
    pub path: &'static str,
    pub placement: ParamPlacement,
}

impl Intent {
    /// The backend operation for this intent.
    pub fn descriptor(&self) -> OperationDescriptor {
        match self {
            Intent::CalculateBill => OperationDescriptor {
                method: HttpMethod::Post,
                path: "/calculate-bill",
                placement: ParamPlacement::Body,
            },
            Intent::GetBillDetails => OperationDescriptor {
                method: HttpMethod::Get,
                path: "/bill/details",
                placement: ParamPlacement::Query,
            },
            Intent::PayBill => OperationDescriptor {
                method: HttpMethod::Post,
                path: "/pay-bill",
                placement: ParamPlacement::Body,
            },
        }
    }
}
