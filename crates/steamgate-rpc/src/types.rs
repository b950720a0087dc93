//! JSON-RPC 2.0 wire-format types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version string.
pub const VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes.
pub mod codes {
    /// Request body is not valid JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// Request envelope is malformed.
    pub const INVALID_REQUEST: i64 = -32600;
    /// Invalid method parameters (also covers every dispatch failure).
    pub const INVALID_PARAMS: i64 = -32602;
    /// Unexpected internal error.
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Exact wire message for [`codes::INVALID_PARAMS`].
pub const INVALID_PARAMS_MESSAGE: &str = "Invalid params";

/// A JSON-RPC request (inbound or outbound).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol version; absent in 1.0-style requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    /// Request identifier echoed in the response; absent for notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Qualified method name (`group.operation`).
    pub method: String,
    /// Parameters. Inbound dispatch requires an ordered sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// An outbound 2.0 call with a generated identifier.
    pub fn call(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: Some(VERSION.into()),
            id: Some(Value::String(uuid::Uuid::now_v7().to_string())),
            method: method.into(),
            params: Some(params),
        }
    }

    /// Whether the envelope satisfies strict 2.0 requirements.
    pub fn is_strict_2_0(&self) -> bool {
        self.jsonrpc.as_deref() == Some(VERSION) && self.id.is_some()
    }
}

/// A JSON-RPC response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: String,
    /// Echoed request identifier (`null` when it could not be read).
    pub id: Value,
    /// Result payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

/// Error object carried in a failed response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    /// Numeric JSON-RPC error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

impl RpcResponse {
    /// Build a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: VERSION.into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response.
    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: VERSION.into(),
            id,
            result: None,
            error: Some(RpcErrorBody {
                code,
                message: message.into(),
            }),
        }
    }

    /// The one error shape every dispatch failure collapses to.
    pub fn invalid_params(id: Value) -> Self {
        Self::error(id, codes::INVALID_PARAMS, INVALID_PARAMS_MESSAGE)
    }
}
