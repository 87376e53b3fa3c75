//! JSON-RPC 2.0 message types for the server session.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Process-wide request ID generator.
static REQUEST_ID: AtomicI64 = AtomicI64::new(1);

/// Returns the next request ID.
///
/// IDs are monotonically increasing and safe to draw from any thread.
#[must_use]
pub fn next_request_id() -> i64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always "2.0".
    pub jsonrpc: &'static str,
    /// Unique request identifier.
    pub id: i64,
    /// The method to invoke.
    pub method: String,
    /// Optional parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Creates a request with an auto-generated ID.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: next_request_id(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 notification (no response expected).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    /// Protocol version, always "2.0".
    pub jsonrpc: &'static str,
    /// The method to invoke.
    pub method: String,
    /// Optional parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Creates a notification.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version.
    pub jsonrpc: String,
    /// Identifier of the request this answers.
    pub id: Option<i64>,
    /// The result on success.
    #[serde(default)]
    pub result: Option<Value>,
    /// The error on failure.
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional data.
    #[serde(default)]
    pub data: Option<Value>,
}

/// A server-initiated request.
#[derive(Debug, Clone)]
pub struct JsonRpcServerRequest {
    /// Request identifier, when it is an integer.
    pub id: Option<i64>,
    /// The method the server wants invoked.
    pub method: String,
    /// Optional parameters.
    pub params: Option<Value>,
}

/// An incoming message, classified by shape.
///
/// A payload with a `method` is a server request when it also carries an
/// `id`, otherwise a notification; everything else is a response.
#[derive(Debug)]
pub enum JsonRpcMessage {
    /// Response to one of the client's requests.
    Response(JsonRpcResponse),
    /// Server-initiated request that expects an answer.
    ServerRequest(JsonRpcServerRequest),
    /// Server-initiated notification.
    Notification(JsonRpcNotification),
}

impl JsonRpcMessage {
    /// Classifies a raw message payload.
    ///
    /// # Errors
    ///
    /// Returns the underlying decode error when the payload is not valid
    /// JSON or a response fails to deserialise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(bytes)?;

        let Some(method) = value.get("method").and_then(Value::as_str).map(str::to_owned) else {
            return serde_json::from_value(value).map(Self::Response);
        };

        let params = value.get("params").cloned();
        if let Some(id) = value.get("id") {
            return Ok(Self::ServerRequest(JsonRpcServerRequest {
                id: id.as_i64(),
                method,
                params,
            }));
        }

        Ok(Self::Notification(JsonRpcNotification::new(method, params)))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn serialises_request_with_params() {
        let request = JsonRpcRequest::new(
            "initialize",
            Some(json!({"rootUri": "file:///workspace"})),
        );
        let encoded = serde_json::to_string(&request).expect("serialisation failed");

        assert!(encoded.contains(r#""jsonrpc":"2.0""#));
        assert!(encoded.contains(r#""method":"initialize""#));
        assert!(encoded.contains(r#""params""#));
    }

    #[rstest]
    fn notifications_omit_the_id() {
        let notification = JsonRpcNotification::new("initialized", Some(json!({})));
        let encoded = serde_json::to_string(&notification).expect("serialisation failed");

        assert!(encoded.contains(r#""method":"initialized""#));
        assert!(!encoded.contains("\"id\""));
    }

    #[rstest]
    fn omits_params_when_absent() {
        let notification = JsonRpcNotification::new("exit", None);
        let encoded = serde_json::to_string(&notification).expect("serialisation failed");

        assert!(!encoded.contains("params"));
    }

    #[rstest]
    fn request_ids_increase_monotonically() {
        let first = next_request_id();
        let second = next_request_id();

        assert!(second > first);
    }

    #[rstest]
    fn classifies_responses() {
        let payload = br#"{"jsonrpc":"2.0","id":1,"result":{"capabilities":{}}}"#;

        let message = JsonRpcMessage::from_bytes(payload).expect("classification failed");

        match message {
            JsonRpcMessage::Response(response) => {
                assert_eq!(response.id, Some(1));
                assert!(response.result.is_some());
                assert!(response.error.is_none());
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[rstest]
    fn classifies_error_responses() {
        let payload =
            br#"{"jsonrpc":"2.0","id":7,"error":{"code":-32600,"message":"invalid request"}}"#;

        let message = JsonRpcMessage::from_bytes(payload).expect("classification failed");

        match message {
            JsonRpcMessage::Response(response) => {
                let error = response.error.expect("error missing");
                assert_eq!(error.code, -32600);
                assert_eq!(error.message, "invalid request");
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[rstest]
    fn classifies_server_requests() {
        let payload =
            br#"{"jsonrpc":"2.0","id":3,"method":"window/showMessageRequest","params":{}}"#;

        let message = JsonRpcMessage::from_bytes(payload).expect("classification failed");

        match message {
            JsonRpcMessage::ServerRequest(request) => {
                assert_eq!(request.id, Some(3));
                assert_eq!(request.method, "window/showMessageRequest");
            }
            other => panic!("expected server request, got {other:?}"),
        }
    }

    #[rstest]
    fn classifies_notifications() {
        let payload = br#"{"jsonrpc":"2.0","method":"textDocument/publishDiagnostics","params":{}}"#;

        let message = JsonRpcMessage::from_bytes(payload).expect("classification failed");

        match message {
            JsonRpcMessage::Notification(notification) => {
                assert_eq!(notification.method, "textDocument/publishDiagnostics");
            }
            other => panic!("expected notification, got {other:?}"),
        }
    }

    #[rstest]
    fn rejects_invalid_payloads() {
        let result = JsonRpcMessage::from_bytes(b"not json");

        assert!(result.is_err());
    }
}
