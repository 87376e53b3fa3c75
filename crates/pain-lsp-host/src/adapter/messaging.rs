//! Request/response plumbing over a framed transport.

use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::AdapterError;
use super::jsonrpc::{JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use super::lifecycle::ADAPTER_TARGET;
use super::transport::StdioTransport;

/// Upper bound on interleaved messages consumed while awaiting a response.
const MAX_RESPONSE_ITERATIONS: usize = 100;

/// Sends a request and returns the raw matching response.
///
/// Server errors embedded in the response are lifted into [`AdapterError`].
pub(super) fn send_request_raw<R, W, P>(
    transport: &mut StdioTransport<R, W>,
    method: &str,
    params: P,
) -> Result<JsonRpcResponse, AdapterError>
where
    R: Read,
    W: Write,
    P: Serialize,
{
    let params_value = serde_json::to_value(params)?;
    let request = JsonRpcRequest::new(method, Some(params_value));
    let request_id = request.id;
    let payload = serde_json::to_vec(&request)?;

    debug!(target: ADAPTER_TARGET, method, id = request_id, "sending request");

    transport.send(&payload)?;
    let response = receive_response_for_request(transport, request_id)?;

    if let Some(error) = response.error {
        return Err(AdapterError::from_jsonrpc(error));
    }

    Ok(response)
}

/// Sends a request and deserialises the response payload.
pub(super) fn send_request<R, W, P, T>(
    transport: &mut StdioTransport<R, W>,
    method: &str,
    params: P,
) -> Result<T, AdapterError>
where
    R: Read,
    W: Write,
    P: Serialize,
    T: DeserializeOwned,
{
    let response = send_request_raw(transport, method, params)?;
    let result = response
        .result
        .ok_or_else(|| AdapterError::InitializationFailed {
            message: "empty result in response".to_owned(),
        })?;
    serde_json::from_value(result).map_err(AdapterError::from)
}

/// Sends a notification (no response expected).
pub(super) fn send_notification<R, W, P>(
    transport: &mut StdioTransport<R, W>,
    method: &str,
    params: Option<P>,
) -> Result<(), AdapterError>
where
    R: Read,
    W: Write,
    P: Serialize,
{
    let params_value = match params {
        Some(params) => Some(serde_json::to_value(params)?),
        None => None,
    };
    let notification = JsonRpcNotification::new(method, params_value);
    let payload = serde_json::to_vec(&notification)?;

    debug!(target: ADAPTER_TARGET, method, "sending notification");

    transport.send(&payload)?;
    Ok(())
}

/// Reads messages until the response matching `request_id` arrives.
///
/// Interleaved server notifications and server-initiated requests are
/// skipped. The loop is bounded so a chatty or misbehaving server cannot
/// stall the host indefinitely.
pub(super) fn receive_response_for_request<R, W>(
    transport: &mut StdioTransport<R, W>,
    request_id: i64,
) -> Result<JsonRpcResponse, AdapterError>
where
    R: Read,
    W: Write,
{
    for _ in 0..MAX_RESPONSE_ITERATIONS {
        let payload = transport.receive()?;

        match JsonRpcMessage::from_bytes(&payload)? {
            JsonRpcMessage::Response(response) => {
                if response.id == Some(request_id) {
                    return Ok(response);
                }
                warn!(
                    target: ADAPTER_TARGET,
                    expected = request_id,
                    received = ?response.id,
                    "skipping response with non-matching ID"
                );
            }
            JsonRpcMessage::ServerRequest(request) => {
                warn!(
                    target: ADAPTER_TARGET,
                    method = %request.method,
                    id = ?request.id,
                    "ignoring server-initiated request"
                );
            }
            JsonRpcMessage::Notification(notification) => {
                debug!(
                    target: ADAPTER_TARGET,
                    method = %notification.method,
                    "skipping server notification"
                );
            }
        }
    }

    warn!(
        target: ADAPTER_TARGET,
        request_id,
        max_iterations = MAX_RESPONSE_ITERATIONS,
        "giving up on response after reaching maximum iterations"
    );
    Err(AdapterError::MaxResponseIterations { request_id })
}
