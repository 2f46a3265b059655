//! Logical RPC requests and their canonical wire encoding.
//!
//! Callers build [`RpcRequest`] values; [`RpcRequest::normalize`] strips
//! null parameters, and a [`RequestSerializer`] turns the result into a
//! [`SerializedRequest`] whose byte length the packer can budget against.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON-RPC protocol version emitted in every request object.
pub const JSONRPC_VERSION: &str = "2.0";

/// Identifier correlating a request with its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric identifier.
    Number(u64),
    /// Textual identifier.
    Text(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self { Self::Number(value) }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self { Self::Text(value.to_owned()) }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self { Self::Text(value) }
}

/// A single RPC call before serialisation.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    /// Correlation identifier.
    pub id: RequestId,
    /// Method name, e.g. `"WebApp.Create"`.
    pub method: String,
    /// Named parameters. Null values are dropped by [`Self::normalize`].
    pub params: Option<Map<String, Value>>,
}

impl RpcRequest {
    /// Create a request without parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use plcrpc::request::RpcRequest;
    ///
    /// let req = RpcRequest::new(1, "Api.Ping");
    /// assert!(req.params.is_none());
    /// ```
    #[must_use]
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            method: method.into(),
            params: None,
        }
    }

    /// Add or replace one named parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace the whole parameter map.
    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    /// Drop null-valued parameters and omit the map when nothing remains.
    ///
    /// Only top-level entries are inspected; nulls nested inside parameter
    /// values are part of the value and are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use plcrpc::request::RpcRequest;
    /// use serde_json::Value;
    ///
    /// let mut req = RpcRequest::new(1, "WebApp.Create")
    ///     .with_param("name", "app")
    ///     .with_param("state", Value::Null);
    /// req.normalize();
    /// let params = req.params.as_ref().map(|p| p.len());
    /// assert_eq!(params, Some(1));
    /// ```
    pub fn normalize(&mut self) {
        self.params = self.params.take().and_then(|mut params| {
            params.retain(|_, value| !value.is_null());
            (!params.is_empty()).then_some(params)
        });
    }
}

/// One request encoded as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedRequest {
    id: RequestId,
    bytes: Vec<u8>,
}

impl SerializedRequest {
    /// Wrap pre-encoded bytes.
    ///
    /// The bytes must be a complete JSON object; the packer does not
    /// re-validate them.
    #[must_use]
    pub const fn new(id: RequestId, bytes: Vec<u8>) -> Self { Self { id, bytes } }

    /// Identifier of the encoded request.
    #[must_use]
    pub const fn id(&self) -> &RequestId { &self.id }

    /// Encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// Exact encoded length in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Returns `true` if the encoding is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Split into identifier and bytes.
    #[must_use]
    pub fn into_parts(self) -> (RequestId, Vec<u8>) { (self.id, self.bytes) }
}

/// Errors raised while encoding a request.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The JSON encoder rejected the request.
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encodes a normalised request into its wire representation.
pub trait RequestSerializer: Send + Sync {
    /// Serialise one request.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] if the request cannot be encoded.
    fn serialize(&self, request: &RpcRequest) -> Result<SerializedRequest, SerializeError>;
}

/// Default serializer producing compact JSON with a fixed field order:
/// `jsonrpc`, `method`, `id`, then `params` when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

#[derive(Serialize)]
struct WireRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    id: &'a RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a Map<String, Value>>,
}

impl RequestSerializer for JsonSerializer {
    fn serialize(&self, request: &RpcRequest) -> Result<SerializedRequest, SerializeError> {
        let wire = WireRequest {
            jsonrpc: JSONRPC_VERSION,
            method: &request.method,
            id: &request.id,
            params: request.params.as_ref(),
        };
        let bytes = serde_json::to_vec(&wire)?;
        Ok(SerializedRequest::new(request.id.clone(), bytes))
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test assertions")]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn encode(request: &RpcRequest) -> String {
        let serialized = JsonSerializer.serialize(request).expect("encode");
        String::from_utf8(serialized.as_bytes().to_vec()).expect("utf-8")
    }

    #[rstest]
    fn serializes_without_params() {
        let req = RpcRequest::new(7, "Api.Ping");
        assert_eq!(
            encode(&req),
            r#"{"jsonrpc":"2.0","method":"Api.Ping","id":7}"#
        );
    }

    #[rstest]
    fn serializes_text_id_and_params() {
        let req = RpcRequest::new("a1", "WebApp.Create").with_param("name", "app");
        assert_eq!(
            encode(&req),
            r#"{"jsonrpc":"2.0","method":"WebApp.Create","id":"a1","params":{"name":"app"}}"#
        );
    }

    #[rstest]
    fn reported_length_matches_bytes() {
        let req = RpcRequest::new(1, "Api.Browse").with_param("var", "\"DB\".x");
        let serialized = JsonSerializer.serialize(&req).expect("encode");
        assert_eq!(serialized.len(), serialized.as_bytes().len());
        assert_eq!(serialized.id(), &RequestId::Number(1));
    }

    #[rstest]
    fn normalize_strips_nulls() {
        let mut req = RpcRequest::new(1, "WebApp.SetState")
            .with_param("name", "app")
            .with_param("state", Value::Null);
        req.normalize();
        assert_eq!(encode(&req), r#"{"jsonrpc":"2.0","method":"WebApp.SetState","id":1,"params":{"name":"app"}}"#);
    }

    #[rstest]
    fn normalize_omits_empty_params() {
        let mut req = RpcRequest::new(1, "Api.Logout").with_param("token", Value::Null);
        req.normalize();
        assert!(req.params.is_none());
        assert!(!encode(&req).contains("params"));
    }

    #[rstest]
    fn normalize_keeps_nested_nulls() {
        let mut req = RpcRequest::new(1, "PlcProgram.Write").with_param("value", json!([null, 1]));
        req.normalize();
        assert_eq!(
            req.params.as_ref().and_then(|p| p.get("value")),
            Some(&json!([null, 1]))
        );
    }

    #[rstest]
    #[case(RequestId::Number(3), "3")]
    #[case(RequestId::Text("x".to_owned()), "\"x\"")]
    fn request_id_display(#[case] id: RequestId, #[case] expected: &str) {
        assert_eq!(id.to_string(), expected);
    }
}
