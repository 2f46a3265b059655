//! Typed failures produced by the response classifier.

use serde_json::Value;
use thiserror::Error;

use super::RpcErrorKind;
use crate::request::RequestId;

/// A JSON-RPC error reported inside a successful HTTP reply.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("rpc error {code} ({kind}): {message}")]
pub struct RpcFailure {
    /// Kind selected from the [`ErrorTaxonomy`](super::ErrorTaxonomy).
    pub kind: RpcErrorKind,
    /// Raw error code.
    pub code: i64,
    /// Server message.
    pub message: String,
    /// Optional structured detail.
    pub data: Option<Value>,
    /// Id of the failed request, when the server echoed a usable one.
    pub id: Option<RequestId>,
    /// Request text the failure answers.
    pub request: String,
}

/// Failure classes for one transport result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// The server answered with a status other than 200 or 201.
    #[error("request rejected with HTTP {status} {reason}")]
    InvalidHttpRequest {
        /// Request text that was sent.
        request: String,
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for `status`.
        reason: &'static str,
    },
    /// The JSON-RPC envelope carries an error object.
    #[error(transparent)]
    Rpc(Box<RpcFailure>),
    /// The body is not a JSON-RPC response.
    #[error("malformed response: {reason}")]
    MalformedResponse {
        /// Request text that was sent.
        request: String,
        /// Body as received.
        body: String,
        /// What failed to parse.
        reason: String,
    },
}

impl ClassifyError {
    /// Request text carried by every failure.
    #[must_use]
    pub fn request(&self) -> &str {
        match self {
            Self::InvalidHttpRequest { request, .. } | Self::MalformedResponse { request, .. } => {
                request
            }
            Self::Rpc(failure) => &failure.request,
        }
    }

    /// The RPC error kind, if this is an RPC failure.
    #[must_use]
    pub fn rpc_kind(&self) -> Option<RpcErrorKind> {
        match self {
            Self::Rpc(failure) => Some(failure.kind),
            Self::InvalidHttpRequest { .. } | Self::MalformedResponse { .. } => None,
        }
    }
}

impl From<RpcFailure> for ClassifyError {
    fn from(failure: RpcFailure) -> Self { Self::Rpc(Box::new(failure)) }
}
