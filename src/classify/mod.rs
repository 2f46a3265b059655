//! Classification of raw transport results.
//!
//! [`ResponseClassifier::classify`] checks the HTTP status first; only a
//! `200` or `201` reply has its body inspected. The body must be a JSON-RPC
//! response object, or an array of them, with one response per request the
//! chunk carried. Any non-null `error`, whether in a single object or in one
//! array element, becomes an [`RpcFailure`]. A body that is not a JSON-RPC
//! response, or answers a different number of requests, becomes
//! [`ClassifyError::MalformedResponse`]. A body that passes is returned
//! unchanged.

pub mod errors;
pub mod status;
pub mod taxonomy;

pub use errors::{ClassifyError, RpcFailure};
use serde::Deserialize;
use serde_json::{Map, Value};
pub use status::{UNKNOWN_REASON, is_success, reason_phrase};
pub use taxonomy::{ErrorTaxonomy, RpcErrorKind};
use tracing::warn;

use crate::request::RequestId;

/// Error object of a JSON-RPC response.
///
/// JSON-RPC codes are integers, so a float code such as `1.0` is rejected
/// as malformed.
#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Classifies transport results against an [`ErrorTaxonomy`].
#[derive(Debug, Clone, Default)]
pub struct ResponseClassifier {
    taxonomy: ErrorTaxonomy,
}

impl ResponseClassifier {
    /// Create a classifier with the built-in taxonomy.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create a classifier with a caller-supplied taxonomy.
    #[must_use]
    pub const fn with_taxonomy(taxonomy: ErrorTaxonomy) -> Self { Self { taxonomy } }

    /// The taxonomy used to select RPC failure kinds.
    #[must_use]
    pub const fn taxonomy(&self) -> &ErrorTaxonomy { &self.taxonomy }

    /// Classify one reply to `request`, a chunk carrying `expected`
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidHttpRequest`] for a status other than
    /// 200 or 201, [`ClassifyError::Rpc`] when the envelope or any batch
    /// element carries an error, and [`ClassifyError::MalformedResponse`]
    /// when the body is not a JSON-RPC response or does not hold `expected`
    /// responses.
    ///
    /// # Examples
    ///
    /// ```
    /// use plcrpc::classify::ResponseClassifier;
    ///
    /// let classifier = ResponseClassifier::new();
    /// let body = r#"[{"id":1,"result":true}]"#;
    /// assert_eq!(classifier.classify(200, body, "[...]", 1).unwrap(), body);
    /// assert!(classifier.classify(200, body, "[...]", 2).is_err());
    /// assert!(classifier.classify(409, body, "[...]", 1).is_err());
    /// ```
    pub fn classify<'b>(
        &self,
        status: u16,
        body: &'b str,
        request: &str,
        expected: usize,
    ) -> Result<&'b str, ClassifyError> {
        if !is_success(status) {
            let reason = reason_phrase(status);
            warn!(status, reason, "http layer rejected request");
            return Err(ClassifyError::InvalidHttpRequest {
                request: request.to_owned(),
                status,
                reason,
            });
        }

        let envelope: Value = serde_json::from_str(body)
            .map_err(|err| malformed(request, body, format!("invalid json: {err}")))?;
        let answered = match &envelope {
            Value::Object(object) => {
                self.check_response(object, body, request, None)?;
                1
            }
            Value::Array(items) => self.check_batch(items, body, request)?,
            _ => return Err(malformed(request, body, "expected an object or array".to_owned())),
        };
        if answered != expected {
            return Err(malformed(
                request,
                body,
                format!("expected {expected} responses, got {answered}"),
            ));
        }
        Ok(body)
    }

    /// Returns the number of responses in the batch.
    fn check_batch(
        &self,
        items: &[Value],
        body: &str,
        request: &str,
    ) -> Result<usize, ClassifyError> {
        if items.is_empty() {
            return Err(malformed(request, body, "empty batch response".to_owned()));
        }
        let mut objects = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(object) = item.as_object() else {
                return Err(malformed(
                    request,
                    body,
                    format!("batch element {index} is not an object"),
                ));
            };
            if !has_error(object) && !object.contains_key("result") {
                return Err(malformed(
                    request,
                    body,
                    format!("batch element {index} has neither result nor error"),
                ));
            }
            objects.push(object);
        }
        for (index, object) in objects.into_iter().enumerate() {
            self.check_response(object, body, request, Some(index))?;
        }
        Ok(items.len())
    }

    fn check_response(
        &self,
        object: &Map<String, Value>,
        body: &str,
        request: &str,
        element: Option<usize>,
    ) -> Result<(), ClassifyError> {
        match object.get("error") {
            Some(Value::Null) | None => {
                if object.contains_key("result") {
                    Ok(())
                } else {
                    Err(malformed(request, body, "response has neither result nor error".to_owned()))
                }
            }
            Some(error) => {
                let parsed = ErrorObject::deserialize(error)
                    .map_err(|err| malformed(request, body, format!("invalid error object: {err}")))?;
                let kind = self.taxonomy.kind_of(parsed.code);
                let id = object
                    .get("id")
                    .and_then(|id| RequestId::deserialize(id).ok());
                warn!(
                    code = parsed.code,
                    kind = %kind,
                    element,
                    message = %parsed.message,
                    "rpc call failed"
                );
                Err(RpcFailure {
                    kind,
                    code: parsed.code,
                    message: parsed.message,
                    data: parsed.data,
                    id,
                    request: request.to_owned(),
                }
                .into())
            }
        }
    }
}

fn has_error(object: &Map<String, Value>) -> bool {
    object.get("error").is_some_and(|e| !e.is_null())
}

fn malformed(request: &str, body: &str, reason: String) -> ClassifyError {
    warn!(%reason, "malformed rpc response");
    ClassifyError::MalformedResponse {
        request: request.to_owned(),
        body: body.to_owned(),
        reason,
    }
}
