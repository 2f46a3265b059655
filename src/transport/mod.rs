//! Transport boundary for posting chunk bodies.
//!
//! The crate does not ship an HTTP client. Applications implement
//! [`Transport`] over whichever client they already use; the bulk client
//! only needs the status code and body text of each reply.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Status and body of one HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl TransportResponse {
    /// Create a response.
    ///
    /// # Examples
    ///
    /// ```
    /// use plcrpc::transport::TransportResponse;
    ///
    /// let res = TransportResponse::new(200, r#"{"id":1,"result":true}"#);
    /// assert_eq!(res.status, 200);
    /// ```
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Errors reported by a transport before any HTTP status is available.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established or was lost.
    #[error("connection failed: {0}")]
    Connection(String),
    /// An I/O error occurred while sending or receiving.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The exchange did not complete in time.
    #[error("transport timed out")]
    Timeout,
}

/// Posts one chunk body to the server.
///
/// Implementations must not retry on their own behalf once the body has been
/// handed to the network; retry policy belongs to the caller of the bulk
/// client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `path` with a JSON content type.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no HTTP reply was obtained.
    async fn post(&self, path: &str, body: Bytes) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn post(&self, path: &str, body: Bytes) -> Result<TransportResponse, TransportError> {
        (**self).post(path, body).await
    }
}
