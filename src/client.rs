//! Bulk call orchestration.
//!
//! [`BulkClient::send`] packs the requests, posts the chunks one after
//! another and classifies each reply. Chunks are sent strictly in order so
//! the reply to chunk `n` is attributed to exactly the requests packed into
//! chunk `n`. A reply must answer every request in its chunk, and an error
//! for any one of them fails the chunk. The first failure ends the call;
//! chunks after it are not sent.
//!
//! Each post races the caller's [`CancellationToken`]. Once the token fires
//! the in-flight post is dropped and no further chunk is sent. Requests that
//! already reached the server are not rolled back.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    classify::{ClassifyError, ResponseClassifier},
    config::BulkConfig,
    packer::{PackError, Packer},
    request::{JsonSerializer, RequestId, RequestSerializer, RpcRequest},
    transport::{Transport, TransportError},
};

/// Raw reply body for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReply {
    /// Requests the chunk carried, in order.
    pub ids: Vec<RequestId>,
    /// Body as received; already classified as a success.
    pub body: String,
}

/// Replies for every chunk of a bulk call, in chunk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReply {
    /// One entry per chunk.
    pub chunks: Vec<ChunkReply>,
}

impl BulkReply {
    /// Number of requests answered across all chunks.
    #[must_use]
    pub fn request_count(&self) -> usize { self.chunks.iter().map(|c| c.ids.len()).sum() }

    /// Iterate over the reply bodies.
    pub fn bodies(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.body.as_str())
    }
}

/// Failure of a bulk call.
#[derive(Debug, Error)]
pub enum BulkError {
    /// The requests could not be packed; nothing was sent.
    #[error(transparent)]
    Pack(#[from] PackError),
    /// No HTTP reply was obtained for a chunk.
    #[error("chunk {chunk} could not be delivered")]
    Transport {
        /// Zero-based chunk index.
        chunk: usize,
        /// Requests the chunk carried.
        ids: Vec<RequestId>,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },
    /// The reply to a chunk was classified as a failure.
    #[error("chunk {chunk} was rejected")]
    Rejected {
        /// Zero-based chunk index.
        chunk: usize,
        /// Requests the chunk carried.
        ids: Vec<RequestId>,
        /// Classification failure.
        #[source]
        source: Box<ClassifyError>,
    },
    /// The caller cancelled the call.
    #[error("bulk call cancelled after {completed} of {total} chunks")]
    Cancelled {
        /// Chunks whose replies were received and classified.
        completed: usize,
        /// Chunks the call was packed into.
        total: usize,
    },
}

impl BulkError {
    /// Requests attributable to the failed chunk, if the failure is tied to one.
    #[must_use]
    pub fn ids(&self) -> Option<&[RequestId]> {
        match self {
            Self::Transport { ids, .. } | Self::Rejected { ids, .. } => Some(ids),
            Self::Pack(_) | Self::Cancelled { .. } => None,
        }
    }
}

/// Sends bulk requests through a [`Transport`].
///
/// Holds no per-call state, so one client can serve concurrent calls.
#[derive(Debug)]
pub struct BulkClient<T, S = JsonSerializer> {
    transport: T,
    packer: Packer<S>,
    classifier: ResponseClassifier,
    endpoint: String,
}

impl<T: Transport> BulkClient<T> {
    /// Create a client from configuration using the default serializer and
    /// taxonomy.
    #[must_use]
    pub fn new(transport: T, config: &BulkConfig) -> Self {
        Self {
            transport,
            packer: Packer::new(config.max_chunk_bytes),
            classifier: ResponseClassifier::new(),
            endpoint: config.endpoint.clone(),
        }
    }
}

impl<T: Transport, S: RequestSerializer> BulkClient<T, S> {
    /// Create a client from explicit parts.
    #[must_use]
    pub fn from_parts(
        transport: T,
        packer: Packer<S>,
        classifier: ResponseClassifier,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            packer,
            classifier,
            endpoint: endpoint.into(),
        }
    }

    /// Replace the response classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: ResponseClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// The wrapped transport.
    #[must_use]
    pub const fn transport(&self) -> &T { &self.transport }

    /// Pack, post and classify `requests`.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::Pack`] before anything is sent if packing fails,
    /// [`BulkError::Transport`] or [`BulkError::Rejected`] for the first
    /// chunk that fails, and [`BulkError::Cancelled`] once `cancel` fires.
    pub async fn send<I>(
        &self,
        requests: I,
        cancel: &CancellationToken,
    ) -> Result<BulkReply, BulkError>
    where
        I: IntoIterator<Item = RpcRequest>,
    {
        let chunks = self.packer.pack(requests)?;
        let total = chunks.len();
        let mut reply = BulkReply {
            chunks: Vec::with_capacity(total),
        };

        for (index, chunk) in chunks.into_iter().enumerate() {
            debug!(
                chunk = index,
                requests = chunk.ids().len(),
                bytes = chunk.len(),
                "posting chunk"
            );
            #[expect(
                clippy::integer_division_remainder_used,
                reason = "tokio::select! macro usage"
            )]
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                result = self.transport.post(&self.endpoint, chunk.bytes()) => Some(result),
            };
            let Some(result) = outcome else {
                info!(completed = index, total, "bulk call cancelled");
                return Err(BulkError::Cancelled {
                    completed: index,
                    total,
                });
            };
            let (bytes, ids) = chunk.into_parts();
            let response = match result {
                Ok(response) => response,
                Err(source) => {
                    warn!(chunk = index, error = %source, "chunk delivery failed");
                    return Err(BulkError::Transport {
                        chunk: index,
                        ids,
                        source,
                    });
                }
            };
            let request_text = String::from_utf8_lossy(&bytes);
            if let Err(source) = self.classifier.classify(
                response.status,
                &response.body,
                &request_text,
                ids.len(),
            ) {
                warn!(chunk = index, error = %source, "chunk rejected");
                return Err(BulkError::Rejected {
                    chunk: index,
                    ids,
                    source: Box::new(source),
                });
            }
            reply.chunks.push(ChunkReply {
                ids,
                body: response.body,
            });
        }

        info!(
            chunks = total,
            requests = reply.request_count(),
            "bulk call completed"
        );
        Ok(reply)
    }
}
