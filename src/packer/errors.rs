//! Error types for chunk packing.

use thiserror::Error;

use crate::request::{RequestId, SerializeError};

/// Errors that abort a whole [`pack`](super::pack) call.
#[derive(Debug, Error)]
pub enum PackError {
    /// A request cannot fit in a chunk even on its own.
    #[error("request {id} needs {size} bytes framed, exceeding the {limit} byte chunk limit")]
    SizeExceeded {
        /// Offending request.
        id: RequestId,
        /// Length of the request wrapped as a one-element array.
        size: usize,
        /// Configured maximum chunk size.
        limit: usize,
    },
    /// The serializer rejected a request.
    #[error("failed to serialise request {id}")]
    Serialize {
        /// Offending request.
        id: RequestId,
        /// Underlying encoder failure.
        #[source]
        source: SerializeError,
    },
}
