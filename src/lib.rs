//! Bulk-request transport for a PLC web server's JSON-RPC-over-HTTP API.
//!
//! The crate packs logical RPC requests into JSON array chunks that respect
//! the server's maximum request size, sends each chunk through a pluggable
//! [`transport::Transport`], and classifies every HTTP reply into either the
//! raw body or a typed failure. Typed per-method wrappers, authentication and
//! retry policy live in higher layers and are not provided here.
//!
//! Packing and classification are pure and synchronous; only
//! [`client::BulkClient::send`] awaits I/O.

pub mod classify;
pub mod client;
pub mod config;
pub mod framing;
pub mod packer;
pub mod request;
pub mod transport;

pub use classify::{ClassifyError, ErrorTaxonomy, ResponseClassifier, RpcErrorKind, RpcFailure};
pub use client::{BulkClient, BulkError, BulkReply, ChunkReply};
pub use config::{BulkConfig, ConfigError};
pub use packer::{Chunk, PackError, Packer, pack};
pub use request::{JsonSerializer, RequestId, RequestSerializer, RpcRequest, SerializedRequest};
pub use transport::{Transport, TransportError, TransportResponse};
