//! Greedy first-fit packing of serialised requests into bounded chunks.
//!
//! [`Packer::pack`] normalises and serialises each request, then walks them
//! once in input order while tracking the running chunk length. A request
//! that fits is appended to the open chunk; one that does not closes the
//! chunk and opens the next. Requests are never reordered or split, so the
//! concatenated order across chunks is the input order.
//!
//! Every request is checked against the budget on its own before anything
//! is accumulated, which makes the call all-or-nothing: either every chunk
//! is returned or [`PackError::SizeExceeded`] is.

pub mod errors;

use bytes::{BufMut, Bytes, BytesMut};
pub use errors::PackError;
use tracing::debug;

use crate::{
    framing::{ARRAY_CLOSE, ARRAY_OPEN, SEPARATOR, join_array, joined_len, wrapped_len},
    request::{JsonSerializer, RequestId, RequestSerializer, RpcRequest, SerializedRequest},
};

/// One JSON array body ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    bytes: Bytes,
    ids: Vec<RequestId>,
}

impl Chunk {
    /// The framed bytes, `[` through `]`.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// A cheap handle to the framed bytes.
    #[must_use]
    pub fn bytes(&self) -> Bytes { self.bytes.clone() }

    /// Length of the framed bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Returns `true` if the chunk holds no bytes. Packed chunks never do.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Identifiers of the packed requests, in packing order.
    #[must_use]
    pub fn ids(&self) -> &[RequestId] { &self.ids }

    /// Split into the framed bytes and request identifiers.
    #[must_use]
    pub fn into_parts(self) -> (Bytes, Vec<RequestId>) { (self.bytes, self.ids) }
}

/// Packs logical requests under a fixed byte budget.
#[derive(Debug, Clone)]
pub struct Packer<S = JsonSerializer> {
    max_bytes: usize,
    serializer: S,
}

impl Packer<JsonSerializer> {
    /// Create a packer using the default JSON serializer.
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            serializer: JsonSerializer,
        }
    }
}

impl<S: RequestSerializer> Packer<S> {
    /// Create a packer with a custom serializer.
    #[must_use]
    pub const fn with_serializer(max_bytes: usize, serializer: S) -> Self {
        Self {
            max_bytes,
            serializer,
        }
    }

    /// Maximum chunk size in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> usize { self.max_bytes }

    /// Normalise, serialise and pack `requests` into chunks.
    ///
    /// Empty input yields no chunks.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Serialize`] if a request cannot be encoded and
    /// [`PackError::SizeExceeded`] if any request cannot fit alone.
    pub fn pack<I>(&self, requests: I) -> Result<Vec<Chunk>, PackError>
    where
        I: IntoIterator<Item = RpcRequest>,
    {
        let serialized = requests
            .into_iter()
            .map(|mut request| {
                request.normalize();
                self.serializer
                    .serialize(&request)
                    .map_err(|source| PackError::Serialize {
                        id: request.id,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        pack_serialized(serialized, self.max_bytes)
    }
}

/// Pack `requests` with the default serializer.
///
/// # Errors
///
/// See [`Packer::pack`].
pub fn pack<I>(requests: I, max_bytes: usize) -> Result<Vec<Chunk>, PackError>
where
    I: IntoIterator<Item = RpcRequest>,
{
    Packer::new(max_bytes).pack(requests)
}

/// Pack already serialised requests into chunks of at most `max_bytes`.
///
/// # Errors
///
/// Returns [`PackError::SizeExceeded`] if any request wrapped as a
/// one-element array is longer than `max_bytes`.
///
/// # Examples
///
/// ```
/// use plcrpc::{packer::pack_serialized, request::{RequestId, SerializedRequest}};
///
/// let reqs: Vec<_> = (1..=3)
///     .map(|n| SerializedRequest::new(RequestId::Number(n), vec![b'x'; 40]))
///     .collect();
/// let chunks = pack_serialized(reqs, 100).unwrap();
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[0].len(), 83);
/// assert_eq!(chunks[1].len(), 42);
/// ```
pub fn pack_serialized(
    requests: Vec<SerializedRequest>,
    max_bytes: usize,
) -> Result<Vec<Chunk>, PackError> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }
    ensure_each_fits(&requests, max_bytes)?;

    if joined_len(requests.iter().map(SerializedRequest::len)).is_some_and(|len| len <= max_bytes)
    {
        let bytes = join_array(requests.iter().map(SerializedRequest::as_bytes)).freeze();
        debug!(
            requests = requests.len(),
            bytes = bytes.len(),
            "bulk request fits a single chunk"
        );
        let ids = requests.into_iter().map(|r| r.into_parts().0).collect();
        return Ok(vec![Chunk { bytes, ids }]);
    }

    let mut chunks = Vec::new();
    let mut open = OpenChunk::new(max_bytes);
    for request in requests {
        if !open.fits(request.len()) {
            chunks.push(open.close(chunks.len()));
        }
        open.push(request);
    }
    if !open.is_empty() {
        chunks.push(open.close(chunks.len()));
    }
    Ok(chunks)
}

fn ensure_each_fits(requests: &[SerializedRequest], max_bytes: usize) -> Result<(), PackError> {
    for request in requests {
        let size = wrapped_len(request.len()).unwrap_or(usize::MAX);
        if size > max_bytes {
            return Err(PackError::SizeExceeded {
                id: request.id().clone(),
                size,
                limit: max_bytes,
            });
        }
    }
    Ok(())
}

/// Chunk under construction.
///
/// `buf` always starts with `[` and holds no closing bracket until
/// [`OpenChunk::close`].
struct OpenChunk {
    buf: BytesMut,
    ids: Vec<RequestId>,
    max_bytes: usize,
}

impl OpenChunk {
    fn new(max_bytes: usize) -> Self {
        let mut buf = BytesMut::new();
        buf.put_u8(ARRAY_OPEN);
        Self {
            buf,
            ids: Vec::new(),
            max_bytes,
        }
    }

    fn is_empty(&self) -> bool { self.ids.is_empty() }

    fn added_len(&self, element_len: usize) -> usize {
        element_len.saturating_add(usize::from(!self.is_empty()))
    }

    /// Whether an element fits once the closing bracket is counted.
    fn fits(&self, element_len: usize) -> bool {
        self.buf
            .len()
            .saturating_add(self.added_len(element_len))
            .saturating_add(1)
            <= self.max_bytes
    }

    fn push(&mut self, request: SerializedRequest) {
        let (id, bytes) = request.into_parts();
        if !self.is_empty() {
            self.buf.put_u8(SEPARATOR);
        }
        self.buf.put_slice(&bytes);
        self.ids.push(id);
    }

    fn close(&mut self, index: usize) -> Chunk {
        let mut buf = std::mem::replace(&mut self.buf, BytesMut::new());
        buf.put_u8(ARRAY_CLOSE);
        self.buf.put_u8(ARRAY_OPEN);
        let ids = std::mem::take(&mut self.ids);
        debug!(
            chunk = index,
            requests = ids.len(),
            bytes = buf.len(),
            "closed chunk"
        );
        Chunk {
            bytes: buf.freeze(),
            ids,
        }
    }
}
