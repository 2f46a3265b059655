//! Request fixtures used by integration tests.

use plcrpc::{JsonSerializer, RequestSerializer, RpcRequest};

/// Numbered `Api.Ping` requests with ids `1..=count`.
#[must_use]
pub fn ping_requests(count: u64) -> Vec<RpcRequest> {
    (1..=count).map(|id| RpcRequest::new(id, "Api.Ping")).collect()
}

/// A request whose default JSON encoding is exactly `len` bytes.
///
/// The method name is padded to reach the target length.
///
/// # Panics
///
/// Panics if `len` is shorter than the encoding of an empty method name.
#[must_use]
pub fn sized_request(id: u64, len: usize) -> RpcRequest {
    let bare = RpcRequest::new(id, "");
    let base = JsonSerializer
        .serialize(&bare)
        .map(|s| s.len())
        .unwrap_or_else(|err| panic!("encoding a bare request failed: {err}"));
    let padding = len
        .checked_sub(base)
        .unwrap_or_else(|| panic!("{len} bytes is below the {base} byte minimum"));
    RpcRequest::new(id, "M".repeat(padding))
}
