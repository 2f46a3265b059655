//! HTTP status helpers.

use http::StatusCode;

/// Reason reported for codes without a canonical phrase.
pub const UNKNOWN_REASON: &str = "Unknown Status";

/// Whether the HTTP layer reports success for a JSON-RPC call.
///
/// Only `200 OK` and `201 Created` qualify; some PLC operations answer with
/// the latter.
#[must_use]
pub fn is_success(status: u16) -> bool {
    StatusCode::from_u16(status)
        .is_ok_and(|code| matches!(code, StatusCode::OK | StatusCode::CREATED))
}

/// Canonical reason phrase for `status`.
///
/// # Examples
///
/// ```
/// use plcrpc::classify::reason_phrase;
///
/// assert_eq!(reason_phrase(409), "Conflict");
/// assert_eq!(reason_phrase(422), "Unprocessable Entity");
/// assert_eq!(reason_phrase(799), "Unknown Status");
/// ```
#[must_use]
pub fn reason_phrase(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or(UNKNOWN_REASON)
}
