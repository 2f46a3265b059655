//! Rebuild-and-measure reference packer.
//!
//! Re-joins the whole candidate chunk for every membership test and measures
//! the finished chunk again before emitting it. Quadratic per chunk, so it
//! only serves as an oracle for property tests of the linear packer.

use plcrpc::SerializedRequest;

/// Pack `requests` by rebuilding each candidate chunk from scratch.
///
/// Returns `None` if any request cannot fit alone. Empty input yields no
/// chunks.
#[must_use]
pub fn rebuild_and_measure(requests: &[SerializedRequest], max_bytes: usize) -> Option<Vec<Vec<u8>>> {
    let mut chunks = Vec::new();
    let mut members: Vec<&[u8]> = Vec::new();
    for request in requests {
        let mut candidate = members.clone();
        candidate.push(request.as_bytes());
        if join(&candidate).len() <= max_bytes {
            members = candidate;
            continue;
        }
        if members.is_empty() {
            return None;
        }
        let finished = join(&members);
        if finished.len() > max_bytes {
            return None;
        }
        chunks.push(finished);
        members = vec![request.as_bytes()];
        if join(&members).len() > max_bytes {
            return None;
        }
    }
    if !members.is_empty() {
        chunks.push(join(&members));
    }
    Some(chunks)
}

fn join(members: &[&[u8]]) -> Vec<u8> {
    let mut out = b"[".to_vec();
    out.extend(members.join(b",".as_slice()));
    out.push(b']');
    out
}
