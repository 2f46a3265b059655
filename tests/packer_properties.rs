//! Property tests for the greedy chunk packer.

use plcrpc::{
    PackError,
    RequestId,
    SerializedRequest,
    framing::{join_array, joined_len, wrapped_len},
    packer::pack_serialized,
};
use proptest::prelude::*;
use test_util::rebuild_and_measure;

/// JSON objects of varying length with ids `1..=n`.
fn requests() -> impl Strategy<Value = Vec<SerializedRequest>> {
    prop::collection::vec(0usize..80, 0..40).prop_map(|pads| {
        pads.into_iter()
            .zip(1u64..)
            .map(|(pad, id)| {
                let body = format!(r#"{{"id":{id},"p":"{}"}}"#, "x".repeat(pad));
                SerializedRequest::new(RequestId::Number(id), body.into_bytes())
            })
            .collect()
    })
}

fn all_fit(reqs: &[SerializedRequest], max: usize) -> bool {
    reqs.iter()
        .all(|r| wrapped_len(r.len()).is_some_and(|len| len <= max))
}

proptest! {
    /// Chunks stay within budget, parse as arrays and keep input order.
    #[test]
    fn packed_chunks_respect_budget_and_order(reqs in requests(), max in 10usize..400) {
        prop_assume!(all_fit(&reqs, max));
        let ids: Vec<RequestId> = reqs.iter().map(|r| r.id().clone()).collect();
        let chunks = pack_serialized(reqs, max);
        prop_assert!(chunks.is_ok(), "pack failed: {:?}", chunks.err());
        let chunks = chunks.unwrap_or_default();

        let mut seen = Vec::new();
        for chunk in &chunks {
            prop_assert!(chunk.len() <= max, "chunk of {} bytes over {max}", chunk.len());
            let parsed: serde_json::Value = serde_json::from_slice(chunk.as_bytes())
                .map_err(|err| TestCaseError::fail(format!("chunk is not JSON: {err}")))?;
            let elements = parsed.as_array().map(Vec::len);
            prop_assert_eq!(elements, Some(chunk.ids().len()));
            prop_assert!(!chunk.ids().is_empty());
            seen.extend_from_slice(chunk.ids());
        }
        prop_assert_eq!(seen, ids);
    }

    /// Packing fails exactly when some request cannot fit alone.
    #[test]
    fn oversized_request_fails_the_call(reqs in requests(), max in 10usize..120) {
        let fits = all_fit(&reqs, max);
        let outcome = pack_serialized(reqs, max);
        match outcome {
            Ok(_) => prop_assert!(fits),
            Err(PackError::SizeExceeded { size, limit, .. }) => {
                prop_assert!(!fits);
                prop_assert!(size > limit);
                prop_assert_eq!(limit, max);
            }
            Err(err) => prop_assert!(false, "unexpected error: {err}"),
        }
    }

    /// A bulk request that fits whole is sent as one chunk equal to the full
    /// array.
    #[test]
    fn fitting_request_is_one_full_chunk(reqs in requests(), max in 10usize..4000) {
        let total = joined_len(reqs.iter().map(SerializedRequest::len));
        prop_assume!(!reqs.is_empty() && total.is_some_and(|len| len <= max));
        let expected = join_array(reqs.iter().map(SerializedRequest::as_bytes));
        let chunks = pack_serialized(reqs, max).unwrap_or_default();
        prop_assert_eq!(chunks.len(), 1);
        prop_assert_eq!(chunks.first().map(|c| c.as_bytes().to_vec()), Some(expected.to_vec()));
    }

    /// The running-counter packer matches the rebuild-and-measure reference
    /// chunk for chunk.
    #[test]
    fn matches_rebuild_and_measure(reqs in requests(), max in 10usize..400) {
        let reference = rebuild_and_measure(&reqs, max);
        let packed = pack_serialized(reqs, max)
            .ok()
            .map(|chunks| chunks.iter().map(|c| c.as_bytes().to_vec()).collect::<Vec<_>>());
        prop_assert_eq!(packed, reference);
    }
}
