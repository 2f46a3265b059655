//! AFL target for response classification and chunk packing.
//!
//! The first input byte selects the mode. Mode 0 classifies the remaining
//! bytes as a chunk reply body. Mode 1 reads a budget byte and packs the
//! remaining lines as serialised requests.

unsafe extern "C" {
    fn __AFL_LOOP(cnt: u32) -> i32;
}

use std::io::{self, Read};

use plcrpc::{
    PackError,
    RequestId,
    ResponseClassifier,
    SerializedRequest,
    packer::pack_serialized,
};

const MAX_INPUT: u64 = 64 * 1024;

fn classify(body: &[u8]) {
    let text = String::from_utf8_lossy(body);
    let classifier = ResponseClassifier::new();
    if let Ok(returned) = classifier.classify(200, &text, "[]", 1) {
        assert!(std::ptr::eq(returned, text.as_ref()), "classifier altered the body");
    }
    assert!(
        classifier.classify(409, &text, "[]", 1).is_err(),
        "HTTP failure classified as success"
    );
}

fn pack(budget: u8, rest: &[u8]) {
    let max = 16 + usize::from(budget) * 4;
    let requests: Vec<SerializedRequest> = rest
        .split(|b| *b == b'\n')
        .zip(1u64..)
        .map(|(line, id)| SerializedRequest::new(RequestId::Number(id), line.to_vec()))
        .collect();
    let expected: Vec<RequestId> = requests.iter().map(|r| r.id().clone()).collect();
    match pack_serialized(requests, max) {
        Ok(chunks) => {
            assert!(chunks.iter().all(|c| c.len() <= max), "chunk over budget");
            let seen: Vec<RequestId> = chunks.iter().flat_map(|c| c.ids().to_vec()).collect();
            assert_eq!(seen, expected, "request order changed");
        }
        Err(PackError::SizeExceeded { size, limit, .. }) => {
            assert!(size > limit, "size error within budget");
        }
        Err(PackError::Serialize { .. }) => {}
    }
}

fn main() {
    let mut data = Vec::new();
    loop {
        if unsafe { __AFL_LOOP(1000) } == 0 {
            break;
        }
        data.clear();
        if io::stdin().take(MAX_INPUT).read_to_end(&mut data).is_err() {
            return;
        }
        match data.split_first() {
            Some((&0, body)) => classify(body),
            Some((&1, rest)) => {
                if let Some((budget, lines)) = rest.split_first() {
                    pack(*budget, lines);
                }
            }
            _ => {}
        }
    }
}
