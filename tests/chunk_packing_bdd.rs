//! Behavioural tests for greedy chunk packing.

use std::cell::RefCell;

use plcrpc::{
    Chunk,
    JsonSerializer,
    PackError,
    RequestSerializer,
    RpcRequest,
    framing::join_array,
    pack,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenarios, then, when};
use test_util::{ping_requests, sized_request};

struct PackingWorld {
    requests: RefCell<Vec<RpcRequest>>,
    outcome: RefCell<Option<Result<Vec<Chunk>, PackError>>>,
}

impl PackingWorld {
    fn new() -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            outcome: RefCell::new(None),
        }
    }

    fn chunks(&self) -> Vec<Chunk> {
        match self.outcome.borrow().as_ref() {
            Some(Ok(chunks)) => chunks.clone(),
            Some(Err(err)) => panic!("packing failed: {err}"),
            None => panic!("requests not packed"),
        }
    }
}

#[fixture]
fn world() -> PackingWorld { PackingWorld::new() }

#[given("{count} requests of {len} bytes each")]
fn given_sized(world: &PackingWorld, count: u64, len: usize) {
    world
        .requests
        .replace((1..=count).map(|id| sized_request(id, len)).collect());
}

#[given("{count} ping requests")]
fn given_pings(world: &PackingWorld, count: u64) { world.requests.replace(ping_requests(count)); }

#[when("the requests are packed with a budget of {max} bytes")]
fn when_packed(world: &PackingWorld, max: usize) {
    let requests = world.requests.borrow().clone();
    world.outcome.replace(Some(pack(requests, max)));
}

#[then("{count} chunks are produced")]
fn then_chunk_count(world: &PackingWorld, count: usize) {
    assert_eq!(world.chunks().len(), count);
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "step arguments are parsed into owned values"
)]
#[then("chunk {index} is {len} bytes and carries requests \"{ids}\"")]
fn then_chunk_shape(world: &PackingWorld, index: usize, len: usize, ids: String) {
    let chunks = world.chunks();
    let Some(chunk) = chunks.get(index) else {
        panic!("chunk {index} missing");
    };
    assert_eq!(chunk.len(), len);
    let carried: Vec<String> = chunk.ids().iter().map(ToString::to_string).collect();
    assert_eq!(carried.join(","), ids);
    let parsed: Result<serde_json::Value, _> = serde_json::from_slice(chunk.as_bytes());
    assert!(parsed.is_ok_and(|value| value.is_array()), "chunk {index} is not a JSON array");
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "step arguments are parsed into owned values"
)]
#[then("packing fails for request \"{id}\" at {size} bytes against a {limit} byte limit")]
fn then_size_exceeded(world: &PackingWorld, id: String, size: usize, limit: usize) {
    let outcome = world.outcome.borrow();
    let Some(Err(PackError::SizeExceeded {
        id: failed,
        size: actual,
        limit: configured,
    })) = outcome.as_ref()
    else {
        panic!("expected SizeExceeded");
    };
    assert_eq!(failed.to_string(), id);
    assert_eq!(*actual, size);
    assert_eq!(*configured, limit);
}

#[then("the only chunk is the full array in original order")]
fn then_full_array(world: &PackingWorld) {
    let encoded: Vec<Vec<u8>> = world
        .requests
        .borrow()
        .iter()
        .map(|request| {
            JsonSerializer
                .serialize(request)
                .map(|s| s.into_parts().1)
                .unwrap_or_else(|err| panic!("serialise: {err}"))
        })
        .collect();
    let expected = join_array(encoded.iter().map(Vec::as_slice));
    let chunks = world.chunks();
    let [only] = chunks.as_slice() else {
        panic!("expected exactly one chunk");
    };
    assert_eq!(only.as_bytes(), &*expected);
    let ids = world.requests.borrow().iter().map(|r| r.id.clone()).collect::<Vec<_>>();
    assert_eq!(only.ids(), ids.as_slice());
}

scenarios!(
    "tests/features/chunk_packing.feature",
    fixtures = [world: PackingWorld]
);
