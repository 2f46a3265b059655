//! Behavioural tests for chunk reply classification.

use std::cell::{Cell, RefCell};

use plcrpc::{ClassifyError, ResponseClassifier};
use rstest::fixture;
use rstest_bdd::assert_step_ok;
use rstest_bdd_macros::{given, scenarios, then, when};

const SINGLE: &str = r#"[{"jsonrpc":"2.0","method":"Api.Ping","id":1}]"#;
const PAIR: &str =
    r#"[{"jsonrpc":"2.0","method":"Api.Ping","id":1},{"jsonrpc":"2.0","method":"Api.Ping","id":2}]"#;

/// Reply body and the chunk it answers.
fn reply_of(kind: &str) -> (&'static str, &'static str, usize) {
    match kind {
        "result" => (r#"{"id":1,"result":true}"#, SINGLE, 1),
        "error" => (r#"{"id":1,"error":{"code":1,"message":"Permission denied"}}"#, SINGLE, 1),
        "single-error" => (
            r#"[{"id":1,"error":{"code":1,"message":"Permission denied"}}]"#,
            SINGLE,
            1,
        ),
        "batch" => (r#"[{"id":1,"result":true},{"id":2,"result":false}]"#, PAIR, 2),
        "batch-error" => (
            r#"[{"id":1,"result":true},{"id":2,"error":{"code":2,"message":"System busy"}}]"#,
            PAIR,
            2,
        ),
        "short-batch" => (r#"[{"id":1,"result":true}]"#, PAIR, 2),
        "garbage" => ("<html>gateway</html>", SINGLE, 1),
        other => panic!("unknown body kind {other}"),
    }
}

struct ClassifyWorld {
    status: Cell<u16>,
    body: Cell<&'static str>,
    request: Cell<&'static str>,
    expected: Cell<usize>,
    outcome: RefCell<Option<Result<String, ClassifyError>>>,
}

impl ClassifyWorld {
    fn new() -> Self {
        Self {
            status: Cell::new(0),
            body: Cell::new(""),
            request: Cell::new(""),
            expected: Cell::new(0),
            outcome: RefCell::new(None),
        }
    }

    fn failure(&self) -> ClassifyError {
        match self.outcome.borrow().as_ref() {
            Some(Err(err)) => err.clone(),
            Some(Ok(body)) => panic!("expected failure, got {body}"),
            None => panic!("reply not classified"),
        }
    }
}

#[fixture]
fn world() -> ClassifyWorld { ClassifyWorld::new() }

#[expect(
    clippy::needless_pass_by_value,
    reason = "step arguments are parsed into owned values"
)]
#[given("the server answers with status {status} and body kind \"{kind}\"")]
fn given_reply(world: &ClassifyWorld, status: u16, kind: String) {
    let (body, request, expected) = reply_of(&kind);
    world.status.set(status);
    world.body.set(body);
    world.request.set(request);
    world.expected.set(expected);
}

#[when("the reply is classified")]
fn when_classified(world: &ClassifyWorld) {
    let outcome = ResponseClassifier::new()
        .classify(
            world.status.get(),
            world.body.get(),
            world.request.get(),
            world.expected.get(),
        )
        .map(str::to_owned);
    world.outcome.replace(Some(outcome));
}

#[then("the body is returned unchanged")]
fn then_unchanged(world: &ClassifyWorld) {
    let outcome = world.outcome.borrow();
    let Some(result) = outcome.as_ref() else {
        panic!("reply not classified");
    };
    assert_step_ok!(result.as_ref().map_err(ToString::to_string));
    assert_eq!(result.as_deref().ok(), Some(world.body.get()));
}

#[then("classification fails as an invalid HTTP request with status {status}")]
fn then_http_failure(world: &ClassifyWorld, status: u16) {
    let ClassifyError::InvalidHttpRequest { status: actual, .. } = world.failure() else {
        panic!("expected InvalidHttpRequest");
    };
    assert_eq!(actual, status);
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "step arguments are parsed into owned values"
)]
#[then("classification fails with RPC error kind \"{kind}\"")]
fn then_rpc_failure(world: &ClassifyWorld, kind: String) {
    let failure = world.failure();
    let Some(actual) = failure.rpc_kind() else {
        panic!("expected an RPC failure");
    };
    assert_eq!(actual.as_str(), kind);
}

#[then("classification fails as a malformed response")]
fn then_malformed(world: &ClassifyWorld) {
    assert!(matches!(
        world.failure(),
        ClassifyError::MalformedResponse { .. }
    ));
}

#[then("the failure carries the request text")]
fn then_carries_request(world: &ClassifyWorld) {
    assert_eq!(world.failure().request(), world.request.get());
}

scenarios!(
    "tests/features/response_classification.feature",
    fixtures = [world: ClassifyWorld]
);
