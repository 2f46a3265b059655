//! In-memory transports for exercising the bulk client.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use bytes::Bytes;
use plcrpc::{Transport, TransportError, TransportResponse};
use tokio_util::sync::CancellationToken;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Replays a fixed script of replies and records every posted body.
///
/// Once the script is exhausted every post fails with
/// [`TransportError::Connection`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    posted: Mutex<Vec<(String, Bytes)>>,
}

impl ScriptedTransport {
    /// Create an empty script.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Queue a reply with `status` and `body`.
    #[must_use]
    pub fn reply(self, status: u16, body: &str) -> Self {
        lock(&self.replies).push_back(Ok(TransportResponse::new(status, body)));
        self
    }

    /// Queue a transport failure.
    #[must_use]
    pub fn fail(self, error: TransportError) -> Self {
        lock(&self.replies).push_back(Err(error));
        self
    }

    /// Bodies posted so far, in order.
    #[must_use]
    pub fn posted_bodies(&self) -> Vec<Bytes> {
        lock(&self.posted).iter().map(|(_, body)| body.clone()).collect()
    }

    /// Paths posted to so far, in order.
    #[must_use]
    pub fn posted_paths(&self) -> Vec<String> {
        lock(&self.posted).iter().map(|(path, _)| path.clone()).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, path: &str, body: Bytes) -> Result<TransportResponse, TransportError> {
        lock(&self.posted).push((path.to_owned(), body));
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("script exhausted".to_owned())))
    }
}

/// Never answers; optionally cancels a token when the first post arrives.
#[derive(Debug, Default)]
pub struct StalledTransport {
    cancel_on_post: Option<CancellationToken>,
    posts: Mutex<usize>,
}

impl StalledTransport {
    /// A transport that stalls forever.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Cancel `token` as soon as a post is in flight.
    #[must_use]
    pub const fn cancelling(token: CancellationToken) -> Self {
        Self {
            cancel_on_post: Some(token),
            posts: Mutex::new(0),
        }
    }

    /// Number of posts started.
    #[must_use]
    pub fn posts(&self) -> usize { *lock(&self.posts) }
}

#[async_trait]
impl Transport for StalledTransport {
    async fn post(&self, _path: &str, _body: Bytes) -> Result<TransportResponse, TransportError> {
        *lock(&self.posts) += 1;
        if let Some(token) = &self.cancel_on_post {
            token.cancel();
        }
        std::future::pending().await
    }
}
