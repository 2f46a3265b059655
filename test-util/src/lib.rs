//! Utilities for integration tests.
//!
//! The `test-util` crate provides in-memory transports, request fixtures, a
//! reference packer and a tracing capture harness. It is used by the
//! integration tests in the main crate.

pub mod fixtures;
pub mod oracle;
pub mod tracing;
pub mod transport;

pub use fixtures::{ping_requests, sized_request};
pub use oracle::rebuild_and_measure;
pub use transport::{ScriptedTransport, StalledTransport};
