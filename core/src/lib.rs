//! Synchronous client for the Mega Man leaderboards API.
//!
//! # Overview
//! Builds endpoint URLs, runs one blocking GET per call, and decodes the
//! loosely-typed JSON envelope into typed records. The upstream API escapes
//! apostrophes as `\'`, which is repaired textually before parsing.
//!
//! # Design
//! - `MmrtaClient` holds an immutable base URL and a `Transport`; it has no
//!   per-call state.
//! - Each operation is split into `build_*` (request) and `parse_*`
//!   (response) halves. The `get_*` accessors join them through the
//!   transport.
//! - No retries, no pagination, no caching. Every error ends the call.

pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod types;

pub use client::{Endpoint, MmrtaClient, DEFAULT_BASE_URL};
pub use envelope::fix_escaped_apostrophes;
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{Category, Game, Run, RunOwner, Series, User, ABBREV_PREFIX};
