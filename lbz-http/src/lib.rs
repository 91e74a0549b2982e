//! HTTP client for ListenBrainz-compatible listening-history APIs.
//!
//! This crate layers the transport on top of the `lbz` core:
//!
//! - [`client`] - the [`Client`](client::Client) itself, with one method
//!   per endpoint plus the batched sequential import workflow
//! - [`response`] - classification of a completed response into a decoded
//!   body or a typed failure, cross-checking the server's self-reported
//!   error code against the transport status
//! - [`headers`] - capture of the service's rate-limit counters
//! - [`error`] - the failure taxonomy callers receive
//!
//! Retry, backoff, and rate-limit *enforcement* are deliberately not here;
//! the client reports the service's counters and leaves policy to callers.

pub mod client;
pub mod constants;
pub mod error;
pub mod headers;
pub mod response;

pub use client::{Client, ClientConfig, ImportOutcome, ListenQuery};
pub use error::ApiError;
