//! Core wire types and algorithms for ListenBrainz-compatible
//! listening-history APIs.
//!
//! This crate holds everything the SDK needs that is independent of the HTTP
//! transport:
//!
//! - [`wire`] - the schema-tolerant JSON decoding framework: typed field
//!   extraction, the declarative field-table object decoder with lossless
//!   unknown-field capture, and envelope resolution for the handful of
//!   wrapper shapes the service uses
//! - [`models`] - typed records for the API's response shapes
//! - [`submit`] - write-side types for listen submission (only
//!   wire-contract fields; captured extras are never echoed back)
//! - [`batch`] - the adaptive payload splitter that partitions large
//!   submissions under a byte-size ceiling by recursive bisection
//! - [`timestamp`] - normalization of the service's heterogeneous
//!   timestamp representations
//! - [`rate_limit`] - the advisory request-quota snapshot reported by the
//!   service on every response
//!
//! The transport itself lives in the companion `lbz-http` crate.

pub mod batch;
pub mod models;
pub mod rate_limit;
pub mod submit;
pub mod timestamp;
pub mod wire;

pub use batch::{Batch, BatchPlan};
pub use rate_limit::{RateLimitSlot, RateLimitSnapshot};
pub use submit::{ListenType, SubmittableListen, SubmittableTrack};
pub use timestamp::ListenedAt;
pub use wire::error::DecodeError;
