//! Schema-tolerant JSON decoding for the service's wire format.
//!
//! The service's response shapes are loosely specified and grow new fields
//! over time; older clients must keep working. The framework here therefore
//! distinguishes *malformed* from *merely newer than this client*:
//!
//! - a property the decoder recognizes is extracted with a typed reader and
//!   any kind mismatch aborts the decode, naming the offending property;
//! - a property the decoder does not recognize is captured verbatim, in
//!   document order, into the record's extra-fields map - never dropped and
//!   never an error.
//!
//! Decoding is driven by a static field table per type (see [`object`])
//! rather than hand-written control flow, so every response shape shares
//! one driver and one set of invariants.
//!
//! Encoding is deliberately asymmetric: submission types in
//! [`crate::submit`] define only wire-contract fields, so captured extras
//! from a read are never written back out.

pub mod coerce;
pub mod cursor;
pub mod envelope;
pub mod error;
pub mod object;

pub use error::DecodeError;
pub use object::{ExtraFields, FieldOutcome, FieldSpec, WireDecode};
