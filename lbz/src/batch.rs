//! The adaptive payload splitter for bulk submission.
//!
//! The service enforces a hard byte ceiling per request, but a
//! pre-computed per-item size estimate cannot account for the fixed
//! envelope overhead or variable-length nested metadata. The planner
//! therefore serializes and measures: the whole batch is rendered once,
//! and if it exceeds the ceiling the item list is bisected into contiguous
//! halves and each half is planned independently. Recursion depth is
//! logarithmic and terminates unconditionally at one item - an oversized
//! single item is emitted anyway, since it can never be split further.
//!
//! Halving is deliberate: a greedy packer could sometimes produce fewer
//! requests, but the split points here are outward-observable (request
//! counts, batch boundaries) and are kept exactly as specified.

use std::ops::Range;

use crate::submit::{ListenType, SubmitListens, SubmittableListen};

/// One planned request body together with the input items it covers.
#[derive(Debug, Clone)]
pub struct Batch {
    /// The serialized submission envelope.
    pub body: String,
    /// The half-open range of input indices this batch covers.
    pub span: Range<usize>,
}

/// An ordered sequence of request bodies produced from one submission.
///
/// Concatenating the spans of all batches, in order, reproduces the input
/// sequence exactly: no reordering, no drops, no duplication.
#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    /// The batches, in submission order.
    pub batches: Vec<Batch>,
}

impl BatchPlan {
    /// Total number of planned requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Whether the plan contains no requests (an empty input still plans
    /// one request carrying an empty payload list; this is only true for
    /// a default-constructed plan).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Plans the requests for submitting `items` under `ceiling_bytes`.
///
/// Every produced batch either serializes to at most `ceiling_bytes` or
/// covers exactly one item.
///
/// # Errors
///
/// Returns the underlying serialization error if an item cannot be
/// rendered as JSON (practically unreachable for the submission types).
pub fn plan(
    listen_type: ListenType,
    items: &[SubmittableListen],
    ceiling_bytes: usize,
) -> Result<BatchPlan, serde_json::Error> {
    let mut plan = BatchPlan::default();
    bisect(listen_type, items, 0, ceiling_bytes, &mut plan)?;
    Ok(plan)
}

fn bisect(
    listen_type: ListenType,
    items: &[SubmittableListen],
    offset: usize,
    ceiling_bytes: usize,
    plan: &mut BatchPlan,
) -> Result<(), serde_json::Error> {
    let body = serde_json::to_string(&SubmitListens {
        listen_type,
        payload: items,
    })?;

    if body.len() <= ceiling_bytes || items.len() <= 1 {
        plan.batches.push(Batch {
            body,
            span: offset..offset + items.len(),
        });
        return Ok(());
    }

    let mid = items.len() / 2;
    bisect(listen_type, &items[..mid], offset, ceiling_bytes, plan)?;
    bisect(listen_type, &items[mid..], offset + mid, ceiling_bytes, plan)
}
