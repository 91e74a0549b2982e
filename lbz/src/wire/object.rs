//! The field-table object decoder.
//!
//! Every response shape in the SDK decodes through the same driver: the
//! type supplies a static table mapping property name to an apply function
//! and a required flag, and [`drive`] walks the object's properties once,
//! in document order. Recognized names dispatch into the type's builder;
//! unrecognized names are captured verbatim into an insertion-ordered
//! [`ExtraFields`] map.
//!
//! Invariants enforced here:
//!
//! - every property ends up in exactly one of {known field, extra fields};
//! - a required field that was never observed, or observed only as `null`,
//!   fails the decode with its name;
//! - unknown properties are never an error.

use serde_json::Value;

use super::cursor::FieldCursor;
use super::error::DecodeError;

/// Unrecognized properties captured during a decode, in document order.
///
/// `serde_json::Map` preserves insertion order under the `preserve_order`
/// feature, which this crate enables.
pub type ExtraFields = serde_json::Map<String, Value>;

/// Whether an apply function actually populated its field.
///
/// A required field whose value arrived as JSON `null` reports
/// [`FieldOutcome::Absent`] so the driver treats it identically to a field
/// that never appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// The field was populated.
    Set,
    /// The property appeared but carried no usable value (`null`).
    Absent,
}

/// One row of a type's field table.
pub struct FieldSpec<B> {
    /// The wire property name.
    pub name: &'static str,
    /// Whether the decode fails if this field is never populated.
    pub required: bool,
    /// Extracts the value into the builder.
    pub apply: fn(&mut B, Value) -> Result<FieldOutcome, DecodeError>,
}

impl<B> std::fmt::Debug for FieldSpec<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Walks one JSON object against a field table.
///
/// Returns the populated builder together with the captured extra fields.
/// `context` names where the object was expected, for error reporting.
///
/// # Errors
///
/// Propagates the first apply-function error, and fails with
/// [`DecodeError::MissingField`] if any required row was never populated
/// once the object closes.
pub fn drive<B: Default>(
    value: Value,
    context: &str,
    table: &[FieldSpec<B>],
) -> Result<(B, ExtraFields), DecodeError> {
    let mut cursor = FieldCursor::open(value, context)?;
    let mut builder = B::default();
    let mut extra = ExtraFields::new();
    let mut seen = vec![false; table.len()];

    while let Some((name, value)) = cursor.next_property() {
        match table.iter().position(|spec| spec.name == name) {
            Some(i) => {
                if (table[i].apply)(&mut builder, value)? == FieldOutcome::Set {
                    seen[i] = true;
                }
            }
            None => {
                extra.insert(name, value);
            }
        }
    }

    for (spec, seen) in table.iter().zip(seen) {
        if spec.required && !seen {
            return Err(DecodeError::MissingField(spec.name));
        }
    }

    Ok((builder, extra))
}

/// A type decodable from one JSON object via a field table.
pub trait WireDecode: Sized {
    /// Accumulates fields during the property walk.
    ///
    /// The `'static` bound is what lets [`WireDecode::FIELDS`] be a
    /// `&'static` table.
    type Builder: Default + 'static;

    /// The static property-name dispatch table.
    const FIELDS: &'static [FieldSpec<Self::Builder>];

    /// Finishes construction from the populated builder and the captured
    /// extra fields.
    ///
    /// Required-field presence has already been checked by the driver;
    /// `finish` unwraps builder options and applies any cross-field rules
    /// (for example, folding a disagreeing alternate form of a canonical
    /// field back into `extra`).
    ///
    /// # Errors
    ///
    /// Implementations may fail on cross-field validation.
    fn finish(builder: Self::Builder, extra: ExtraFields) -> Result<Self, DecodeError>;

    /// Decodes a parsed JSON value. `context` names where the object was
    /// expected, for error reporting.
    ///
    /// # Errors
    ///
    /// Fails per [`drive`] and [`WireDecode::finish`].
    fn decode_value(value: Value, context: &str) -> Result<Self, DecodeError> {
        let (builder, extra) = drive(value, context, Self::FIELDS)?;
        Self::finish(builder, extra)
    }

    /// Decodes a raw JSON document.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or per [`WireDecode::decode_value`].
    fn decode_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::decode_value(value, "$")
    }
}

/// Unwraps a builder option for a field the driver has already verified.
///
/// Field tables mark fields required, and [`drive`] refuses to finish while
/// any required field is unpopulated, so a `None` here means the type's
/// table and its `finish` disagree about which fields are required.
///
/// # Errors
///
/// Returns [`DecodeError::MissingField`] rather than panicking if the
/// table was inconsistent.
pub fn take_required<T>(slot: Option<T>, name: &'static str) -> Result<T, DecodeError> {
    slot.ok_or(DecodeError::MissingField(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::cursor;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Sample {
        known_field: String,
        count: Option<u64>,
        extra: ExtraFields,
    }

    #[derive(Default)]
    struct SampleBuilder {
        known_field: Option<String>,
        count: Option<u64>,
    }

    impl WireDecode for Sample {
        type Builder = SampleBuilder;

        const FIELDS: &'static [FieldSpec<SampleBuilder>] = &[
            FieldSpec {
                name: "known_field",
                required: true,
                apply: |b, v| {
                    Ok(match cursor::opt_string("known_field", v)? {
                        Some(s) => {
                            b.known_field = Some(s);
                            FieldOutcome::Set
                        }
                        None => FieldOutcome::Absent,
                    })
                },
            },
            FieldSpec {
                name: "count",
                required: false,
                apply: |b, v| {
                    b.count = cursor::opt_uint64("count", v)?;
                    Ok(FieldOutcome::Set)
                },
            },
        ];

        fn finish(builder: SampleBuilder, extra: ExtraFields) -> Result<Self, DecodeError> {
            Ok(Self {
                known_field: take_required(builder.known_field, "known_field")?,
                count: builder.count,
                extra,
            })
        }
    }

    #[test]
    fn field_tables_are_usable_as_static_references() {
        fn table_of<T: WireDecode>() -> &'static [FieldSpec<T::Builder>] {
            T::FIELDS
        }
        assert_eq!(table_of::<Sample>().len(), 2);
    }

    #[test]
    fn unknown_fields_are_captured_not_rejected() {
        let sample =
            Sample::decode_value(json!({"unexpected_new_field": 42, "known_field": "x"}), "$")
                .expect("unknown fields are data");
        assert_eq!(sample.known_field, "x");
        assert_eq!(sample.extra.len(), 1);
        assert_eq!(sample.extra["unexpected_new_field"], json!(42));
    }

    #[test]
    fn every_property_lands_exactly_once() {
        let sample = Sample::decode_value(
            json!({"a": 1, "known_field": "x", "b": 2, "count": 3}),
            "$",
        )
        .expect("decodes");
        // Known fields consumed, the rest captured in document order.
        let extra_keys: Vec<&str> = sample.extra.keys().map(String::as_str).collect();
        assert_eq!(extra_keys, ["a", "b"]);
        assert_eq!(sample.count, Some(3));
        assert!(!sample.extra.contains_key("known_field"));
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let err = Sample::decode_value(json!({"count": 1}), "$").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("known_field")));
    }

    #[test]
    fn null_on_required_field_counts_as_absent() {
        let err = Sample::decode_value(json!({"known_field": null}), "$").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("known_field")));
    }

    #[test]
    fn type_mismatch_aborts_the_decode() {
        let err = Sample::decode_value(json!({"known_field": "x", "count": "many"}), "$")
            .unwrap_err();
        assert!(err.to_string().contains("count"));
    }
}
