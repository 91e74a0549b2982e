//! Forward-only property cursor and typed scalar extraction.
//!
//! [`FieldCursor`] walks the properties of one JSON object in document
//! order (the `preserve_order` feature of `serde_json` keeps
//! [`serde_json::Map`] insertion-ordered). The free functions extract a
//! typed scalar from a property value; each has an `opt_` variant that
//! maps JSON `null` to `None` instead of failing.
//!
//! Every mismatch is tagged with the offending property name so callers
//! get errors like `failed to decode field 'release_mbid': expected a UUID
//! string`.

use rust_decimal::Decimal;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::error::DecodeError;

/// A pull-style cursor over the properties of a decoded JSON object.
///
/// Yields `(name, value)` pairs exactly once each, in document order, then
/// `None` at the closing brace. Consuming the cursor consumes the object.
#[derive(Debug)]
pub struct FieldCursor {
    props: serde_json::map::IntoIter,
}

impl FieldCursor {
    /// Opens a cursor over `value`, which must be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ExpectedObject`] when `value` is any other
    /// JSON kind. `context` names where the object was expected.
    pub fn open(value: Value, context: &str) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => Ok(Self {
                props: map.into_iter(),
            }),
            _ => Err(DecodeError::ExpectedObject {
                context: context.to_owned(),
            }),
        }
    }

    /// Advances to the next property, or `None` at the end of the object.
    pub fn next_property(&mut self) -> Option<(String, Value)> {
        self.props.next()
    }
}

/// Reads a string value.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] for any non-string kind.
pub fn string(field: &str, value: Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(DecodeError::mismatch(field, "a string")),
    }
}

/// Reads a string value, mapping `null` to `None`.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] for any other non-string kind.
pub fn opt_string(field: &str, value: Value) -> Result<Option<String>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => string(field, other).map(Some),
    }
}

/// Reads a signed 64-bit integer.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] when the value is not a number
/// representable as `i64`.
pub fn int64(field: &str, value: Value) -> Result<i64, DecodeError> {
    value
        .as_i64()
        .ok_or_else(|| DecodeError::mismatch(field, "a 64-bit integer"))
}

/// Reads a signed 64-bit integer, mapping `null` to `None`.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] for non-integer, non-null kinds.
pub fn opt_int64(field: &str, value: Value) -> Result<Option<i64>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => int64(field, other).map(Some),
    }
}

/// Reads an unsigned 64-bit integer.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] when the value is not a number
/// representable as `u64`.
pub fn uint64(field: &str, value: Value) -> Result<u64, DecodeError> {
    value
        .as_u64()
        .ok_or_else(|| DecodeError::mismatch(field, "a non-negative 64-bit integer"))
}

/// Reads an unsigned 64-bit integer, mapping `null` to `None`.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] for non-integer, non-null kinds.
pub fn opt_uint64(field: &str, value: Value) -> Result<Option<u64>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => uint64(field, other).map(Some),
    }
}

/// Reads a decimal number from a JSON number or a numeric string.
///
/// The string form is accepted because the service stringifies values that
/// would lose precision as floating point.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] for other kinds or unparseable
/// numeric strings.
pub fn decimal(field: &str, value: Value) -> Result<Decimal, DecodeError> {
    match value {
        Value::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .map_err(|e| DecodeError::mismatch_caused_by(field, "a decimal number", e)),
        Value::String(s) => s
            .parse::<Decimal>()
            .map_err(|e| DecodeError::mismatch_caused_by(field, "a decimal number", e)),
        _ => Err(DecodeError::mismatch(field, "a decimal number")),
    }
}

/// Reads a decimal number, mapping `null` to `None`.
///
/// # Errors
///
/// See [`decimal`].
pub fn opt_decimal(field: &str, value: Value) -> Result<Option<Decimal>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => decimal(field, other).map(Some),
    }
}

/// Reads a boolean value.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] for any non-boolean kind.
pub fn boolean(field: &str, value: Value) -> Result<bool, DecodeError> {
    match value {
        Value::Bool(b) => Ok(b),
        _ => Err(DecodeError::mismatch(field, "a boolean")),
    }
}

/// Reads a boolean value, mapping `null` to `None`.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] for non-boolean, non-null kinds.
pub fn opt_boolean(field: &str, value: Value) -> Result<Option<bool>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => boolean(field, other).map(Some),
    }
}

/// Reads a MusicBrainz identifier (a UUID string).
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] for non-string kinds; for strings
/// that are not valid UUIDs the inner parse error is preserved as the
/// cause.
pub fn mbid(field: &str, value: Value) -> Result<Uuid, DecodeError> {
    let s = string(field, value)?;
    s.parse::<Uuid>()
        .map_err(|e| DecodeError::mismatch_caused_by(field, "a UUID string", e))
}

/// Reads a MusicBrainz identifier, mapping `null` to `None`.
///
/// # Errors
///
/// See [`mbid`].
pub fn opt_mbid(field: &str, value: Value) -> Result<Option<Uuid>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => mbid(field, other).map(Some),
    }
}

/// Reads a URI string into a typed [`Url`].
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] for non-string kinds; for strings
/// that are not valid URLs the inner parse error is preserved as the
/// cause.
pub fn uri(field: &str, value: Value) -> Result<Url, DecodeError> {
    let s = string(field, value)?;
    Url::parse(&s).map_err(|e| DecodeError::mismatch_caused_by(field, "a URI string", e))
}

/// Reads a URI string, mapping `null` to `None`.
///
/// # Errors
///
/// See [`uri`].
pub fn opt_uri(field: &str, value: Value) -> Result<Option<Url>, DecodeError> {
    match value {
        Value::Null => Ok(None),
        other => uri(field, other).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cursor_yields_properties_in_document_order() {
        let mut cursor =
            FieldCursor::open(json!({"b": 1, "a": 2, "c": 3}), "$").expect("object input");
        let names: Vec<String> = std::iter::from_fn(|| cursor.next_property())
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn cursor_rejects_non_objects() {
        let err = FieldCursor::open(json!([1, 2]), "payload").unwrap_err();
        assert!(matches!(err, DecodeError::ExpectedObject { context } if context == "payload"));
    }

    #[test]
    fn mismatch_names_the_offending_field() {
        let err = mbid("release_mbid", json!("not-a-uuid")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("release_mbid"), "got: {msg}");
        assert!(msg.contains("UUID"), "got: {msg}");
        // The inner parse failure survives as the error source.
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn optional_readers_map_null_to_none() {
        assert_eq!(opt_string("x", json!(null)).expect("null ok"), None);
        assert_eq!(opt_int64("x", json!(null)).expect("null ok"), None);
        assert_eq!(opt_mbid("x", json!(null)).expect("null ok"), None);
        assert!(opt_string("x", json!(42)).is_err());
    }

    #[test]
    fn decimal_accepts_number_and_string_forms() {
        assert_eq!(
            decimal("d", json!("3.14")).expect("string form"),
            decimal("d", json!(3.14)).expect("number form")
        );
        assert!(decimal("d", json!(true)).is_err());
    }
}
