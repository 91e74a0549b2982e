//! Collection extraction layered on the scalar readers.
//!
//! Sequences and string-keyed maps of a uniform element type are decoded
//! with a caller-supplied per-element reader; an arbitrary value can also
//! be captured untyped for lossless unknown-field storage.

use serde_json::Value;

use super::error::DecodeError;

/// Decodes a JSON array into a `Vec`, applying `elem` to each element.
///
/// Element errors carry the property name of the enclosing field.
///
/// # Errors
///
/// Returns [`DecodeError::TypeMismatch`] when the value is not an array,
/// or the first element error encountered.
pub fn seq<T, F>(field: &str, value: Value, elem: F) -> Result<Vec<T>, DecodeError>
where
    F: Fn(&str, Value) -> Result<T, DecodeError>,
{
    match value {
        Value::Array(items) => items.into_iter().map(|v| elem(field, v)).collect(),
        _ => Err(DecodeError::mismatch(field, "an array")),
    }
}

/// Decodes a JSON array, mapping `null` to `None`.
///
/// # Errors
///
/// See [`seq`].
pub fn opt_seq<T, F>(field: &str, value: Value, elem: F) -> Result<Option<Vec<T>>, DecodeError>
where
    F: Fn(&str, Value) -> Result<T, DecodeError>,
{
    match value {
        Value::Null => Ok(None),
        other => seq(field, other, elem).map(Some),
    }
}

/// Decodes a JSON object into `(key, value)` pairs in document order,
/// applying `elem` to each property value.
///
/// # Errors
///
/// Returns [`DecodeError::ExpectedObject`] when the value is not an
/// object, or the first element error encountered.
pub fn map<T, F>(field: &str, value: Value, elem: F) -> Result<Vec<(String, T)>, DecodeError>
where
    F: Fn(&str, Value) -> Result<T, DecodeError>,
{
    match value {
        Value::Object(props) => props
            .into_iter()
            .map(|(k, v)| elem(field, v).map(|t| (k, t)))
            .collect(),
        _ => Err(DecodeError::ExpectedObject {
            context: field.to_owned(),
        }),
    }
}

/// Captures an arbitrary value untouched.
///
/// This is the reader used for unknown-field capture and for fields whose
/// schema the client deliberately does not interpret.
#[allow(clippy::unnecessary_wraps)]
pub fn any(_field: &str, value: Value) -> Result<Value, DecodeError> {
    Ok(value)
}
