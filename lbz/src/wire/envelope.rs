//! Envelope resolution for the service's wrapper shapes.
//!
//! Two distinct problems are handled:
//!
//! 1. the uniform top-level envelope: every payload-style response is
//!    `{"payload": {...}}`, and anything else is an error;
//! 2. the polymorphic "maybe wrapped" shape: the same logical object may
//!    arrive bare, or nested one level under one of several known keys
//!    whose wrapper may carry sibling keys of its own. Resolution peeks at
//!    the first property name; wrapper-only siblings are folded into the
//!    result's extra fields under a disambiguating prefix so they stay
//!    inspectable without colliding with the inner object's own names.

use serde_json::Value;

use super::error::DecodeError;
use super::object::{ExtraFields, WireDecode};

/// The uniform wrapper key used by payload-style responses.
pub const PAYLOAD_KEY: &str = "payload";

/// Unwraps the uniform `{"payload": {...}}` envelope.
///
/// # Errors
///
/// Returns [`DecodeError::UnrecognizedEnvelope`] when the wrapper key is
/// missing or misnamed, and [`DecodeError::ExpectedObject`] when the
/// document root is not an object.
pub fn unwrap_payload(value: Value) -> Result<Value, DecodeError> {
    match value {
        Value::Object(mut map) => map.remove(PAYLOAD_KEY).ok_or(DecodeError::UnrecognizedEnvelope {
            expected: PAYLOAD_KEY,
        }),
        _ => Err(DecodeError::ExpectedObject {
            context: "$".to_owned(),
        }),
    }
}

/// Decodes a payload-enveloped document straight into `T`.
///
/// # Errors
///
/// Fails on malformed JSON, an unrecognized envelope, or per `T`'s decode.
pub fn decode_payload<T: WireDecode>(bytes: &[u8]) -> Result<T, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    T::decode_value(unwrap_payload(value)?, PAYLOAD_KEY)
}

/// One recognized wrapper shape for a maybe-wrapped payload.
#[derive(Debug, Clone, Copy)]
pub struct WrapperKey {
    /// The top-level key holding the inner payload.
    pub key: &'static str,
    /// Prefix applied to wrapper-only sibling keys when folding them into
    /// the inner object's extra fields.
    pub prefix: &'static str,
}

/// Resolves a maybe-wrapped object by peeking at its first property name.
///
/// If the first property matches one of `wrappers`, the wrapper is
/// consumed: the inner payload is extracted and every sibling key is
/// folded in as a prefixed extra field. Peeling repeats on the extracted
/// payload, since wrappers can stack (a fetch wrapper around a standard
/// document that is itself wrapped), until the first property matches no
/// wrapper and the object is taken as the bare payload. The transient
/// wrappers never outlive this call.
///
/// # Errors
///
/// Returns [`DecodeError::ExpectedObject`] when `value`, or an extracted
/// payload, is not an object.
pub fn unwrap_nested(
    mut value: Value,
    context: &str,
    wrappers: &[WrapperKey],
) -> Result<(Value, ExtraFields), DecodeError> {
    let mut folded = ExtraFields::new();

    loop {
        let Value::Object(mut map) = value else {
            return Err(DecodeError::ExpectedObject {
                context: context.to_owned(),
            });
        };

        let Some(wrapper) = map
            .keys()
            .next()
            .and_then(|first| wrappers.iter().find(|w| w.key == first))
            .copied()
        else {
            return Ok((Value::Object(map), folded));
        };

        // `remove` cannot fail here; the first key just matched.
        let inner = map
            .remove(wrapper.key)
            .ok_or(DecodeError::UnrecognizedEnvelope {
                expected: wrapper.key,
            })?;

        for (key, sibling) in map {
            folded.insert(format!("{}{}", wrapper.prefix, key), sibling);
        }
        value = inner;
    }
}
