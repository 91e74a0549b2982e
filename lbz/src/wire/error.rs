//! Decode failures for the wire format.

/// An error produced while decoding a JSON document into a typed record.
///
/// Decode errors always abort the enclosing object: a partially populated
/// required-field set cannot be trusted, so no best-effort record is ever
/// returned. Unknown properties are *not* errors; they are captured into
/// the record's extra-fields map (see [`crate::wire::object`]).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A required field was never observed before the object closed.
    ///
    /// A field observed with a JSON `null` counts as absent unless its
    /// extractor explicitly accepts null.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A known field's value did not match the expected JSON kind.
    #[error("failed to decode field `{field}`: expected {expected}")]
    TypeMismatch {
        /// The offending property name.
        field: String,
        /// Human-readable description of the expected kind.
        expected: &'static str,
        /// Inner cause when a string form failed to parse (UUID, URL, ...).
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// None of the accepted top-level wrapper shapes matched.
    #[error("unrecognized envelope: expected a `{expected}` wrapper")]
    UnrecognizedEnvelope {
        /// The wrapper key that was expected.
        expected: &'static str,
    },

    /// The input was not a JSON object where one was required.
    ///
    /// `context` is the property under which the object was expected, or
    /// `"$"` for the document root.
    #[error("expected a JSON object at `{context}`")]
    ExpectedObject {
        /// Where the object was expected.
        context: String,
    },

    /// The input was not well-formed JSON at all.
    #[error("malformed JSON document")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// Builds a [`DecodeError::TypeMismatch`] without an inner cause.
    #[must_use]
    pub fn mismatch(field: &str, expected: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.to_owned(),
            expected,
            source: None,
        }
    }

    /// Builds a [`DecodeError::TypeMismatch`] carrying the parse failure
    /// that occurred while converting a string form.
    #[must_use]
    pub fn mismatch_caused_by<E>(field: &str, expected: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::TypeMismatch {
            field: field.to_owned(),
            expected,
            source: Some(Box::new(source)),
        }
    }
}
