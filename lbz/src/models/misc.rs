//! Small response shapes: token validation, listen history payloads, and
//! the structured error body.

use crate::timestamp::ListenedAt;
use crate::wire::error::DecodeError;
use crate::wire::object::{ExtraFields, FieldOutcome, FieldSpec, WireDecode, take_required};
use crate::wire::{coerce, cursor};

use super::listen::Listen;

/// Result of validating an API token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenValidation {
    /// Whether the token is valid.
    pub valid: bool,
    /// The service's human-readable message.
    pub message: String,
    /// The user the token belongs to, when valid.
    pub user_name: Option<String>,
    /// Properties this client does not recognize, in document order.
    pub extra: ExtraFields,
}

/// Accumulator for [`TokenValidation`].
#[derive(Debug, Default)]
pub struct TokenValidationBuilder {
    valid: Option<bool>,
    message: Option<String>,
    user_name: Option<String>,
}

impl WireDecode for TokenValidation {
    type Builder = TokenValidationBuilder;

    const FIELDS: &'static [FieldSpec<TokenValidationBuilder>] = &[
        FieldSpec {
            name: "valid",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_boolean("valid", v)? {
                    Some(flag) => {
                        b.valid = Some(flag);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "message",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_string("message", v)? {
                    Some(s) => {
                        b.message = Some(s);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "user_name",
            required: false,
            apply: |b, v| {
                b.user_name = cursor::opt_string("user_name", v)?;
                Ok(FieldOutcome::Set)
            },
        },
    ];

    fn finish(builder: TokenValidationBuilder, extra: ExtraFields) -> Result<Self, DecodeError> {
        Ok(Self {
            valid: take_required(builder.valid, "valid")?,
            message: take_required(builder.message, "message")?,
            user_name: builder.user_name,
            extra,
        })
    }
}

/// The payload of a user's listen-history page.
#[derive(Debug, Clone, PartialEq)]
pub struct UserListens {
    /// Number of listens in this page.
    pub count: u64,
    /// The timestamp of the user's most recent listen overall.
    pub latest_listen_ts: Option<ListenedAt>,
    /// The user the history belongs to.
    pub user_id: String,
    /// The listens, newest first.
    pub listens: Vec<Listen>,
    /// Properties this client does not recognize, in document order.
    pub extra: ExtraFields,
}

/// Accumulator for [`UserListens`].
#[derive(Debug, Default)]
pub struct UserListensBuilder {
    count: Option<u64>,
    latest_listen_ts: Option<ListenedAt>,
    user_id: Option<String>,
    listens: Option<Vec<Listen>>,
}

impl WireDecode for UserListens {
    type Builder = UserListensBuilder;

    const FIELDS: &'static [FieldSpec<UserListensBuilder>] = &[
        FieldSpec {
            name: "count",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_uint64("count", v)? {
                    Some(n) => {
                        b.count = Some(n);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "latest_listen_ts",
            required: false,
            apply: |b, v| {
                b.latest_listen_ts = ListenedAt::decode_opt("latest_listen_ts", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "user_id",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_string("user_id", v)? {
                    Some(s) => {
                        b.user_id = Some(s);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "listens",
            required: true,
            apply: |b, v| {
                Ok(
                    match coerce::opt_seq("listens", v, |_, item| {
                        Listen::decode_value(item, "listens")
                    })? {
                        Some(items) => {
                            b.listens = Some(items);
                            FieldOutcome::Set
                        }
                        None => FieldOutcome::Absent,
                    },
                )
            },
        },
    ];

    fn finish(builder: UserListensBuilder, extra: ExtraFields) -> Result<Self, DecodeError> {
        Ok(Self {
            count: take_required(builder.count, "count")?,
            latest_listen_ts: builder.latest_listen_ts,
            user_id: take_required(builder.user_id, "user_id")?,
            listens: take_required(builder.listens, "listens")?,
            extra,
        })
    }
}

/// The payload of a user's total listen count.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenCount {
    /// The total number of listens submitted by the user.
    pub count: u64,
    /// Properties this client does not recognize, in document order.
    pub extra: ExtraFields,
}

/// Accumulator for [`ListenCount`].
#[derive(Debug, Default)]
pub struct ListenCountBuilder {
    count: Option<u64>,
}

impl WireDecode for ListenCount {
    type Builder = ListenCountBuilder;

    const FIELDS: &'static [FieldSpec<ListenCountBuilder>] = &[FieldSpec {
        name: "count",
        required: true,
        apply: |b, v| {
            Ok(match cursor::opt_uint64("count", v)? {
                Some(n) => {
                    b.count = Some(n);
                    FieldOutcome::Set
                }
                None => FieldOutcome::Absent,
            })
        },
    }];

    fn finish(builder: ListenCountBuilder, extra: ExtraFields) -> Result<Self, DecodeError> {
        Ok(Self {
            count: take_required(builder.count, "count")?,
            extra,
        })
    }
}

/// The structured error body the service attaches to failed requests.
///
/// `{"code": 404, "error": "Not found"}`-shaped; `code` is the status code
/// the *server* believes it returned, which has historically disagreed
/// with the transport status on occasion.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody {
    /// The server-reported numeric code.
    pub code: u64,
    /// The human-readable message.
    pub error: String,
    /// Properties this client does not recognize, in document order.
    pub extra: ExtraFields,
}

/// Accumulator for [`ErrorBody`].
#[derive(Debug, Default)]
pub struct ErrorBodyBuilder {
    code: Option<u64>,
    error: Option<String>,
}

impl WireDecode for ErrorBody {
    type Builder = ErrorBodyBuilder;

    const FIELDS: &'static [FieldSpec<ErrorBodyBuilder>] = &[
        FieldSpec {
            name: "code",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_uint64("code", v)? {
                    Some(n) => {
                        b.code = Some(n);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "error",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_string("error", v)? {
                    Some(s) => {
                        b.error = Some(s);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
    ];

    fn finish(builder: ErrorBodyBuilder, extra: ExtraFields) -> Result<Self, DecodeError> {
        Ok(Self {
            code: take_required(builder.code, "code")?,
            error: take_required(builder.error, "error")?,
            extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::envelope;
    use serde_json::json;

    #[test]
    fn user_listens_decodes_through_the_payload_envelope() {
        let doc = json!({
            "payload": {
                "count": 1,
                "latest_listen_ts": 1_700_000_000,
                "user_id": "rustfan",
                "listens": [{
                    "listened_at": 1_699_999_000,
                    "track_metadata": {
                        "track_name": "Avril 14th",
                        "artist_name": "Aphex Twin"
                    }
                }]
            }
        });
        let bytes = serde_json::to_vec(&doc).expect("fixture serializes");
        let page: UserListens = envelope::decode_payload(&bytes).expect("payload envelope");
        assert_eq!(page.count, 1);
        assert_eq!(page.user_id, "rustfan");
        assert_eq!(page.listens.len(), 1);
        assert_eq!(page.listens[0].track_metadata.track_name, "Avril 14th");
    }

    #[test]
    fn token_validation_requires_its_fields() {
        let err = TokenValidation::decode_value(json!({"valid": true}), "$").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("message")));
    }

    #[test]
    fn error_body_decodes() {
        let body = ErrorBody::decode_slice(br#"{"code": 404, "error": "Not found"}"#)
            .expect("error body");
        assert_eq!(body.code, 404);
        assert_eq!(body.error, "Not found");
    }
}
