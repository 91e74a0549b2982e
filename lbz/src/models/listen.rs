//! Listen records as returned by the listen-history endpoints.

use serde_json::Value;
use uuid::Uuid;

use crate::timestamp::ListenedAt;
use crate::wire::error::DecodeError;
use crate::wire::object::{ExtraFields, FieldOutcome, FieldSpec, WireDecode, take_required};
use crate::wire::{coerce, cursor};

/// One listen from a user's history.
#[derive(Debug, Clone, PartialEq)]
pub struct Listen {
    /// When the track was listened to.
    pub listened_at: ListenedAt,
    /// When the service recorded the listen, if reported.
    pub inserted_at: Option<ListenedAt>,
    /// The MessyBrainz identifier assigned to the recording, if any.
    pub recording_msid: Option<Uuid>,
    /// The user the listen belongs to, when the endpoint includes it.
    pub user_name: Option<String>,
    /// The track's metadata.
    pub track_metadata: TrackMetadata,
    /// Properties this client does not recognize, in document order.
    pub extra: ExtraFields,
}

/// Accumulator for [`Listen`].
#[derive(Debug, Default)]
pub struct ListenBuilder {
    listened_at: Option<ListenedAt>,
    inserted_at: Option<ListenedAt>,
    recording_msid: Option<Uuid>,
    user_name: Option<String>,
    track_metadata: Option<TrackMetadata>,
}

impl WireDecode for Listen {
    type Builder = ListenBuilder;

    const FIELDS: &'static [FieldSpec<ListenBuilder>] = &[
        FieldSpec {
            name: "listened_at",
            required: true,
            apply: |b, v| {
                Ok(match ListenedAt::decode_opt("listened_at", v)? {
                    Some(ts) => {
                        b.listened_at = Some(ts);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "inserted_at",
            required: false,
            apply: |b, v| {
                b.inserted_at = ListenedAt::decode_opt("inserted_at", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "recording_msid",
            required: false,
            apply: |b, v| {
                b.recording_msid = cursor::opt_mbid("recording_msid", v)?;
                Ok(FieldOutcome::Set)
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
        FieldSpec {
            name: "track_metadata",
            required: true,
            apply: |b, v| {
                Ok(match v {
                    Value::Null => FieldOutcome::Absent,
                    other => {
                        b.track_metadata =
                            Some(TrackMetadata::decode_value(other, "track_metadata")?);
                        FieldOutcome::Set
                    }
                })
            },
        },
    ];

    fn finish(builder: ListenBuilder, extra: ExtraFields) -> Result<Self, DecodeError> {
        Ok(Self {
            listened_at: take_required(builder.listened_at, "listened_at")?,
            inserted_at: builder.inserted_at,
            recording_msid: builder.recording_msid,
            user_name: builder.user_name,
            track_metadata: take_required(builder.track_metadata, "track_metadata")?,
            extra,
        })
    }
}

/// Metadata about a listened track.
///
/// `artist_name` is the canonical artist field. Some shapes also carry an
/// `artist_names` list; when that alternate form agrees with the canonical
/// field it is consumed silently, and when it disagrees it is retained in
/// `extra` so the discrepancy stays visible.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    /// The track title.
    pub track_name: String,
    /// The canonical artist name.
    pub artist_name: String,
    /// The release (album) title, if reported.
    pub release_name: Option<String>,
    /// MusicBrainz identifiers matched to this listen, if any.
    pub mbid_mapping: Option<MbidMapping>,
    /// Client-submitted auxiliary data, kept uninterpreted.
    pub additional_info: ExtraFields,
    /// Properties this client does not recognize, in document order.
    pub extra: ExtraFields,
}

/// Accumulator for [`TrackMetadata`].
#[derive(Debug, Default)]
pub struct TrackMetadataBuilder {
    track_name: Option<String>,
    artist_name: Option<String>,
    artist_names: Option<Vec<String>>,
    release_name: Option<String>,
    mbid_mapping: Option<MbidMapping>,
    additional_info: Option<ExtraFields>,
}

impl WireDecode for TrackMetadata {
    type Builder = TrackMetadataBuilder;

    const FIELDS: &'static [FieldSpec<TrackMetadataBuilder>] = &[
        FieldSpec {
            name: "track_name",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_string("track_name", v)? {
                    Some(s) => {
                        b.track_name = Some(s);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "artist_name",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_string("artist_name", v)? {
                    Some(s) => {
                        b.artist_name = Some(s);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "artist_names",
            required: false,
            apply: |b, v| {
                b.artist_names = coerce::opt_seq("artist_names", v, cursor::string)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "release_name",
            required: false,
            apply: |b, v| {
                b.release_name = cursor::opt_string("release_name", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "mbid_mapping",
            required: false,
            apply: |b, v| {
                Ok(match v {
                    Value::Null => FieldOutcome::Absent,
                    other => {
                        b.mbid_mapping = Some(MbidMapping::decode_value(other, "mbid_mapping")?);
                        FieldOutcome::Set
                    }
                })
            },
        },
        FieldSpec {
            name: "additional_info",
            required: false,
            apply: |b, v| {
                Ok(match v {
                    Value::Null => FieldOutcome::Absent,
                    Value::Object(map) => {
                        b.additional_info = Some(map);
                        FieldOutcome::Set
                    }
                    _ => {
                        return Err(DecodeError::ExpectedObject {
                            context: "additional_info".to_owned(),
                        });
                    }
                })
            },
        },
    ];

    fn finish(builder: TrackMetadataBuilder, mut extra: ExtraFields) -> Result<Self, DecodeError> {
        let artist_name = take_required(builder.artist_name, "artist_name")?;

        // The alternate artist list is redundant when it spells out the
        // canonical name; a disagreeing alternate is data, not noise.
        if let Some(names) = builder.artist_names {
            if names.join(", ") != artist_name {
                extra.insert(
                    "artist_names".to_owned(),
                    Value::Array(names.into_iter().map(Value::String).collect()),
                );
            }
        }

        Ok(Self {
            track_name: take_required(builder.track_name, "track_name")?,
            artist_name,
            release_name: builder.release_name,
            mbid_mapping: builder.mbid_mapping,
            additional_info: builder.additional_info.unwrap_or_default(),
            extra,
        })
    }
}

/// MusicBrainz identifiers the service matched to a listen.
#[derive(Debug, Clone, PartialEq)]
pub struct MbidMapping {
    /// The matched recording.
    pub recording_mbid: Option<Uuid>,
    /// The matched release.
    pub release_mbid: Option<Uuid>,
    /// The matched artists, in credit order.
    pub artist_mbids: Vec<Uuid>,
    /// Properties this client does not recognize, in document order.
    pub extra: ExtraFields,
}

/// Accumulator for [`MbidMapping`].
#[derive(Debug, Default)]
pub struct MbidMappingBuilder {
    recording_mbid: Option<Uuid>,
    release_mbid: Option<Uuid>,
    artist_mbids: Option<Vec<Uuid>>,
}

impl WireDecode for MbidMapping {
    type Builder = MbidMappingBuilder;

    const FIELDS: &'static [FieldSpec<MbidMappingBuilder>] = &[
        FieldSpec {
            name: "recording_mbid",
            required: false,
            apply: |b, v| {
                b.recording_mbid = cursor::opt_mbid("recording_mbid", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "release_mbid",
            required: false,
            apply: |b, v| {
                b.release_mbid = cursor::opt_mbid("release_mbid", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "artist_mbids",
            required: false,
            apply: |b, v| {
                b.artist_mbids = coerce::opt_seq("artist_mbids", v, cursor::mbid)?;
                Ok(FieldOutcome::Set)
            },
        },
    ];

    fn finish(builder: MbidMappingBuilder, extra: ExtraFields) -> Result<Self, DecodeError> {
        Ok(Self {
            recording_mbid: builder.recording_mbid,
            release_mbid: builder.release_mbid,
            artist_mbids: builder.artist_mbids.unwrap_or_default(),
            extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listen_doc() -> Value {
        json!({
            "listened_at": 1_700_000_000,
            "recording_msid": "5e3c9f7e-9f6e-4a2d-8b7a-2b6e8f2d9c11",
            "track_metadata": {
                "track_name": "Windowlicker",
                "artist_name": "Aphex Twin",
                "release_name": "Windowlicker",
                "mbid_mapping": {
                    "recording_mbid": "d328d4e6-b185-4dd2-878f-2ba2aae79918",
                    "release_mbid": "b9dd5c41-e1f1-4c37-94e5-1a7d78b1b8a4",
                    "artist_mbids": ["f22942a1-6f70-4f48-866e-238cb2308fbd"]
                },
                "additional_info": {"media_player": "roon"}
            },
            "listening_from": "web"
        })
    }

    #[test]
    fn decodes_known_fields_and_keeps_the_rest() {
        let listen = Listen::decode_value(listen_doc(), "$").expect("full listen");
        assert_eq!(listen.listened_at.as_unix(), 1_700_000_000);
        assert_eq!(listen.track_metadata.artist_name, "Aphex Twin");
        assert_eq!(
            listen
                .track_metadata
                .mbid_mapping
                .as_ref()
                .and_then(|m| m.artist_mbids.first())
                .map(Uuid::to_string)
                .as_deref(),
            Some("f22942a1-6f70-4f48-866e-238cb2308fbd")
        );
        assert_eq!(listen.extra["listening_from"], json!("web"));
        assert_eq!(
            listen.track_metadata.additional_info["media_player"],
            json!("roon")
        );
    }

    #[test]
    fn agreeing_artist_names_are_consumed() {
        let meta = TrackMetadata::decode_value(
            json!({
                "track_name": "Xtal",
                "artist_name": "Aphex Twin",
                "artist_names": ["Aphex Twin"]
            }),
            "$",
        )
        .expect("metadata");
        assert!(!meta.extra.contains_key("artist_names"));
    }

    #[test]
    fn disagreeing_artist_names_are_retained_as_extra() {
        let meta = TrackMetadata::decode_value(
            json!({
                "track_name": "Midnight",
                "artist_name": "A. Twin",
                "artist_names": ["Aphex Twin", "µ-Ziq"]
            }),
            "$",
        )
        .expect("metadata");
        assert_eq!(
            meta.extra["artist_names"],
            json!(["Aphex Twin", "µ-Ziq"])
        );
        assert_eq!(meta.artist_name, "A. Twin");
    }

    #[test]
    fn bad_mbid_reports_the_nested_field() {
        let err = MbidMapping::decode_value(
            json!({"release_mbid": "definitely-not-a-uuid"}),
            "mbid_mapping",
        )
        .unwrap_err();
        assert!(err.to_string().contains("release_mbid"));
    }
}
