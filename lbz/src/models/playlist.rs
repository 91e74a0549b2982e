//! JSPF playlists and their polymorphic envelope.
//!
//! A playlist may arrive in three shapes:
//!
//! 1. the bare playlist object;
//! 2. `{"playlist": <playlist>, ...}` - the JSPF standard wrapper, whose
//!    siblings (if any) are service-specific;
//! 3. `{"jspf": <jspf document>, "mbid": <id>}` - the service's
//!    fetch-by-identifier wrapper around a full JSPF document, so the
//!    payload sits two levels deep.
//!
//! All three decode to identical known fields; the wrapper-only siblings
//! of every peeled level end up in the playlist's `extra` map under a
//! disambiguating prefix (`listenbrainz:` for the fetch wrapper,
//! `playlist:` for the JSPF wrapper).

use serde_json::Value;
use url::Url;

use crate::timestamp::ListenedAt;
use crate::wire::envelope::{WrapperKey, unwrap_nested};
use crate::wire::error::DecodeError;
use crate::wire::object::{ExtraFields, FieldOutcome, FieldSpec, WireDecode, take_required};
use crate::wire::{coerce, cursor};

/// Wrapper shapes a playlist may arrive in, tried by first property name.
pub const PLAYLIST_WRAPPERS: &[WrapperKey] = &[
    WrapperKey {
        key: "jspf",
        prefix: "listenbrainz:",
    },
    WrapperKey {
        key: "playlist",
        prefix: "playlist:",
    },
];

/// A JSPF playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    /// The playlist title.
    pub title: String,
    /// The playlist's creator, if reported.
    pub creator: Option<String>,
    /// Free-text annotation, if any.
    pub annotation: Option<String>,
    /// The playlist's canonical identifier URI, if any.
    pub identifier: Option<Url>,
    /// When the playlist was created.
    pub date: Option<ListenedAt>,
    /// The playlist's tracks, in order.
    pub tracks: Vec<PlaylistTrack>,
    /// JSPF extension data, kept uninterpreted.
    pub extension: Option<Value>,
    /// Properties this client does not recognize, in document order,
    /// including prefixed wrapper siblings.
    pub extra: ExtraFields,
}

/// Accumulator for [`Playlist`].
#[derive(Debug, Default)]
pub struct PlaylistBuilder {
    title: Option<String>,
    creator: Option<String>,
    annotation: Option<String>,
    identifier: Option<Url>,
    date: Option<ListenedAt>,
    tracks: Option<Vec<PlaylistTrack>>,
    extension: Option<Value>,
}

impl WireDecode for Playlist {
    type Builder = PlaylistBuilder;

    const FIELDS: &'static [FieldSpec<PlaylistBuilder>] = &[
        FieldSpec {
            name: "title",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_string("title", v)? {
                    Some(s) => {
                        b.title = Some(s);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "creator",
            required: false,
            apply: |b, v| {
                b.creator = cursor::opt_string("creator", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "annotation",
            required: false,
            apply: |b, v| {
                b.annotation = cursor::opt_string("annotation", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "identifier",
            required: false,
            apply: |b, v| {
                b.identifier = cursor::opt_uri("identifier", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "date",
            required: false,
            apply: |b, v| {
                b.date = ListenedAt::decode_opt("date", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "track",
            required: false,
            apply: |b, v| {
                b.tracks = coerce::opt_seq("track", v, |_, item| {
                    PlaylistTrack::decode_value(item, "track")
                })?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "extension",
            required: false,
            apply: |b, v| {
                b.extension = match v {
                    Value::Null => None,
                    other => Some(other),
                };
                Ok(FieldOutcome::Set)
            },
        },
    ];

    fn finish(builder: PlaylistBuilder, extra: ExtraFields) -> Result<Self, DecodeError> {
        Ok(Self {
            title: take_required(builder.title, "title")?,
            creator: builder.creator,
            annotation: builder.annotation,
            identifier: builder.identifier,
            date: builder.date,
            tracks: builder.tracks.unwrap_or_default(),
            extension: builder.extension,
            extra,
        })
    }
}

impl Playlist {
    /// Decodes a playlist document in any of its three accepted shapes.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or per the playlist's field table.
    pub fn decode_any_shape(bytes: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::decode_any_shape_value(value)
    }

    /// Decodes a parsed value in any of the three accepted shapes.
    ///
    /// # Errors
    ///
    /// Fails when neither a known wrapper nor a bare playlist matches.
    pub fn decode_any_shape_value(value: Value) -> Result<Self, DecodeError> {
        let (inner, wrapper_extra) = unwrap_nested(value, "$", PLAYLIST_WRAPPERS)?;
        let mut playlist = Self::decode_value(inner, "playlist")?;
        playlist.extra.extend(wrapper_extra);
        Ok(playlist)
    }
}

/// One track of a JSPF playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistTrack {
    /// The track title.
    pub title: String,
    /// The track's artist, if reported.
    pub creator: Option<String>,
    /// The track's identifier URI, if any.
    pub identifier: Option<Url>,
    /// The release the track belongs to, if reported.
    pub album: Option<String>,
    /// Track length in milliseconds, if reported.
    pub duration: Option<u64>,
    /// Properties this client does not recognize, in document order.
    pub extra: ExtraFields,
}

/// Accumulator for [`PlaylistTrack`].
#[derive(Debug, Default)]
pub struct PlaylistTrackBuilder {
    title: Option<String>,
    creator: Option<String>,
    identifier: Option<Url>,
    album: Option<String>,
    duration: Option<u64>,
}

impl WireDecode for PlaylistTrack {
    type Builder = PlaylistTrackBuilder;

    const FIELDS: &'static [FieldSpec<PlaylistTrackBuilder>] = &[
        FieldSpec {
            name: "title",
            required: true,
            apply: |b, v| {
                Ok(match cursor::opt_string("title", v)? {
                    Some(s) => {
                        b.title = Some(s);
                        FieldOutcome::Set
                    }
                    None => FieldOutcome::Absent,
                })
            },
        },
        FieldSpec {
            name: "creator",
            required: false,
            apply: |b, v| {
                b.creator = cursor::opt_string("creator", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "identifier",
            required: false,
            apply: |b, v| {
                // JSPF allows a single identifier or a list; the first
                // entry is taken as canonical.
                b.identifier = match v {
                    Value::Array(items) => items
                        .into_iter()
                        .next()
                        .map(|first| cursor::uri("identifier", first))
                        .transpose()?,
                    other => cursor::opt_uri("identifier", other)?,
                };
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "album",
            required: false,
            apply: |b, v| {
                b.album = cursor::opt_string("album", v)?;
                Ok(FieldOutcome::Set)
            },
        },
        FieldSpec {
            name: "duration",
            required: false,
            apply: |b, v| {
                b.duration = cursor::opt_uint64("duration", v)?;
                Ok(FieldOutcome::Set)
            },
        },
    ];

    fn finish(builder: PlaylistTrackBuilder, extra: ExtraFields) -> Result<Self, DecodeError> {
        Ok(Self {
            title: take_required(builder.title, "title")?,
            creator: builder.creator,
            identifier: builder.identifier,
            album: builder.album,
            duration: builder.duration,
            extra,
        })
    }
}
