//! Write-side types for listen submission.
//!
//! These are distinct from the read-side models on purpose: only the
//! fields of the wire contract exist here, so extra fields captured while
//! decoding a history can never leak back into a submission.

use serde::Serialize;
use serde_json::Value;

use crate::models::Listen;
use crate::timestamp::ListenedAt;
use crate::wire::object::ExtraFields;

/// The kind of submission, as the service's `listen_type` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListenType {
    /// One listen for a track that finished playing.
    Single,
    /// The track currently playing; carries no timestamp.
    PlayingNow,
    /// A bulk import of historical listens.
    Import,
}

/// One listen to be submitted.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittableListen {
    /// When the track was listened to. Omitted for playing-now
    /// submissions.
    pub listened_at: Option<ListenedAt>,
    /// The track being reported.
    pub track_metadata: SubmittableTrack,
}

impl SubmittableListen {
    /// A listen of `track` at `listened_at`.
    #[must_use]
    pub fn new(listened_at: ListenedAt, track: SubmittableTrack) -> Self {
        Self {
            listened_at: Some(listened_at),
            track_metadata: track,
        }
    }

    /// A playing-now report of `track`, with no timestamp.
    #[must_use]
    pub fn playing_now(track: SubmittableTrack) -> Self {
        Self {
            listened_at: None,
            track_metadata: track,
        }
    }
}

/// The track fields of a submittable listen.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittableTrack {
    /// The artist name.
    pub artist_name: String,
    /// The track title.
    pub track_name: String,
    /// The release (album) title, if known.
    pub release_name: Option<String>,
    /// Auxiliary submission data (player, durations, MBIDs, ...).
    #[serde(skip_serializing_if = "ExtraFields::is_empty")]
    pub additional_info: ExtraFields,
}

impl SubmittableTrack {
    /// A track with the two mandatory fields.
    #[must_use]
    pub fn new(artist_name: impl Into<String>, track_name: impl Into<String>) -> Self {
        Self {
            artist_name: artist_name.into(),
            track_name: track_name.into(),
            release_name: None,
            additional_info: ExtraFields::new(),
        }
    }

    /// Sets the release title.
    #[must_use]
    pub fn with_release(mut self, release_name: impl Into<String>) -> Self {
        self.release_name = Some(release_name.into());
        self
    }

    /// Adds one `additional_info` entry.
    #[must_use]
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_info.insert(key.into(), value.into());
        self
    }

    /// Records the submitting client's name and version in
    /// `additional_info`, as the service asks submitters to do.
    #[must_use]
    pub fn with_client_info(self, name: &str, version: &str) -> Self {
        self.with_info("submission_client", name)
            .with_info("submission_client_version", version)
    }
}

impl From<&Listen> for SubmittableListen {
    /// Converts a decoded history listen back into a submittable one.
    ///
    /// Only wire-contract fields cross over; anything captured in the
    /// listen's extra-fields maps stays behind.
    fn from(listen: &Listen) -> Self {
        Self {
            listened_at: Some(listen.listened_at),
            track_metadata: SubmittableTrack {
                artist_name: listen.track_metadata.artist_name.clone(),
                track_name: listen.track_metadata.track_name.clone(),
                release_name: listen.track_metadata.release_name.clone(),
                additional_info: listen.track_metadata.additional_info.clone(),
            },
        }
    }
}

/// The submission envelope: `{"listen_type": ..., "payload": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitListens<'a> {
    /// The submission kind.
    pub listen_type: ListenType,
    /// The listens being submitted.
    pub payload: &'a [SubmittableListen],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_serializes_only_wire_contract_fields() {
        let listens = [SubmittableListen::new(
            ListenedAt::from_unix(1_700_000_000),
            SubmittableTrack::new("Aphex Twin", "Xtal").with_release("Selected Ambient Works 85-92"),
        )];
        let body = serde_json::to_value(SubmitListens {
            listen_type: ListenType::Import,
            payload: &listens,
        })
        .expect("serializes");

        assert_eq!(
            body,
            json!({
                "listen_type": "import",
                "payload": [{
                    "listened_at": 1_700_000_000,
                    "track_metadata": {
                        "artist_name": "Aphex Twin",
                        "track_name": "Xtal",
                        "release_name": "Selected Ambient Works 85-92"
                    }
                }]
            })
        );
    }

    #[test]
    fn playing_now_omits_the_timestamp() {
        let listen = SubmittableListen::playing_now(SubmittableTrack::new("Boards of Canada", "Roygbiv"));
        let body = serde_json::to_value(&listen).expect("serializes");
        assert!(body.get("listened_at").is_none());
    }

    #[test]
    fn resubmission_never_echoes_extra_fields() {
        use crate::wire::WireDecode;

        let doc = json!({
            "listened_at": 1_700_000_000,
            "user_name": "alice",
            "unexpected_new_field": 42,
            "track_metadata": {
                "artist_name": "a",
                "track_name": "t",
                "mystery": "x",
                "additional_info": {"music_service": "spotify.com"}
            }
        });
        let listen = Listen::decode_value(doc, "listen").expect("decodes");
        assert_eq!(listen.extra["unexpected_new_field"], json!(42));

        let body = serde_json::to_value(SubmittableListen::from(&listen)).expect("serializes");
        assert!(body.get("unexpected_new_field").is_none());
        assert!(body["track_metadata"].get("mystery").is_none());
        assert_eq!(
            body["track_metadata"]["additional_info"]["music_service"],
            json!("spotify.com")
        );
    }

    #[test]
    fn client_info_lands_in_additional_info() {
        let track = SubmittableTrack::new("a", "t").with_client_info("lbz", "0.2.0");
        assert_eq!(track.additional_info["submission_client"], json!("lbz"));
        assert_eq!(
            track.additional_info["submission_client_version"],
            json!("0.2.0")
        );
    }
}
