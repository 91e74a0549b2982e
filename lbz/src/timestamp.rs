//! Normalization of the service's heterogeneous timestamp forms.
//!
//! Listen timestamps arrive as unix seconds almost everywhere, but a few
//! shapes (notably JSPF playlist dates) carry RFC 3339 strings instead.
//! [`ListenedAt`] accepts either form on the wire and always serializes
//! back as unix seconds.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::wire::error::DecodeError;

/// Seconds since the unix epoch, as the service reports listen times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenedAt(i64);

impl ListenedAt {
    /// Creates a timestamp from raw unix seconds.
    #[must_use]
    pub const fn from_unix(secs: i64) -> Self {
        Self(secs)
    }

    /// Returns the timestamp as unix seconds.
    #[must_use]
    pub const fn as_unix(&self) -> i64 {
        self.0
    }

    /// Converts to a calendar date-time.
    #[must_use]
    pub fn to_datetime(self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.0).ok()
    }

    /// Reads a timestamp from a wire value: a JSON integer of unix
    /// seconds, or an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TypeMismatch`] for any other kind, with the
    /// RFC 3339 parse failure preserved as the cause for bad strings.
    pub fn decode(field: &str, value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Self)
                .ok_or_else(|| DecodeError::mismatch(field, "unix seconds")),
            Value::String(s) => OffsetDateTime::parse(&s, &Rfc3339)
                .map(|dt| Self(dt.unix_timestamp()))
                .map_err(|e| {
                    DecodeError::mismatch_caused_by(field, "unix seconds or an RFC 3339 string", e)
                }),
            _ => Err(DecodeError::mismatch(
                field,
                "unix seconds or an RFC 3339 string",
            )),
        }
    }

    /// Reads a timestamp, mapping `null` to `None`.
    ///
    /// # Errors
    ///
    /// See [`ListenedAt::decode`].
    pub fn decode_opt(field: &str, value: Value) -> Result<Option<Self>, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => Self::decode(field, other).map(Some),
        }
    }
}

impl Display for ListenedAt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ListenedAt {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}

impl Serialize for ListenedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}
