//! The failure taxonomy callers receive from the client.

use lbz::DecodeError;

/// An error from one API call.
///
/// Exactly one of these is produced per failed call; nothing is retried
/// or swallowed inside the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never completed (connection, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request failed and no structured error body could be decoded.
    #[error("{status} {reason}")]
    Status {
        /// The transport status code.
        status: u16,
        /// The status reason phrase.
        reason: String,
        /// The raw response body, if any.
        raw_body: Option<String>,
    },

    /// The request failed with a structured error body.
    #[error("{reason}: {message} (code {code})")]
    Server {
        /// The transport status code.
        status: u16,
        /// The server-reported numeric code.
        code: u64,
        /// The server-reported message.
        message: String,
        /// The reason label: the transport reason phrase when the codes
        /// agree, the generic `"Error"` when they do not.
        reason: String,
        /// Whether the server-reported code agreed with the transport
        /// status. When `false` the decoded message is best-effort.
        code_matches_status: bool,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("response decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// A submission body could not be serialized.
    #[error("request serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A batched import failed partway through.
    ///
    /// The already-sent batches are not rolled back; `listens_sent` says
    /// how many listens had been accepted before the failure.
    #[error("import aborted after {listens_sent} listens: {source}")]
    Import {
        /// Listens accepted by the service before the failure.
        listens_sent: usize,
        /// The failure that aborted the import.
        #[source]
        source: Box<ApiError>,
    },
}
