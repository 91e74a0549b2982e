//! Classification of a completed response into success or typed failure.
//!
//! On failure, a JSON body is given one chance to decode as the service's
//! structured error shape. If it does, its self-reported code is
//! cross-checked against the transport status: the service has
//! historically let the two drift apart, so a mismatch keeps the decoded
//! message but downgrades the reason label to a generic `"Error"`, letting
//! callers tell "the codes agree" from "best effort". If the body is not
//! JSON or does not match the error shape, the failure falls back to the
//! raw transport facts - a secondary parse error is never surfaced.

use http::StatusCode;
use lbz::models::ErrorBody;
use lbz::wire::WireDecode;

use crate::error::ApiError;

/// Reason label substituted when the server's code disagrees with the
/// transport status.
const GENERIC_REASON: &str = "Error";

/// Classifies a completed response.
///
/// Returns the body for decoding on success.
///
/// # Errors
///
/// Returns [`ApiError::Server`] when a structured error body decodes, and
/// [`ApiError::Status`] otherwise.
pub fn interpret(status: StatusCode, body: Vec<u8>, body_is_json: bool) -> Result<Vec<u8>, ApiError> {
    if status.is_success() {
        return Ok(body);
    }

    let reason = status.canonical_reason().unwrap_or("Unknown").to_owned();

    if body_is_json && !body.is_empty() {
        if let Ok(parsed) = ErrorBody::decode_slice(&body) {
            let code_matches_status = parsed.code == u64::from(status.as_u16());
            return Err(ApiError::Server {
                status: status.as_u16(),
                code: parsed.code,
                message: parsed.error,
                reason: if code_matches_status {
                    reason
                } else {
                    GENERIC_REASON.to_owned()
                },
                code_matches_status,
            });
        }
    }

    Err(ApiError::Status {
        status: status.as_u16(),
        reason,
        raw_body: if body.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&body).into_owned())
        },
    })
}
