//! Service constants: endpoints, limits, and header names.

/// Default API root for the hosted service.
pub const DEFAULT_API_ROOT: &str = "https://api.listenbrainz.org";

/// Listen submission endpoint.
pub const SUBMIT_LISTENS_PATH: &str = "/1/submit-listens";

/// Token validation endpoint.
pub const VALIDATE_TOKEN_PATH: &str = "/1/validate-token";

/// Default ceiling on a serialized submission body, in bytes.
///
/// Matches the documented maximum request size the hosted service
/// enforces; override via
/// [`ClientConfig::with_payload_ceiling`](crate::client::ClientConfig::with_payload_ceiling)
/// for compatible services with different limits.
pub const DEFAULT_PAYLOAD_CEILING_BYTES: usize = 10_240;

/// Requests allowed per window.
pub const RATE_LIMIT_LIMIT_HEADER: &str = "X-RateLimit-Limit";

/// Requests remaining in the current window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining";

/// Unix time at which the window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";

/// Seconds until the window resets.
pub const RATE_LIMIT_RESET_IN_HEADER: &str = "X-RateLimit-Reset-In";
