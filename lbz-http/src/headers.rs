//! Capture of the service's rate-limit counters from response headers.

use lbz::RateLimitSnapshot;
use reqwest::header::HeaderMap;

use crate::constants::{
    RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER,
    RATE_LIMIT_RESET_IN_HEADER,
};

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Reads the four `X-RateLimit-*` headers into a snapshot.
///
/// All four must be present and well-formed; anything less yields `None`
/// rather than a partial snapshot or an error - the counters are advisory
/// and a response without them is not a failure.
#[must_use]
pub fn rate_limit_snapshot(headers: &HeaderMap) -> Option<RateLimitSnapshot> {
    Some(RateLimitSnapshot {
        allowed: header_u64(headers, RATE_LIMIT_LIMIT_HEADER)?,
        remaining: header_u64(headers, RATE_LIMIT_REMAINING_HEADER)?,
        reset_at: header_u64(headers, RATE_LIMIT_RESET_HEADER)?,
        reset_in: header_u64(headers, RATE_LIMIT_RESET_IN_HEADER)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn headers(entries: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(value).expect("test header value"),
            );
        }
        map
    }

    #[test]
    fn all_four_headers_parse() {
        let snapshot = rate_limit_snapshot(&headers(&[
            ("x-ratelimit-limit", "50"),
            ("x-ratelimit-remaining", "42"),
            ("x-ratelimit-reset", "1700000010"),
            ("x-ratelimit-reset-in", "7"),
        ]))
        .expect("complete headers");
        assert_eq!(snapshot.allowed, 50);
        assert_eq!(snapshot.remaining, 42);
        assert_eq!(snapshot.reset_at, 1_700_000_010);
        assert_eq!(snapshot.reset_in, 7);
    }

    #[test]
    fn missing_or_garbled_headers_yield_none() {
        assert!(rate_limit_snapshot(&HeaderMap::new()).is_none());
        assert!(
            rate_limit_snapshot(&headers(&[
                ("x-ratelimit-limit", "50"),
                ("x-ratelimit-remaining", "many"),
                ("x-ratelimit-reset", "1700000010"),
                ("x-ratelimit-reset-in", "7"),
            ]))
            .is_none()
        );
    }
}
