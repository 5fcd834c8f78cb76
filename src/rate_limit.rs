//! Rate-limit observation from response headers.
//!
//! The control-plane reports the caller's write-request budget through
//! rate-limit response headers. The client records the most recent values
//! after every dispatched request and exposes them as a snapshot; it never
//! waits on them itself.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The most recently observed rate-limit state.
///
/// Not every endpoint reports rate-limit headers, so either field may lag
/// behind the requests actually made; a missing header leaves the prior
/// value in place rather than resetting it.
///
/// # Examples
///
/// ```no_run
/// use briskcdn::Client;
///
/// # async fn example() -> Result<(), briskcdn::Error> {
/// let client = Client::from_env()?;
/// client.get::<serde_json::Value>("/service/abc123").await?;
///
/// let snapshot = client.rate_limit();
/// if snapshot.remaining == Some(0) {
///     eprintln!("budget exhausted until {:?}", snapshot.reset);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Number of requests remaining in the current window.
    pub remaining: Option<u64>,
    /// When the current window resets.
    pub reset: Option<SystemTime>,
}

impl RateLimit {
    /// Folds a response's headers into the snapshot.
    ///
    /// Fields update independently: a response carrying only a remaining
    /// count leaves the previously observed reset time in place.
    pub(crate) fn observe(&mut self, headers: &HeaderMap) {
        if let Some(remaining) = parse_remaining(headers) {
            self.remaining = Some(remaining);
        }
        if let Some(reset) = parse_reset(headers) {
            self.reset = Some(reset);
        }
    }
}

/// Parses RateLimit-Remaining or X-RateLimit-Remaining.
fn parse_remaining(headers: &HeaderMap) -> Option<u64> {
    for name in ["ratelimit-remaining", "x-ratelimit-remaining"] {
        if let Some(value) = headers.get(name) {
            if let Ok(parsed) = value.to_str().unwrap_or_default().parse() {
                return Some(parsed);
            }
        }
    }
    None
}

/// Parses RateLimit-Reset or X-RateLimit-Reset (Unix timestamp).
fn parse_reset(headers: &HeaderMap) -> Option<SystemTime> {
    for name in ["ratelimit-reset", "x-ratelimit-reset"] {
        if let Some(value) = headers.get(name) {
            if let Ok(timestamp) = value.to_str().unwrap_or_default().parse::<u64>() {
                return Some(UNIX_EPOCH + Duration::from_secs(timestamp));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn observe_overwrites_both_fields() {
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-remaining", HeaderValue::from_static("42"));
        headers.insert("ratelimit-reset", HeaderValue::from_static("1700000000"));

        let mut snapshot = RateLimit::default();
        snapshot.observe(&headers);

        assert_eq!(snapshot.remaining, Some(42));
        assert_eq!(
            snapshot.reset,
            Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );
    }

    #[test]
    fn observe_accepts_the_x_prefixed_variants() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("7"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000060"));

        let mut snapshot = RateLimit::default();
        snapshot.observe(&headers);
        assert_eq!(snapshot.remaining, Some(7));
        assert!(snapshot.reset.is_some());
    }

    #[test]
    fn absent_headers_leave_prior_snapshot_untouched() {
        let mut snapshot = RateLimit {
            remaining: Some(5),
            reset: Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
        };

        snapshot.observe(&HeaderMap::new());
        assert_eq!(snapshot.remaining, Some(5));
        assert!(snapshot.reset.is_some());

        // A response reporting only one header updates only that field.
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-remaining", HeaderValue::from_static("4"));
        snapshot.observe(&headers);
        assert_eq!(snapshot.remaining, Some(4));
        assert_eq!(
            snapshot.reset,
            Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );
    }

    #[test]
    fn garbage_header_values_are_ignored() {
        let mut snapshot = RateLimit {
            remaining: Some(5),
            reset: None,
        };

        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-remaining", HeaderValue::from_static("soon"));
        snapshot.observe(&headers);
        assert_eq!(snapshot.remaining, Some(5));
    }
}
