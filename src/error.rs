//! Error types for Brisk CDN API calls.
//!
//! This module provides the error taxonomy for the client: transport errors,
//! configuration errors, encode/decode failures, and structured application
//! errors ([`ApiError`]) parsed from non-2xx response bodies. All errors
//! preserve the raw response data when it is available.

use http::StatusCode;
use serde::Deserialize;

/// The main error type for Brisk CDN API calls.
///
/// # Examples
///
/// ```no_run
/// use briskcdn::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .api_key("secret")
///     .build()?;
///
/// match client.get::<serde_json::Value>("/service/abc123").await {
///     Ok(response) => println!("Success: {:?}", response.data),
///     Err(Error::Http(api)) if api.is_not_found() => {
///         eprintln!("No such service");
///     }
///     Err(Error::Decode { raw_response, serde_error, .. }) => {
///         eprintln!("Failed to decode. Raw response: {}", raw_response);
///         eprintln!("Serde error: {}", serde_error);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed,
    /// timeout, cancellation).
    ///
    /// This wraps the underlying `reqwest::Error` verbatim; the client does
    /// not reinterpret transport failures, and does not distinguish
    /// cancellation from any other transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An invalid URL was provided for the base address.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration was provided.
    ///
    /// This indicates a problem with how the client or request was
    /// configured, such as a missing API key environment variable or invalid
    /// header values. Raised before any network I/O takes place.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failed to encode the request body.
    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// Failed to decode the response body into the expected type.
    ///
    /// This can occur even on a 2xx response, and is surfaced distinctly
    /// from [`Error::Http`]. The raw response text and the serde error
    /// message are both preserved.
    #[error("Failed to decode response (status {status}): {serde_error}")]
    Decode {
        /// The raw response body that failed to decode.
        raw_response: String,
        /// The serde error message.
        serde_error: String,
        /// The HTTP status code of the response.
        status: StatusCode,
    },

    /// The server returned a non-success HTTP status code.
    ///
    /// The body has been parsed into a structured [`ApiError`], regardless
    /// of which of the two vendor error formats it used.
    #[error(transparent)]
    Http(#[from] ApiError),
}

impl Error {
    /// Returns `true` if this error is a "resource not found" response.
    ///
    /// Callers use this pervasively to distinguish an absent resource from
    /// any other failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Http(api) if api.is_not_found())
    }

    /// Returns the HTTP status code if this error has one.
    ///
    /// Returns `Some(status)` for `Http` and `Decode` errors, `None` for
    /// other error types.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http(api) => Some(api.status),
            Error::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Http(api) => Some(&api.raw),
            Error::Decode { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for Brisk CDN API calls.
pub type Result<T> = std::result::Result<T, Error>;

/// The set of status codes the API uses for success responses.
///
/// Note that this is deliberately not the whole 2xx family: the vendor never
/// responds with 203 or 207, so those classify as failures.
const SUCCESS_CODES: [u16; 6] = [200, 201, 202, 204, 205, 206];

/// Returns `true` if the status code counts as a success response.
pub(crate) fn is_success(status: StatusCode) -> bool {
    SUCCESS_CODES.contains(&status.as_u16())
}

/// The media type the API uses for JSON:API documents, including errors.
pub(crate) const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// One `(id, title, detail)` triple from an error response body.
///
/// Legacy-format bodies produce exactly one entry (with no id); JSON:API
/// bodies may produce several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Server-assigned identifier for this error instance, if any.
    pub id: Option<String>,
    /// Short, human-readable summary.
    pub title: Option<String>,
    /// Longer explanation specific to this occurrence.
    pub detail: Option<String>,
}

/// A structured application-level error from a non-success response.
///
/// Created once per failed response and never mutated; callers inspect the
/// status code, the normalized `(id, title, detail)` triples, or the raw
/// body kept for diagnostics.
///
/// # Examples
///
/// ```
/// use briskcdn::ApiError;
/// use http::StatusCode;
///
/// let err = ApiError::from_body(
///     StatusCode::NOT_FOUND,
///     Some("application/json"),
///     r#"{"msg":"Record not found","detail":"no ACL with that id"}"#.to_string(),
/// );
///
/// assert!(err.is_not_found());
/// assert!(err.to_string().contains("Record not found"));
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    /// The HTTP status code of the failed response.
    pub status: StatusCode,
    /// The normalized error entries parsed from the body.
    pub errors: Vec<ErrorDetail>,
    /// The raw response body, kept for diagnostics.
    pub raw: String,
}

/// Legacy two-field error body: `{"msg": "...", "detail": "..."}`.
#[derive(Deserialize)]
struct LegacyErrorBody {
    msg: Option<String>,
    detail: Option<String>,
}

/// JSON:API error body: `{"errors": [{"id", "title", "detail"}, ...]}`.
#[derive(Deserialize)]
struct JsonApiErrorBody {
    errors: Vec<JsonApiErrorEntry>,
}

#[derive(Deserialize)]
struct JsonApiErrorEntry {
    id: Option<String>,
    title: Option<String>,
    detail: Option<String>,
}

impl ApiError {
    /// Parses a failed response body into a structured `ApiError`.
    ///
    /// The body is dual-format: responses whose content type is the JSON:API
    /// error media type carry an array of `{id, title, detail}` objects;
    /// everything else falls back to the legacy two-field `{msg, detail}`
    /// object. Both shapes normalize into the same value so callers never
    /// need format-aware branching. A body that parses as neither (or not at
    /// all) still yields an `ApiError` carrying the raw text.
    pub fn from_body(status: StatusCode, content_type: Option<&str>, raw: String) -> Self {
        let is_json_api = content_type
            .map(|ct| ct.starts_with(JSON_API_MEDIA_TYPE))
            .unwrap_or(false);

        let errors = if is_json_api {
            parse_json_api_errors(&raw)
        } else {
            // Some endpoints emit JSON:API error arrays under a plain JSON
            // content type.
            parse_legacy_error(&raw).or_else(|| parse_json_api_errors(&raw))
        }
        .unwrap_or_default();

        ApiError {
            status,
            errors,
            raw,
        }
    }

    /// Returns `true` if the response status was 404 Not Found.
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Returns the first error title, if any.
    pub fn title(&self) -> Option<&str> {
        self.errors.iter().find_map(|e| e.title.as_deref())
    }

    /// Returns the first error detail, if any.
    pub fn detail(&self) -> Option<&str> {
        self.errors.iter().find_map(|e| e.detail.as_deref())
    }
}

fn parse_legacy_error(raw: &str) -> Option<Vec<ErrorDetail>> {
    let body: LegacyErrorBody = serde_json::from_str(raw).ok()?;
    if body.msg.is_none() && body.detail.is_none() {
        return None;
    }
    Some(vec![ErrorDetail {
        id: None,
        title: body.msg,
        detail: body.detail,
    }])
}

fn parse_json_api_errors(raw: &str) -> Option<Vec<ErrorDetail>> {
    let body: JsonApiErrorBody = serde_json::from_str(raw).ok()?;
    Some(
        body.errors
            .into_iter()
            .map(|e| ErrorDetail {
                id: e.id,
                title: e.title,
                detail: e.detail,
            })
            .collect(),
    )
}

impl std::error::Error for ApiError {}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "API error (status {})", self.status.as_u16())?;
        for entry in &self.errors {
            if let Some(title) = &entry.title {
                write!(f, ": {}", title)?;
            }
            if let Some(detail) = &entry.detail {
                write!(f, ": {}", detail)?;
            }
        }
        if self.errors.is_empty() && !self.raw.is_empty() {
            write!(f, ": {}", self.raw)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_body_normalizes_to_single_entry() {
        let err = ApiError::from_body(
            StatusCode::NOT_FOUND,
            Some("application/json"),
            r#"{"msg":"hello","detail":"nope"}"#.to_string(),
        );

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(err.is_not_found());
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.title(), Some("hello"));
        assert_eq!(err.detail(), Some("nope"));

        let rendered = err.to_string();
        assert!(rendered.contains("hello"));
        assert!(rendered.contains("nope"));
    }

    #[test]
    fn json_api_body_normalizes_all_entries() {
        let err = ApiError::from_body(
            StatusCode::CONFLICT,
            Some("application/vnd.api+json"),
            r#"{"errors":[
                {"id":"e1","title":"Duplicate record","detail":"already exists"},
                {"id":"e2","title":"Bad name","detail":"name is taken"}
            ]}"#
            .to_string(),
        );

        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].id.as_deref(), Some("e1"));
        assert_eq!(err.detail(), Some("already exists"));
    }

    #[test]
    fn json_api_shape_under_plain_content_type_still_parses() {
        let err = ApiError::from_body(
            StatusCode::BAD_REQUEST,
            Some("application/json"),
            r#"{"errors":[{"title":"Invalid","detail":"bad field"}]}"#.to_string(),
        );

        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.title(), Some("Invalid"));
    }

    #[test]
    fn unparsable_body_keeps_raw_text() {
        let err = ApiError::from_body(
            StatusCode::BAD_GATEWAY,
            Some("text/html"),
            "<html>bad gateway</html>".to_string(),
        );

        assert!(err.errors.is_empty());
        assert_eq!(err.raw, "<html>bad gateway</html>");
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn success_set_is_exact() {
        for code in [200u16, 201, 202, 204, 205, 206] {
            assert!(is_success(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        // 203 is in the 2xx family but the vendor never uses it.
        assert!(!is_success(StatusCode::NON_AUTHORITATIVE_INFORMATION));
        assert!(!is_success(StatusCode::NOT_FOUND));
        assert!(!is_success(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn error_helpers_expose_status_and_raw() {
        let err = Error::Http(ApiError::from_body(
            StatusCode::NOT_FOUND,
            None,
            r#"{"msg":"gone"}"#.to_string(),
        ));

        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.raw_response().unwrap().contains("gone"));

        let err = Error::Configuration("no key".to_string());
        assert!(!err.is_not_found());
        assert_eq!(err.status(), None);
    }
}
