//! Per-call request configuration: extra headers, query parameters, and the
//! request body with its wire encoding.

use crate::encode;
use crate::error::{Error, Result, JSON_API_MEDIA_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

/// A request body together with its wire encoding.
///
/// The constructor chosen here determines the Content-Type header for the
/// call, so a single request can never ask for two content types at once.
#[derive(Debug)]
pub enum Body {
    /// URL-form payload (`application/x-www-form-urlencoded`).
    Form(String),
    /// JSON payload (`application/json`).
    Json(Vec<u8>),
    /// JSON:API document payload (`application/vnd.api+json`).
    JsonApi(Vec<u8>),
    /// Pre-encoded byte payload with an explicit content type and known
    /// length, for purge keys, VCL uploads, and similar raw endpoints.
    Raw {
        /// The Content-Type to send.
        content_type: String,
        /// The payload bytes.
        data: Vec<u8>,
    },
}

impl Body {
    /// Encodes a value as a URL-form body. See [`encode::form`].
    pub fn form<T: Serialize>(value: &T) -> Result<Body> {
        Ok(Body::Form(encode::form(value)?))
    }

    /// Encodes a value as a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Body> {
        Ok(Body::Json(encode::json(value)?))
    }

    /// Encodes a value as a JSON:API document body. See [`encode::json_api`].
    pub fn json_api<T: Serialize>(
        resource_type: &str,
        id: Option<&str>,
        value: &T,
    ) -> Result<Body> {
        Ok(Body::JsonApi(encode::json_api(resource_type, id, value)?))
    }

    /// Wraps pre-encoded bytes with an explicit content type.
    pub fn raw(content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Body {
        Body::Raw {
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub(crate) fn content_type(&self) -> &str {
        match self {
            Body::Form(_) => encode::FORM_MEDIA_TYPE,
            Body::Json(_) => encode::JSON_MEDIA_TYPE,
            Body::JsonApi(_) => JSON_API_MEDIA_TYPE,
            Body::Raw { content_type, .. } => content_type,
        }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        match self {
            Body::Form(text) => text.into_bytes(),
            Body::Json(bytes) | Body::JsonApi(bytes) => bytes,
            Body::Raw { data, .. } => data,
        }
    }
}

/// Configuration for an individual API call.
///
/// Created fresh per call and consumed by the dispatcher; it is never shared
/// between calls.
///
/// # Examples
///
/// ```
/// use briskcdn::{Body, RequestOptions};
///
/// # fn example() -> Result<(), briskcdn::Error> {
/// let options = RequestOptions::new()
///     .with_header("If-Match", "abc123")?
///     .with_query_param("filter[service]", "svc1")
///     .with_body(Body::form(&serde_json::json!({"name": "edge_auth"}))?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RequestOptions {
    /// Additional headers for this request.
    pub headers: HeaderMap,
    /// Query parameters, appended to the URL in order.
    pub params: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<Body>,
    /// Signals that the call may run concurrently with others sharing the
    /// client's rate-limit state. Advisory only; nothing is enforced.
    pub parallel: bool,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Adds multiple query parameters to the request.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.params.extend(params);
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Marks the call as one that may run concurrently with others on the
    /// same client.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }
}
