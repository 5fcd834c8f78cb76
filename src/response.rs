//! Response wrapper that preserves both decoded data and raw response
//! details.
//!
//! The [`Response`] type wraps the decoded response data along with metadata
//! about the HTTP transaction, making it easy to access timing information,
//! headers, and the raw response body for debugging and observability.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A wrapper around a successful API response.
///
/// Provides both the decoded response data and metadata about the HTTP
/// transaction: latency, status code, headers, and the raw body exactly as
/// the server sent it.
///
/// # Examples
///
/// ```no_run
/// use briskcdn::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Service {
///     id: String,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), briskcdn::Error> {
/// let client = Client::from_env()?;
/// let response = client.get::<Service>("/service/abc123").await?;
///
/// println!("Service: {}", response.data.name);
/// println!("Request took {:?}", response.latency);
/// println!("Status: {}", response.status);
///
/// // Access raw response for debugging
/// if response.latency > std::time::Duration::from_secs(1) {
///     println!("Slow response body: {}", response.raw_body);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response data.
    pub data: T,

    /// The raw response body as a string.
    ///
    /// Success bodies pass through classification untouched, so this is the
    /// exact text the server sent; useful for the wrapped-map decode helpers
    /// and for logging.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The latency of the request, from dispatch to response receipt.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    ///
    /// This is typically called internally by the client after successfully
    /// decoding a response body.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Maps the response data to a different type using the provided
    /// function, preserving the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use briskcdn::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     42,
    ///     "42".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    /// );
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Returns a reference to a header value by name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use briskcdn::Response;
    /// # use http::{HeaderMap, StatusCode, HeaderValue};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new(
    ///     (),
    ///     String::new(),
    ///     StatusCode::OK,
    ///     headers,
    ///     Duration::from_millis(100),
    /// );
    ///
    /// assert_eq!(
    ///     response.header("content-type").unwrap(),
    ///     "application/json"
    /// );
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
