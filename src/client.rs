//! HTTP client for the Brisk CDN control-plane API.
//!
//! The [`Client`] type is the main entry point. It owns the base address,
//! the API key, and the underlying transport, and exposes the generic
//! request/decode operations the per-resource endpoint functions build on.

use crate::{
    decode, encode,
    error::{is_success, ApiError, JSON_API_MEDIA_TYPE},
    options::RequestOptions,
    rate_limit::RateLimit,
    Error, Response, Result,
};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use url::Url;

/// Default address of the control-plane API.
pub const DEFAULT_ENDPOINT: &str = "https://api.briskcdn.com";

/// Default address of the real-time stats API.
pub const DEFAULT_REALTIME_ENDPOINT: &str = "https://rt.briskcdn.com";

/// Environment variable [`Client::from_env`] reads the API key from.
pub const API_KEY_ENV: &str = "BRISK_API_KEY";

/// Request header carrying the API key.
const API_KEY_HEADER: &str = "brisk-key";

const DEFAULT_USER_AGENT: &str = concat!("briskcdn-rs/", env!("CARGO_PKG_VERSION"));

/// A client for the Brisk CDN control-plane API.
///
/// The client is designed to be reused across many calls: it maintains a
/// connection pool, and cloning it is cheap (the configuration and transport
/// are shared). The base address and transport are read-only after
/// construction; the rate-limit snapshot is the only shared mutable state
/// and is lock-guarded.
///
/// # Examples
///
/// ```no_run
/// use briskcdn::{Body, Client};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct CreateAcl {
///     name: String,
/// }
///
/// #[derive(Deserialize)]
/// struct Acl {
///     id: String,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), briskcdn::Error> {
/// let client = Client::from_env()?;
///
/// let acl: briskcdn::Response<Acl> = client
///     .post(
///         "/service/abc123/version/2/acl",
///         Body::form(&CreateAcl { name: "office".to_string() })?,
///     )
///     .await?;
/// println!("Created ACL {}", acl.data.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    rate_limit: RwLock<RateLimit>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client for the production endpoint with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Client> {
        Self::builder().api_key(api_key).build()
    }

    /// Creates a client for the real-time stats endpoint with the given API
    /// key.
    pub fn for_realtime_stats(api_key: impl Into<String>) -> Result<Client> {
        Self::builder()
            .base_url(DEFAULT_REALTIME_ENDPOINT)?
            .api_key(api_key)
            .build()
    }

    /// Creates a client for the production endpoint, reading the API key
    /// from the `BRISK_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the variable is unset.
    pub fn from_env() -> Result<Client> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::Configuration(format!("{API_KEY_ENV} is not set")))?;
        Self::new(api_key)
    }

    /// Issues a request and decodes the response body directly into `T`.
    ///
    /// This is the generic dispatch operation the per-resource endpoint
    /// functions consume: it builds the request, sends it, records
    /// rate-limit headers, classifies the status code, and decodes the body.
    /// Nothing is retried; every failure returns to the caller immediately.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use briskcdn::{Client, RequestOptions};
    /// use http::Method;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Acl { id: String, name: String }
    ///
    /// # async fn example() -> Result<(), briskcdn::Error> {
    /// let client = Client::from_env()?;
    /// let options = RequestOptions::new().with_query_param("filter[name]", "office");
    /// let acls = client
    ///     .request::<Vec<Acl>>(Method::GET, "/service/abc123/version/2/acl", options)
    ///     .await?;
    /// println!("{} ACLs", acls.data.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn request<T>(
        &self,
        method: Method,
        path: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let (raw, status, headers, latency) = self
            .dispatch(method, path.as_ref(), options, encode::JSON_MEDIA_TYPE)
            .await?;
        decode_response(decode::from_body(&raw), raw, status, headers, latency)
    }

    /// Issues a request whose response wraps the payload inside a named
    /// top-level key, e.g. `{"data": {...}}`.
    pub async fn request_wrapped<T>(
        &self,
        method: Method,
        path: impl AsRef<str>,
        key: &str,
        options: RequestOptions,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let (raw, status, headers, latency) = self
            .dispatch(method, path.as_ref(), options, encode::JSON_MEDIA_TYPE)
            .await?;
        decode_response(decode::from_wrapped(&raw, key), raw, status, headers, latency)
    }

    /// Issues a request against a JSON:API endpoint, decoding the document's
    /// resource attributes (with its `id` merged in) into `T`.
    pub async fn request_json_api<T>(
        &self,
        method: Method,
        path: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let (raw, status, headers, latency) = self
            .dispatch(method, path.as_ref(), options, JSON_API_MEDIA_TYPE)
            .await?;
        decode_response(decode::from_json_api(&raw), raw, status, headers, latency)
    }

    /// One round-trip: build, send, observe rate-limit headers, classify.
    /// Success bodies come back untouched for the decode step.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
        accept: &'static str,
    ) -> Result<(String, StatusCode, HeaderMap, Duration)> {
        let url = self.build_url(path, &options);

        tracing::debug!(
            method = %method,
            url = %url,
            parallel = options.parallel,
            "dispatching request"
        );

        let mut request = self.inner.http_client.request(method, url);

        for (name, value) in &self.inner.default_headers {
            request = request.header(name, value);
        }
        request = request.header(http::header::ACCEPT, accept);
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = options.body {
            request = request.header(http::header::CONTENT_TYPE, body.content_type());
            request = request.body(body.into_bytes());
        }

        let started = Instant::now();
        let response = request.send().await?;
        let latency = started.elapsed();

        let status = response.status();
        let headers = response.headers().clone();

        // Observed on success and failure alike.
        self.observe_rate_limit(&headers);

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            "received response"
        );

        if !is_success(status) {
            let raw = response.text().await.unwrap_or_default();
            let content_type = headers
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let api_error = ApiError::from_body(status, content_type, raw);
            tracing::warn!(status = status.as_u16(), error = %api_error, "request failed");
            return Err(Error::Http(api_error));
        }

        let raw = response.text().await?;
        Ok((raw, status, headers, latency))
    }

    /// Joins a caller-supplied path to the base address.
    ///
    /// The path may arrive percent-escaped by callers performing their own
    /// path-segment escaping; setting it wholesale keeps those escapes
    /// intact and avoids a doubled leading slash. Query parameters are
    /// appended afterwards without disturbing the path.
    fn build_url(&self, path: &str, options: &RequestOptions) -> Url {
        let mut url = self.inner.base_url.clone();
        url.set_path(path);
        if !options.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &options.params {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    fn observe_rate_limit(&self, headers: &HeaderMap) {
        // A poisoned lock still holds a usable snapshot.
        let mut snapshot = self
            .inner
            .rate_limit
            .write()
            .unwrap_or_else(|e| e.into_inner());
        snapshot.observe(headers);
    }

    /// Returns the most recently observed rate-limit snapshot.
    ///
    /// Updated after every dispatched request whose response carries
    /// rate-limit headers; see [`RateLimit`].
    pub fn rate_limit(&self) -> RateLimit {
        self.inner
            .rate_limit
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Makes a GET request to the specified path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use briskcdn::Client;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Service { name: String }
    ///
    /// # async fn example() -> Result<(), briskcdn::Error> {
    /// let client = Client::from_env()?;
    /// let service = client.get::<Service>("/service/abc123").await?;
    /// println!("Service: {}", service.data.name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<T>(&self, path: impl AsRef<str>) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, RequestOptions::new()).await
    }

    /// Makes a HEAD request to the specified path.
    pub async fn head(&self, path: impl AsRef<str>) -> Result<Response<()>> {
        self.request(Method::HEAD, path, RequestOptions::new())
            .await
    }

    /// Makes a DELETE request to the specified path.
    pub async fn delete<T>(&self, path: impl AsRef<str>) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::DELETE, path, RequestOptions::new())
            .await
    }

    /// Makes a POST request to the specified path with the given body.
    pub async fn post<T>(&self, path: impl AsRef<str>, body: crate::Body) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, RequestOptions::new().with_body(body))
            .await
    }

    /// Makes a PUT request to the specified path with the given body.
    pub async fn put<T>(&self, path: impl AsRef<str>, body: crate::Body) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, RequestOptions::new().with_body(body))
            .await
    }

    /// Makes a PATCH request to the specified path with the given body.
    pub async fn patch<T>(&self, path: impl AsRef<str>, body: crate::Body) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, RequestOptions::new().with_body(body))
            .await
    }
}

fn decode_response<T>(
    decoded: std::result::Result<T, serde_json::Error>,
    raw: String,
    status: StatusCode,
    headers: HeaderMap,
    latency: Duration,
) -> Result<Response<T>> {
    match decoded {
        Ok(data) => Ok(Response::new(data, raw, status, headers, latency)),
        Err(e) => {
            tracing::error!(
                error = %e,
                raw_response = %raw,
                "failed to decode response"
            );
            Err(Error::Decode {
                raw_response: raw,
                serde_error: e.to_string(),
                status,
            })
        }
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use briskcdn::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), briskcdn::Error> {
/// let client = ClientBuilder::new()
///     .api_key("secret")
///     .timeout(Duration::from_secs(30))
///     .default_header("Brisk-Debug", "1")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: String,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: HeaderMap::new(),
            timeout: None,
            http_client: None,
        }
    }

    /// Sets the base address for all requests. Defaults to
    /// [`DEFAULT_ENDPOINT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not parse as an absolute URL.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the API key sent with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the library's User-Agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a default header included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the per-request timeout.
    ///
    /// Timeouts surface as transport errors; the client applies no timeout
    /// policy of its own beyond handing this to the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Injects a pre-configured transport, replacing the default one.
    pub fn http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the transport cannot be constructed
    /// or the API key is not a valid header value.
    pub fn build(self) -> Result<Client> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_ENDPOINT)?,
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::Configuration(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        let mut default_headers = self.default_headers;
        let user_agent = HeaderValue::try_from(self.user_agent)
            .map_err(|e| Error::Configuration(format!("Invalid User-Agent: {}", e)))?;
        default_headers.insert(http::header::USER_AGENT, user_agent);

        if let Some(api_key) = self.api_key {
            let mut value = HeaderValue::try_from(api_key)
                .map_err(|_| Error::Configuration("Invalid API key".to_string()))?;
            value.set_sensitive(true);
            default_headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers,
                timeout: self.timeout,
                rate_limit: RwLock::new(RateLimit::default()),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Client {
        Client::builder().api_key("secret").build().unwrap()
    }

    #[test]
    fn build_url_keeps_caller_escapes_and_single_leading_slash() {
        let client = test_client();
        let url = client.build_url("/service/myservice/purge/a%2Fb", &RequestOptions::new());

        let path = url.path();
        assert_eq!(path.matches("a%2Fb").count(), 1);
        assert!(!path.contains("//"));
        assert_eq!(path, "/service/myservice/purge/a%2Fb");
    }

    #[test]
    fn build_url_adds_missing_leading_slash() {
        let client = test_client();
        let url = client.build_url("service/abc", &RequestOptions::new());
        assert_eq!(url.path(), "/service/abc");
    }

    #[test]
    fn build_url_appends_query_without_disturbing_path() {
        let client = test_client();
        let options = RequestOptions::new()
            .with_query_param("page", "2")
            .with_query_param("filter[name]", "a b");
        let url = client.build_url("/service/a%2Fb/acl", &options);

        assert_eq!(url.path(), "/service/a%2Fb/acl");
        assert_eq!(url.query(), Some("page=2&filter%5Bname%5D=a+b"));
    }

    #[test]
    fn invalid_base_url_is_rejected_before_any_request() {
        assert!(matches!(
            Client::builder().base_url("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }
}
