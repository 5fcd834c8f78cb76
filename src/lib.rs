//! # briskcdn - a typed client core for the Brisk CDN control-plane API
//!
//! briskcdn wraps the Brisk CDN REST control plane (service configuration,
//! logging endpoints, purge, stats) in a typed, async client built on top of
//! `reqwest`. It provides the generic request/decode/paginate operations the
//! per-resource endpoint functions are written against: pluggable body
//! encodings (URL-form, JSON, JSON:API), a structured error taxonomy for the
//! vendor's two error formats, rate-limit observation, and Link-header
//! pagination.
//!
//! ## Quick Start
//!
//! ```no_run
//! use briskcdn::{Body, Client};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct CreateAcl {
//!     name: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct Acl {
//!     id: String,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), briskcdn::Error> {
//!     // Reads the API key from BRISK_API_KEY.
//!     let client = Client::from_env()?;
//!
//!     // Create an ACL with a form-encoded body.
//!     let acl: briskcdn::Response<Acl> = client
//!         .post(
//!             "/service/abc123/version/2/acl",
//!             Body::form(&CreateAcl { name: "office".to_string() })?,
//!         )
//!         .await?;
//!     println!("Created ACL {}", acl.data.id);
//!
//!     // Fetch it back.
//!     let fetched = client
//!         .get::<Acl>("/service/abc123/version/2/acl/office")
//!         .await?;
//!     println!("ACL: {}", fetched.data.name);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every call resolves to either a fully decoded [`Response`] or a single
//! concrete [`Error`] to branch on. Non-success responses are parsed into a
//! structured [`ApiError`] whatever the vendor's error format, and the
//! not-found case has a dedicated predicate since callers use it constantly:
//!
//! ```no_run
//! use briskcdn::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::from_env()?;
//! match client.get::<serde_json::Value>("/service/abc123").await {
//!     Ok(response) => println!("{:?}", response.data),
//!     Err(e) if e.is_not_found() => println!("service does not exist"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pagination
//!
//! List endpoints paginate through the `Link` response header. The
//! [`Paginator`] drives that protocol for any element type:
//!
//! ```no_run
//! use briskcdn::{Client, ListOptions};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Service { id: String }
//!
//! # async fn example() -> Result<(), briskcdn::Error> {
//! # let client = Client::from_env()?;
//! let mut pages = client.paginate::<Service>("/service", ListOptions::default());
//! while pages.has_next() {
//!     let batch = pages.get_next().await?;
//!     println!("fetched {} services", batch.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Dispatch model
//!
//! The client performs exactly one HTTP round-trip per call: no retries, no
//! backoff, no internal queues. Transport failures, non-success statuses,
//! and decode failures all surface immediately as distinct [`Error`]
//! variants, and rate-limit headers are recorded on every response for
//! callers that meter themselves via [`Client::rate_limit`].

mod client;
pub mod decode;
pub mod encode;
mod error;
mod options;
mod paginate;
pub mod rate_limit;
mod response;

pub use client::{
    Client, ClientBuilder, API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_REALTIME_ENDPOINT,
};
pub use decode::Timestamp;
pub use encode::CompatBool;
pub use error::{ApiError, Error, ErrorDetail, Result};
pub use options::{Body, RequestOptions};
pub use paginate::{Direction, ListOptions, Paginator, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use rate_limit::RateLimit;
pub use response::Response;
