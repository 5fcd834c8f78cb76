//! Cursor-style pagination over list endpoints, driven by the `Link`
//! response header.
//!
//! List endpoints return RFC 5988 `Link` headers with `rel="next"` and
//! `rel="last"` relations, each carrying a `page` query parameter. The
//! [`Paginator`] tracks those page numbers and exposes a pull-based
//! has-more/get-next protocol parameterized over the decoded element type.

use crate::{options::RequestOptions, Client, Result};
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use url::Url;

/// Default number of results per page.
pub const DEFAULT_PER_PAGE: u64 = 100;

/// Largest page size the API accepts; larger requests are clamped.
pub const MAX_PER_PAGE: u64 = 100;

/// Sort order for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending order.
    Ascend,
    /// Descending order.
    Descend,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Ascend => "ascend",
            Direction::Descend => "descend",
        }
    }
}

/// Options for list endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Page to start from; defaults to 1.
    pub page: Option<u64>,
    /// Results per page; defaults to [`DEFAULT_PER_PAGE`], clamped to
    /// [`MAX_PER_PAGE`].
    pub per_page: Option<u64>,
    /// Field to sort by.
    pub sort: Option<String>,
    /// Sort order.
    pub direction: Option<Direction>,
}

/// A pull-based iterator over the pages of a list endpoint.
///
/// One paginator serves every resource type via its type parameter; the
/// page-advance state is owned by this instance alone, and `get_next` takes
/// `&mut self`, so a paginator cannot be shared between consumers.
///
/// # Examples
///
/// ```no_run
/// use briskcdn::{Client, ListOptions};
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
/// let mut pages = client.paginate::<Service>("/service", ListOptions::default());
///
/// while pages.has_next() {
///     for service in pages.get_next().await? {
///         println!("{}: {}", service.id, service.name);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Paginator<T> {
    client: Client,
    path: String,
    options: ListOptions,
    current_page: u64,
    last_page: u64,
    next_page: Option<u64>,
    consumed: bool,
    _element: PhantomData<fn() -> T>,
}

impl Client {
    /// Creates a paginator over a list endpoint.
    pub fn paginate<T>(&self, path: impl Into<String>, options: ListOptions) -> Paginator<T>
    where
        T: DeserializeOwned,
    {
        Paginator {
            client: self.clone(),
            path: path.into(),
            options,
            current_page: 0,
            last_page: 0,
            next_page: None,
            consumed: false,
            _element: PhantomData,
        }
    }
}

impl<T> Paginator<T>
where
    T: DeserializeOwned,
{
    /// Returns `true` if no request has been made yet, or if pages remain
    /// after the current one.
    pub fn has_next(&self) -> bool {
        !self.consumed || self.remaining() != 0
    }

    /// Returns the number of pages after the current one, or `0` before the
    /// first request.
    pub fn remaining(&self) -> u64 {
        self.last_page.saturating_sub(self.current_page)
    }

    /// Fetches the next batch of results.
    ///
    /// The first call requests the configured starting page (page 1 if none
    /// was set); each subsequent call advances by one. Page state only
    /// commits after the batch decodes, so a failed call leaves the
    /// paginator where it was and a retry re-requests the same page.
    pub async fn get_next(&mut self) -> Result<Vec<T>> {
        let page = if self.consumed {
            self.current_page + 1
        } else {
            self.options.page.unwrap_or(1)
        };
        let per_page = self
            .options
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .min(MAX_PER_PAGE);

        let mut options = RequestOptions::new()
            .with_query_param("page", page.to_string())
            .with_query_param("per_page", per_page.to_string());
        if let Some(sort) = &self.options.sort {
            options = options.with_query_param("sort", sort.clone());
        }
        if let Some(direction) = self.options.direction {
            options = options.with_query_param("direction", direction.as_str());
        }

        let response = self
            .client
            .request::<Vec<T>>(Method::GET, &self.path, options)
            .await?;

        let links = PageLinks::from_headers(&response.headers);
        self.consumed = true;
        self.current_page = page;
        self.next_page = links.next;
        // A response without a `last` relation is the final page; treating
        // it as "unknown" would report a fetched page as zero pages.
        self.last_page = links.last.unwrap_or(page);

        tracing::debug!(
            page = page,
            next_page = ?self.next_page,
            last_page = self.last_page,
            remaining = self.remaining(),
            "fetched page"
        );

        Ok(response.data)
    }
}

/// Page numbers extracted from a `Link` response header.
#[derive(Debug, Default, PartialEq, Eq)]
struct PageLinks {
    next: Option<u64>,
    last: Option<u64>,
}

impl PageLinks {
    fn from_headers(headers: &HeaderMap) -> Self {
        let mut links = PageLinks::default();
        for value in headers.get_all(http::header::LINK) {
            let Ok(value) = value.to_str() else { continue };
            for entry in value.split(',') {
                let Some((uri, rel)) = parse_link_entry(entry) else {
                    continue;
                };
                match rel {
                    "next" => links.next = page_of(&uri),
                    "last" => links.last = page_of(&uri),
                    _ => {}
                }
            }
        }
        links
    }
}

/// Splits one `<uri>; rel="name"` entry into its URI and relation name.
fn parse_link_entry(entry: &str) -> Option<(String, &str)> {
    let (uri_part, params) = entry.split_once(';')?;
    let uri = uri_part.trim().strip_prefix('<')?.strip_suffix('>')?;

    let rel = params.split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        (key.trim() == "rel").then(|| value.trim().trim_matches('"'))
    })?;

    Some((uri.to_string(), rel))
}

/// Extracts the integer `page` query parameter of a relation URI.
fn page_of(uri: &str) -> Option<u64> {
    let url = Url::parse(uri).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
