//! ButterCMS posts API access and pagination.
//!
//! # Architecture
//!
//! - [`PostSource`]: async trait for fetching a single page of posts
//! - [`ButterClient`]: the HTTP implementation backed by `reqwest`
//! - [`fetch_all_posts`]: walks pages sequentially until the source reports
//!   no further page
//!
//! There is no retry, backoff or timeout. The first transport or status
//! error ends the build.

use reqwest::Client;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::Result;
use crate::models::{PostPage, RawPost};
use crate::settings::ButterConfig;

/// A paginated source of raw posts.
pub trait PostSource {
    /// Fetch page `page` (1-based) holding at most `page_size` posts.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<PostPage>;
}

/// HTTP client for the ButterCMS `posts` endpoint.
pub struct ButterClient {
    http: Client,
    posts_url: Url,
    api_key: String,
}

impl ButterClient {
    /// Build a client rooted at `base_url` (e.g. `https://api.buttercms.com/v2/`).
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let posts_url = Url::parse(&base)?.join("posts/")?;
        Ok(Self {
            http: Client::new(),
            posts_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &ButterConfig) -> Result<Self> {
        Self::new(&config.base_url, config.api_key.clone())
    }
}

impl fmt::Debug for ButterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButterClient")
            .field("posts_url", &self.posts_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PostSource for ButterClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<PostPage> {
        let t0 = Instant::now();
        let page_param = page.to_string();
        let size_param = page_size.to_string();
        let body = self
            .http
            .get(self.posts_url.clone())
            .query(&[
                ("auth_token", self.api_key.as_str()),
                ("page", page_param.as_str()),
                ("page_size", size_param.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let page_data: PostPage = serde_json::from_str(&body)?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = body.len(),
            posts = page_data.data.len(),
            "Fetched posts page"
        );
        Ok(page_data)
    }
}

/// Fetch every post the source offers, in source order.
///
/// Starts at page 1 and advances while the response carries a next-page
/// indicator. A page without `data` contributes nothing but does not stop
/// the walk.
#[instrument(level = "info", skip(source))]
pub async fn fetch_all_posts<S: PostSource>(source: &S, page_size: u32) -> Result<Vec<RawPost>> {
    let t0 = Instant::now();
    let mut posts = Vec::new();
    let mut page = 1;

    loop {
        let response = source.fetch_page(page, page_size).await?;
        let has_next = response.has_next_page();
        let reported = response.meta.as_ref().and_then(|meta| meta.count);
        debug!(page, count = response.data.len(), ?reported, has_next, "Accumulating page");
        posts.extend(response.data);

        if !has_next {
            break;
        }
        page += 1;
    }

    info!(
        total = posts.len(),
        pages = page,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Fetched all posts"
    );
    Ok(posts)
}
