//! Wire models for the ButterCMS posts API.
//!
//! These structs mirror the JSON returned by `GET /v2/posts/`:
//! - [`PostPage`]: one page of results plus pagination metadata
//! - [`RawPost`]: a single post exactly as the API describes it
//! - [`RawAuthor`], [`RawCategory`]: nested objects of a post
//!
//! Decoding is lenient about absent keys. A page without `data` is an empty
//! page, a post without `categories` has no categories, and so on. Whether an
//! absent field is acceptable is decided later by the mapper.

use serde::{Deserialize, Serialize};

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    /// Any state this crate does not know about (e.g. `scheduled`).
    #[serde(other)]
    Other,
}

/// Author object nested in a post. Only the first name is used.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAuthor {
    #[serde(default)]
    pub first_name: String,
}

/// Category object nested in a post.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawCategory {
    pub name: String,
}

/// A post as returned by the API, prior to mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPost {
    #[serde(default)]
    pub slug: Option<String>,
    pub status: PostStatus,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, alias = "published_at")]
    pub published: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created: Option<String>,
    #[serde(default)]
    pub author: Option<RawAuthor>,
    #[serde(default)]
    pub categories: Option<Vec<RawCategory>>,
}

impl RawPost {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// The timestamp to date the article by: `published`, else `created`.
    pub fn timestamp(&self) -> Option<&str> {
        self.published
            .as_deref()
            .or(self.created.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// Name of the first category, if the post has any.
    pub fn first_category(&self) -> Option<&str> {
        self.categories
            .as_ref()
            .and_then(|cats| cats.first())
            .map(|cat| cat.name.as_str())
    }

    /// The post's own slug, ignoring empty strings.
    pub fn explicit_slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|s| !s.is_empty())
    }
}

/// Pagination block of a page response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PageMeta {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next_page: Option<u64>,
}

/// One page of the posts listing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostPage {
    #[serde(default)]
    pub data: Vec<RawPost>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl PostPage {
    /// `true` when the API reports another page after this one.
    pub fn has_next_page(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|meta| meta.next_page)
            .is_some_and(|next| next > 0)
    }
}
