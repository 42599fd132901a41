//! Article sources.
//!
//! A source is two steps: fetch every raw record it offers, then map each
//! record to an [`Article`] or skip it. The aggregator only sees the
//! [`ArticleSource`] trait, so a new content backend is a new module here
//! and nothing else.
//!
//! | Source | Module | Records | Notes |
//! |--------|--------|---------|-------|
//! | ButterCMS | [`butter`] | [`RawPost`](crate::models::RawPost) | Paginated `posts` API, published posts only |

use crate::content::Article;
use crate::error::Result;

pub mod butter;

/// Fetch-and-map interface consumed by [`generate_context`](crate::generator::generate_context).
pub trait ArticleSource {
    /// The raw record type delivered by the backend.
    type Record;

    /// Fetch every record, in source order.
    async fn fetch_records(&self) -> Result<Vec<Self::Record>>;

    /// Map one record; `Ok(None)` skips it.
    fn to_article(&self, record: &Self::Record) -> Result<Option<Article>>;

    /// Fetch all records and map them, keeping source order.
    ///
    /// The first mapping error aborts the whole batch.
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let records = self.fetch_records().await?;
        let mut articles = Vec::with_capacity(records.len());
        for record in &records {
            if let Some(article) = self.to_article(record)? {
                articles.push(article);
            }
        }
        Ok(articles)
    }
}
