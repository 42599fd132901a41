//! ButterCMS post source.
//!
//! Fetches every post through [`fetch_all_posts`] and maps the published ones
//! to articles:
//!
//! - date: `published`, falling back to `created`
//! - category: first category's name, else the `default_category` setting
//! - author: the author's first name
//! - slug: the post's slug when set, otherwise derived from the title
//!
//! Category and author both go through [`MetadataNormalizer::process_metadata`].

use tracing::{debug, info, instrument};

use crate::api::{ButterClient, PostSource, fetch_all_posts};
use crate::content::{Article, ArticleMetadata, MetadataField, MetadataNormalizer};
use crate::error::{Error, Result};
use crate::generator::{ArticlesProvider, Generators};
use crate::models::RawPost;
use crate::settings::Settings;
use crate::sources::ArticleSource;
use crate::utils::{parse_date, truncate_for_log};

/// Maps ButterCMS posts from any [`PostSource`] into articles.
#[derive(Debug)]
pub struct ButterSource<S> {
    client: S,
    settings: Settings,
    normalizer: MetadataNormalizer,
}

impl<S: PostSource> ButterSource<S> {
    pub fn new(client: S, settings: &Settings) -> Result<Self> {
        Ok(Self {
            client,
            settings: settings.clone(),
            normalizer: MetadataNormalizer::from_settings(settings)?,
        })
    }
}

impl<S: PostSource> ArticleSource for ButterSource<S> {
    type Record = RawPost;

    async fn fetch_records(&self) -> Result<Vec<RawPost>> {
        fetch_all_posts(&self.client, self.settings.butter_config.page_size).await
    }

    #[instrument(level = "debug", skip_all, fields(title = %post.title))]
    fn to_article(&self, post: &RawPost) -> Result<Option<Article>> {
        if !post.is_published() {
            debug!(status = ?post.status, "Skipping unpublished post");
            return Ok(None);
        }

        let timestamp = post.timestamp().ok_or_else(|| Error::MissingDate {
            title: post.title.clone(),
        })?;
        let date = parse_date(timestamp)?;

        let first_name = post
            .author
            .as_ref()
            .map(|author| author.first_name.as_str())
            .ok_or_else(|| Error::MissingAuthor {
                title: post.title.clone(),
            })?;
        let author = self
            .normalizer
            .process_metadata(MetadataField::Author, first_name);

        let category_name = post
            .first_category()
            .unwrap_or(self.settings.default_category.as_str());
        let category = self
            .normalizer
            .process_metadata(MetadataField::Category, category_name);

        let metadata = ArticleMetadata {
            title: post.title.clone(),
            date,
            category,
            slug: post.explicit_slug().map(String::from),
            summary: post.summary.clone().filter(|s| !s.trim().is_empty()),
            lang: None,
        };
        info!(
            slug = ?metadata.slug,
            category = %metadata.category.name,
            author = %author.name,
            body = %truncate_for_log(&post.body, 80),
            "Mapped post to article"
        );

        Ok(Some(Article::new(
            post.body.clone(),
            metadata,
            author,
            &self.settings,
        )))
    }
}

/// Install the ButterCMS source as the build's article provider.
///
/// Fails when no API key is configured.
pub fn register(generators: &mut Generators, settings: &Settings) -> Result<()> {
    if settings.butter_config.api_key.trim().is_empty() {
        return Err(Error::MissingSetting("butter_config.api_key"));
    }
    let client = ButterClient::from_config(&settings.butter_config)?;
    let source = ButterSource::new(client, settings)?;
    let replaced = generators.register_articles(ArticlesProvider::Butter(source));
    info!(replaced = replaced.name(), "Registered ButterCMS article provider");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::PagedSource;
    use crate::models::PostPage;
    use chrono::{Datelike, TimeZone, Utc};

    fn post(value: serde_json::Value) -> RawPost {
        serde_json::from_value(value).unwrap()
    }

    fn source() -> ButterSource<PagedSource> {
        ButterSource::new(PagedSource::new(Vec::new()), &Settings::default()).unwrap()
    }

    fn published(title: &str) -> serde_json::Value {
        serde_json::json!({
            "status": "published",
            "title": title,
            "body": "<p>Body text</p>",
            "published": "2020-02-01T10:00:00Z",
            "created": "2020-01-01T10:00:00Z",
            "author": {"first_name": "Ada", "last_name": "Lovelace"},
            "categories": [{"name": "Engineering"}, {"name": "Ignored"}],
            "slug": format!("{}-slug", title.to_lowercase())
        })
    }

    #[test]
    fn test_maps_published_post() {
        let article = source().to_article(&post(published("Hello"))).unwrap().unwrap();

        assert_eq!(article.title, "Hello");
        assert_eq!(article.content, "<p>Body text</p>");
        assert_eq!(article.date, Utc.with_ymd_and_hms(2020, 2, 1, 10, 0, 0).unwrap());
        assert_eq!(article.category.name, "Engineering");
        assert_eq!(article.category.slug, "engineering");
        assert_eq!(article.author.name, "Ada");
        assert_eq!(article.authors.len(), 1);
        assert_eq!(article.slug, "hello-slug");
        assert_eq!(article.summary, "Body text");
    }

    #[test]
    fn test_skips_unpublished_posts() {
        let src = source();
        for status in ["draft", "scheduled"] {
            let mut value = published("Draft");
            value["status"] = serde_json::json!(status);
            assert!(src.to_article(&post(value)).unwrap().is_none(), "{status}");
        }
    }

    #[test]
    fn test_empty_categories_use_default_category() {
        let settings = Settings {
            default_category: "General Notes".to_string(),
            ..Settings::default()
        };
        let src = ButterSource::new(PagedSource::new(Vec::new()), &settings).unwrap();

        let mut value = published("Lonely");
        value["categories"] = serde_json::json!([]);
        let article = src.to_article(&post(value)).unwrap().unwrap();
        assert_eq!(article.category.name, "General Notes");
        assert_eq!(article.category.slug, "general-notes");
    }

    #[test]
    fn test_missing_published_falls_back_to_created() {
        let mut value = published("Old");
        value.as_object_mut().unwrap().remove("published");
        let article = source().to_article(&post(value)).unwrap().unwrap();
        assert_eq!(article.date.month(), 1);
    }

    #[test]
    fn test_missing_slug_is_derived_from_title() {
        let mut value = published("A Fresh Start");
        value.as_object_mut().unwrap().remove("slug");
        let article = source().to_article(&post(value)).unwrap().unwrap();
        assert_eq!(article.slug, "a-fresh-start");
    }

    #[test]
    fn test_author_uses_first_name_only() {
        let mut value = published("Bylines");
        value["author"] = serde_json::json!({"first_name": "Grace", "last_name": "Hopper"});
        let article = source().to_article(&post(value)).unwrap().unwrap();
        assert_eq!(article.author.name, "Grace");
        assert_eq!(article.author.slug, "grace");
    }

    #[test]
    fn test_unparseable_date_is_fatal() {
        let mut value = published("Broken");
        value["published"] = serde_json::json!("not a date");
        let err = source().to_article(&post(value)).unwrap_err();
        assert!(matches!(err, Error::DateParse { .. }));
    }

    #[test]
    fn test_missing_author_is_an_error() {
        let mut value = published("Anonymous");
        value.as_object_mut().unwrap().remove("author");
        let err = source().to_article(&post(value)).unwrap_err();
        assert!(matches!(err, Error::MissingAuthor { .. }));
    }

    #[tokio::test]
    async fn test_fetch_articles_keeps_only_published() {
        let mut draft = published("Draft");
        draft["status"] = serde_json::json!("draft");
        let page: PostPage = serde_json::from_value(serde_json::json!({
            "data": [published("One"), draft, published("Two")],
            "meta": {"next_page": null}
        }))
        .unwrap();
        let src = ButterSource::new(PagedSource::new(vec![page]), &Settings::default()).unwrap();

        let articles = src.fetch_articles().await.unwrap();
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[tokio::test]
    async fn test_one_bad_date_fails_the_batch() {
        let mut bad = published("Bad");
        bad["published"] = serde_json::json!("31/31/2020");
        let page: PostPage = serde_json::from_value(serde_json::json!({
            "data": [published("Good"), bad],
        }))
        .unwrap();
        let src = ButterSource::new(PagedSource::new(vec![page]), &Settings::default()).unwrap();

        assert!(src.fetch_articles().await.is_err());
    }

    #[test]
    fn test_register_requires_api_key() {
        let mut generators = Generators::new(&Settings::default());
        let err = register(&mut generators, &Settings::default()).unwrap_err();
        assert!(matches!(err, Error::MissingSetting("butter_config.api_key")));
        assert_eq!(generators.articles_provider().name(), "context");
    }

    #[test]
    fn test_register_replaces_default_provider() {
        let mut settings = Settings::default();
        settings.butter_config.api_key = "token".to_string();
        let mut generators = Generators::new(&settings);

        register(&mut generators, &settings).unwrap();
        assert_eq!(generators.articles_provider().name(), "buttercms");
    }
}
