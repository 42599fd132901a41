//! The article document model and metadata normalization.
//!
//! - [`Article`]: the canonical content unit handed to the output stage
//! - [`Taxon`]: a category, author or tag reference with a URL slug
//! - [`MetadataNormalizer`]: turns raw category/author strings into taxa so
//!   every source of articles shares one identity rule
//!
//! Taxa compare, hash and sort by slug. "Rust Lang" and "rust-lang" are the
//! same category.

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::settings::Settings;
use crate::utils::summarize;

/// A named grouping (category, author or tag) and its URL slug.
#[derive(Debug, Clone, Serialize)]
pub struct Taxon {
    pub name: String,
    pub slug: String,
}

pub type Category = Taxon;
pub type Author = Taxon;
pub type Tag = Taxon;

impl Taxon {
    /// Substitute `{slug}` into a URL or save-as pattern.
    pub fn url(&self, pattern: &str) -> String {
        pattern.replace("{slug}", &self.slug)
    }
}

impl PartialEq for Taxon {
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}

impl Eq for Taxon {}

impl Hash for Taxon {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state);
    }
}

impl PartialOrd for Taxon {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Taxon {
    fn cmp(&self, other: &Self) -> Ordering {
        self.slug.cmp(&other.slug)
    }
}

/// Which metadata field a value is being normalized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Category,
    Author,
}

/// Shared normalization for category and author metadata.
///
/// Names are trimmed; slugs come from the name after the field's regex
/// substitutions are applied.
#[derive(Debug, Default)]
pub struct MetadataNormalizer {
    category_substitutions: Vec<(Regex, String)>,
    author_substitutions: Vec<(Regex, String)>,
}

impl MetadataNormalizer {
    /// Compile the substitution tables from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            category_substitutions: compile(&settings.category_regex_substitutions)?,
            author_substitutions: compile(&settings.author_regex_substitutions)?,
        })
    }

    pub fn process_metadata(&self, field: MetadataField, value: &str) -> Taxon {
        let name = value.trim().to_string();
        let substitutions = match field {
            MetadataField::Category => &self.category_substitutions,
            MetadataField::Author => &self.author_substitutions,
        };
        let mut slug_source = name.clone();
        for (pattern, replacement) in substitutions {
            slug_source = pattern
                .replace_all(&slug_source, replacement.as_str())
                .into_owned();
        }
        Taxon {
            slug: slug::slugify(&slug_source),
            name,
        }
    }
}

fn compile(pairs: &[(String, String)]) -> Result<Vec<(Regex, String)>> {
    pairs
        .iter()
        .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, replacement.clone())))
        .collect()
}

/// Metadata an article is built from, before defaults are derived.
#[derive(Debug, Clone)]
pub struct ArticleMetadata {
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub category: Category,
    /// Left `None` so the slug is derived from the title.
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub lang: Option<String>,
}

/// A content document ready for aggregation and rendering.
///
/// `authors` is never empty and `author` is always `authors[0]`.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub date: DateTime<FixedOffset>,
    pub category: Category,
    pub authors: Vec<Author>,
    /// Primary author, for pages that show a single byline.
    pub author: Author,
    pub tags: Vec<Tag>,
    pub slug: String,
    pub lang: String,
    pub url: String,
}

impl Article {
    /// Build an article, deriving the slug, summary, language and URL that
    /// the metadata leaves open.
    pub fn new(
        content: String,
        metadata: ArticleMetadata,
        author: Author,
        settings: &Settings,
    ) -> Self {
        let slug = metadata
            .slug
            .unwrap_or_else(|| slug::slugify(&metadata.title));
        let summary = metadata
            .summary
            .unwrap_or_else(|| summarize(&content, settings.summary_max_length));
        let lang = metadata
            .lang
            .unwrap_or_else(|| settings.default_lang.clone());
        let url = settings.article_url.replace("{slug}", &slug);

        Self {
            title: metadata.title,
            content,
            summary,
            date: metadata.date,
            category: metadata.category,
            authors: vec![author.clone()],
            author,
            tags: Vec::new(),
            slug,
            lang,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_date;

    fn normalizer() -> MetadataNormalizer {
        MetadataNormalizer::default()
    }

    fn metadata(title: &str, slug: Option<&str>) -> ArticleMetadata {
        ArticleMetadata {
            title: title.to_string(),
            date: parse_date("2020-01-01").unwrap(),
            category: normalizer().process_metadata(MetadataField::Category, "News"),
            slug: slug.map(String::from),
            summary: None,
            lang: None,
        }
    }

    #[test]
    fn test_process_metadata_slugifies_and_trims() {
        let taxon = normalizer().process_metadata(MetadataField::Category, "  Rust Lang ");
        assert_eq!(taxon.name, "Rust Lang");
        assert_eq!(taxon.slug, "rust-lang");
    }

    #[test]
    fn test_taxon_identity_is_by_slug() {
        let n = normalizer();
        let a = n.process_metadata(MetadataField::Category, "Rust Lang");
        let b = n.process_metadata(MetadataField::Category, "rust-lang");
        assert_eq!(a, b);
        assert!(
            n.process_metadata(MetadataField::Author, "alice")
                < n.process_metadata(MetadataField::Author, "Bob")
        );
    }

    #[test]
    fn test_authors_and_categories_share_rules() {
        let n = normalizer();
        let author = n.process_metadata(MetadataField::Author, "Zoë");
        let category = n.process_metadata(MetadataField::Category, "Zoë");
        assert_eq!(author.slug, category.slug);
    }

    #[test]
    fn test_substitutions_apply_per_field() {
        let settings = Settings {
            category_regex_substitutions: vec![("C\\+\\+".to_string(), "cpp".to_string())],
            ..Settings::default()
        };
        let n = MetadataNormalizer::from_settings(&settings).unwrap();
        assert_eq!(n.process_metadata(MetadataField::Category, "C++").slug, "cpp");
        assert_eq!(n.process_metadata(MetadataField::Category, "C++").name, "C++");
        assert_eq!(n.process_metadata(MetadataField::Author, "C++").slug, "c");
    }

    #[test]
    fn test_invalid_substitution_pattern_is_an_error() {
        let settings = Settings {
            author_regex_substitutions: vec![("(".to_string(), "".to_string())],
            ..Settings::default()
        };
        assert!(MetadataNormalizer::from_settings(&settings).is_err());
    }

    #[test]
    fn test_article_new_sets_primary_author() {
        let settings = Settings::default();
        let author = normalizer().process_metadata(MetadataField::Author, "Ada");
        let article = Article::new(
            "<p>Body</p>".to_string(),
            metadata("Hello", None),
            author.clone(),
            &settings,
        );

        assert_eq!(article.authors, vec![author.clone()]);
        assert_eq!(article.author, author);
        assert!(article.tags.is_empty());
    }

    #[test]
    fn test_article_slug_derived_from_title_when_missing() {
        let settings = Settings::default();
        let author = normalizer().process_metadata(MetadataField::Author, "Ada");
        let article =
            Article::new(String::new(), metadata("Hello, World!", None), author, &settings);
        assert_eq!(article.slug, "hello-world");
        assert_eq!(article.url, "hello-world.html");
        assert_eq!(article.lang, "en");
    }

    #[test]
    fn test_article_keeps_explicit_slug() {
        let settings = Settings::default();
        let author = normalizer().process_metadata(MetadataField::Author, "Ada");
        let article = Article::new(
            String::new(),
            metadata("Hello", Some("custom-slug")),
            author,
            &settings,
        );
        assert_eq!(article.slug, "custom-slug");
    }

    #[test]
    fn test_article_summary_derived_from_body() {
        let settings = Settings {
            summary_max_length: 2,
            ..Settings::default()
        };
        let author = normalizer().process_metadata(MetadataField::Author, "Ada");
        let article = Article::new(
            "<p>alpha beta gamma</p>".to_string(),
            metadata("Hello", None),
            author,
            &settings,
        );
        assert_eq!(article.summary, "alpha beta …");
    }
}
