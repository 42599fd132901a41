//! Translation resolution.
//!
//! Splits a flat list of articles into primary-language articles and the
//! language variants that link back to them. Articles are grouped by slug.
//! Within a group, every article in the site's default language is primary.
//! If a group has no default-language article, its first article is promoted
//! instead.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::content::Article;

/// A non-primary language variant of an article.
#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    /// Slug shared by every variant of the article.
    pub translation_id: String,
    pub lang: String,
    pub article: Arc<Article>,
}

/// Partitions articles into primaries and translations.
pub trait TranslationResolver {
    fn process_translations(
        &self,
        articles: Vec<Arc<Article>>,
    ) -> (Vec<Arc<Article>>, Vec<Translation>);
}

/// Resolver keyed on `Article::slug` and `Article::lang`.
#[derive(Debug, Clone)]
pub struct LangResolver {
    pub default_lang: String,
}

impl LangResolver {
    pub fn new(default_lang: impl Into<String>) -> Self {
        Self {
            default_lang: default_lang.into(),
        }
    }
}

impl TranslationResolver for LangResolver {
    fn process_translations(
        &self,
        articles: Vec<Arc<Article>>,
    ) -> (Vec<Arc<Article>>, Vec<Translation>) {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<Arc<Article>>> = HashMap::new();
        for article in articles {
            let group = groups.entry(article.slug.clone()).or_default();
            if group.is_empty() {
                order.push(article.slug.clone());
            }
            group.push(article);
        }

        let mut primaries = Vec::new();
        let mut translations = Vec::new();
        for slug in order {
            let Some(group) = groups.remove(&slug) else {
                continue;
            };

            let default_count = group.iter().filter(|a| a.lang == self.default_lang).count();
            if default_count > 1 {
                warn!(
                    %slug,
                    lang = %self.default_lang,
                    variants = default_count,
                    "Several articles share a slug and language"
                );
            }
            if default_count == 0 && group.len() > 1 {
                warn!(
                    %slug,
                    lang = %self.default_lang,
                    "No variant in the default language; promoting the first one"
                );
            }

            for (i, article) in group.into_iter().enumerate() {
                let primary = if default_count == 0 {
                    i == 0
                } else {
                    article.lang == self.default_lang
                };
                if primary {
                    primaries.push(article);
                } else {
                    translations.push(Translation {
                        translation_id: slug.clone(),
                        lang: article.lang.clone(),
                        article,
                    });
                }
            }
        }

        (primaries, translations)
    }
}
