//! Context merge and aggregation.
//!
//! [`generate_context`] pulls new articles from an [`ArticleSource`],
//! resolves translations, appends the result to the [`BuildContext`] and
//! rebuilds the category, author, tag and date views with [`aggregate`].
//!
//! [`Generators`] is the registry holding the active article provider. The
//! default provider only re-aggregates what the context already holds;
//! [`register`](crate::sources::butter::register) swaps in ButterCMS.

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::api::ButterClient;
use crate::content::{Article, Author, Category, Tag, Taxon};
use crate::error::Result;
use crate::settings::Settings;
use crate::sources::ArticleSource;
use crate::sources::butter::ButterSource;
use crate::translations::{LangResolver, Translation, TranslationResolver};

/// `(key, articles)` pairs in output order.
pub type Listing<K> = Vec<(K, Vec<Arc<Article>>)>;

/// Articles grouped by taxon, in the order keys were first seen.
#[derive(Debug, Default)]
pub struct Buckets {
    index: HashMap<Taxon, usize>,
    entries: Listing<Taxon>,
}

impl Buckets {
    pub fn push(&mut self, key: &Taxon, article: &Arc<Article>) {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.clone(), Vec::new()));
                self.index.insert(key.clone(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1.push(Arc::clone(article));
    }

    /// Buckets in discovery order.
    pub fn entries(&self) -> &[(Taxon, Vec<Arc<Article>>)] {
        &self.entries
    }

    /// Buckets sorted by key; article order inside each bucket is untouched.
    pub fn into_sorted(self, reverse: bool) -> Listing<Taxon> {
        let mut entries = self.entries;
        if reverse {
            entries.sort_by(|a, b| b.0.cmp(&a.0));
        } else {
            entries.sort_by(|a, b| a.0.cmp(&b.0));
        }
        entries
    }
}

/// The views derived from one article list.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub articles: Vec<Arc<Article>>,
    pub dates: Vec<Arc<Article>>,
    pub categories: Listing<Category>,
    pub authors: Listing<Author>,
    pub tags: Listing<Tag>,
}

/// Group and sort `articles`.
///
/// Pure: the same input always yields the same output.
pub fn aggregate(articles: &[Arc<Article>], settings: &Settings) -> Aggregation {
    let mut categories = Buckets::default();
    let mut authors = Buckets::default();
    let mut tags = Buckets::default();

    for article in articles {
        categories.push(&article.category, article);
        for tag in &article.tags {
            tags.push(tag, article);
        }
        for author in &article.authors {
            authors.push(author, article);
        }
    }

    debug!(
        discovered = ?categories.entries().iter().map(|(c, _)| c.slug.as_str()).collect::<Vec<_>>(),
        "Category discovery order"
    );

    // Stable sorts: equal dates keep their input order in both directions.
    let mut dates = articles.to_vec();
    if settings.newest_first_archives {
        dates.sort_by_key(|article| Reverse(article.date));
    } else {
        dates.sort_by_key(|article| article.date);
    }

    Aggregation {
        articles: dates.clone(),
        dates,
        categories: categories.into_sorted(settings.reverse_category_order),
        authors: authors.into_sorted(false),
        tags: tags.into_sorted(false),
    }
}

/// Everything the output stage renders from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildContext {
    pub articles: Vec<Arc<Article>>,
    pub translations: Vec<Translation>,
    pub dates: Vec<Arc<Article>>,
    pub categories: Listing<Category>,
    pub authors: Listing<Author>,
    pub tags: Listing<Tag>,
}

impl BuildContext {
    /// Overwrite the aggregated views with `aggregation`.
    pub fn publish(&mut self, aggregation: Aggregation) {
        self.articles = aggregation.articles;
        self.dates = aggregation.dates;
        self.categories = aggregation.categories;
        self.authors = aggregation.authors;
        self.tags = aggregation.tags;
    }
}

/// Merge the articles of `source` into `context` and re-aggregate.
///
/// Articles already in the context are kept as they are; new ones are
/// appended after translation resolution.
#[instrument(level = "info", skip_all)]
pub async fn generate_context<S, R>(
    source: &S,
    resolver: &R,
    settings: &Settings,
    mut context: BuildContext,
) -> Result<BuildContext>
where
    S: ArticleSource,
    R: TranslationResolver,
{
    let new_articles: Vec<Arc<Article>> = source
        .fetch_articles()
        .await?
        .into_iter()
        .map(Arc::new)
        .collect();
    let fetched = new_articles.len();

    let (articles, translations) = resolver.process_translations(new_articles);
    context.articles.extend(articles);
    context.translations.extend(translations);

    let aggregation = aggregate(&context.articles, settings);
    info!(
        fetched,
        articles = aggregation.articles.len(),
        translations = context.translations.len(),
        categories = aggregation.categories.len(),
        authors = aggregation.authors.len(),
        "Aggregated articles"
    );
    context.publish(aggregation);
    Ok(context)
}

/// Which component supplies articles to the build.
#[derive(Debug)]
pub enum ArticlesProvider {
    /// Use the articles already in the context.
    Context,
    Butter(ButterSource<ButterClient>),
}

impl ArticlesProvider {
    pub fn name(&self) -> &'static str {
        match self {
            ArticlesProvider::Context => "context",
            ArticlesProvider::Butter(_) => "buttercms",
        }
    }
}

/// Registry of the generators taking part in a build.
#[derive(Debug)]
pub struct Generators {
    articles: ArticlesProvider,
    resolver: LangResolver,
}

impl Generators {
    pub fn new(settings: &Settings) -> Self {
        Self {
            articles: ArticlesProvider::Context,
            resolver: LangResolver::new(settings.default_lang.clone()),
        }
    }

    /// Replace the article provider, returning the previous one.
    pub fn register_articles(&mut self, provider: ArticlesProvider) -> ArticlesProvider {
        std::mem::replace(&mut self.articles, provider)
    }

    pub fn articles_provider(&self) -> &ArticlesProvider {
        &self.articles
    }

    /// Run the registered article provider against `context`.
    pub async fn generate_context(
        &self,
        settings: &Settings,
        mut context: BuildContext,
    ) -> Result<BuildContext> {
        info!(provider = self.articles.name(), "Generating article context");
        match &self.articles {
            ArticlesProvider::Context => {
                let aggregation = aggregate(&context.articles, settings);
                context.publish(aggregation);
                Ok(context)
            }
            ArticlesProvider::Butter(source) => {
                generate_context(source, &self.resolver, settings, context).await
            }
        }
    }
}
