//! Aggregate pages: period archives, direct templates, category and author pages.
//!
//! Pages are Markdown. Each one lists articles as links built from the
//! article URL and the category/author save-as patterns, rooted at the
//! `site_url` the writer hands to [`Template::render`].
//!
//! Article pages themselves are never written here.
//!
//! # Output Structure
//!
//! ```text
//! output/
//! ├── index.md
//! ├── archives.md
//! ├── categories.md
//! ├── authors.md
//! ├── category/engineering.md
//! ├── author/ada.md
//! └── posts/2020/index.md      # only with year_archive_save_as
//! ```

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset};
use itertools::Itertools;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::content::{Article, Author, Category, Taxon};
use crate::error::{Error, Result};
use crate::generator::BuildContext;
use crate::outputs::writer::{WriteOptions, Writer};
use crate::settings::Settings;

/// A page and the data it renders.
#[derive(Debug)]
pub enum Template<'a> {
    Index { articles: &'a [Arc<Article>] },
    Archives { dates: &'a [Arc<Article>] },
    Categories { categories: &'a [(Category, Vec<Arc<Article>>)] },
    Authors { authors: &'a [(Author, Vec<Arc<Article>>)] },
    Category { category: &'a Category, dates: Vec<Arc<Article>> },
    Author { author: &'a Author, dates: Vec<Arc<Article>> },
    Period { title: String, dates: Vec<Arc<Article>> },
}

impl Template<'_> {
    /// Render to Markdown with links rooted at `site_url`.
    pub fn render(&self, site_url: &str, settings: &Settings) -> Result<String> {
        let mut md = String::new();
        match self {
            Template::Index { articles } => {
                writeln!(md, "# {}\n", settings.sitename)?;
                for article in articles.iter() {
                    write_summary(&mut md, article, site_url, settings)?;
                }
            }
            Template::Archives { dates } => {
                writeln!(md, "# Archives\n")?;
                for group in group_by_period(dates, Period::Year) {
                    let Some(first) = group.first() else {
                        continue;
                    };
                    writeln!(md, "## {}\n", first.date.year())?;
                    for article in &group {
                        write_entry(&mut md, article, site_url)?;
                    }
                    writeln!(md)?;
                }
            }
            Template::Categories { categories } => {
                writeln!(md, "# Categories\n")?;
                write_taxa(&mut md, categories, &settings.category_save_as, site_url)?;
            }
            Template::Authors { authors } => {
                writeln!(md, "# Authors\n")?;
                write_taxa(&mut md, authors, &settings.author_save_as, site_url)?;
            }
            Template::Category { category, dates } => {
                writeln!(md, "# Category: {}\n", category.name)?;
                for article in dates {
                    write_entry(&mut md, article, site_url)?;
                }
            }
            Template::Author { author, dates } => {
                writeln!(md, "# Articles by {}\n", author.name)?;
                for article in dates {
                    write_entry(&mut md, article, site_url)?;
                }
            }
            Template::Period { title, dates } => {
                writeln!(md, "# {title}\n")?;
                for article in dates {
                    write_entry(&mut md, article, site_url)?;
                }
            }
        }
        Ok(md)
    }
}

fn write_summary(
    md: &mut String,
    article: &Article,
    site_url: &str,
    settings: &Settings,
) -> Result<()> {
    writeln!(md, "## [{}]({}/{})\n", article.title, site_url, article.url)?;
    writeln!(
        md,
        "*{}* · [{}]({}/{}) · by [{}]({}/{})\n",
        article.date.format("%Y-%m-%d"),
        article.category.name,
        site_url,
        article.category.url(&settings.category_save_as),
        article.author.name,
        site_url,
        article.author.url(&settings.author_save_as),
    )?;
    if !article.summary.is_empty() {
        writeln!(md, "{}\n", article.summary)?;
    }
    Ok(())
}

fn write_entry(md: &mut String, article: &Article, site_url: &str) -> Result<()> {
    writeln!(
        md,
        "- {} [{}]({}/{})",
        article.date.format("%Y-%m-%d"),
        article.title,
        site_url,
        article.url
    )?;
    Ok(())
}

fn write_taxa(
    md: &mut String,
    taxa: &[(Taxon, Vec<Arc<Article>>)],
    pattern: &str,
    site_url: &str,
) -> Result<()> {
    for (taxon, articles) in taxa {
        writeln!(
            md,
            "- [{}]({}/{}) ({})",
            taxon.name,
            site_url,
            taxon.url(pattern),
            articles.len()
        )?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Year,
    Month,
    Day,
}

impl Period {
    fn key(self, date: &DateTime<FixedOffset>) -> (i32, u32, u32) {
        match self {
            Period::Year => (date.year(), 0, 0),
            Period::Month => (date.year(), date.month(), 0),
            Period::Day => (date.year(), date.month(), date.day()),
        }
    }

    fn title_format(self) -> &'static str {
        match self {
            Period::Year => "%Y",
            Period::Month => "%B %Y",
            Period::Day => "%B %-d, %Y",
        }
    }
}

fn check_pattern(pattern: &str) -> Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(Error::InvalidPattern(pattern.to_string()));
    }
    Ok(())
}

/// Split `dates` into one group per period, keeping date order.
///
/// Each article is keyed on its own local date, so a date list sorted by
/// instant may interleave periods when offsets differ.
fn group_by_period(dates: &[Arc<Article>], period: Period) -> Vec<Vec<Arc<Article>>> {
    let order: Vec<_> = dates.iter().map(|a| period.key(&a.date)).unique().collect();
    let mut groups = dates
        .iter()
        .cloned()
        .into_group_map_by(|a| period.key(&a.date));
    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect()
}

/// Articles of `bucket`, in the order of the date index.
fn in_date_order(dates: &[Arc<Article>], bucket: &[Arc<Article>]) -> Vec<Arc<Article>> {
    dates
        .iter()
        .filter(|a| bucket.iter().any(|b| Arc::ptr_eq(a, b)))
        .cloned()
        .collect()
}

async fn generate_period_archives<W: Writer>(
    context: &BuildContext,
    writer: &mut W,
    settings: &Settings,
    options: WriteOptions,
) -> Result<usize> {
    let periods = [
        (Period::Year, &settings.year_archive_save_as),
        (Period::Month, &settings.month_archive_save_as),
        (Period::Day, &settings.day_archive_save_as),
    ];

    let mut written = 0;
    for (period, pattern) in periods {
        let Some(pattern) = pattern else {
            continue;
        };
        check_pattern(pattern)?;

        for dates in group_by_period(&context.dates, period) {
            let Some(first) = dates.first() else {
                continue;
            };
            let name = first.date.format(pattern).to_string();
            let title = first.date.format(period.title_format()).to_string();
            writer
                .write_file(&name, &Template::Period { title, dates }, options)
                .await?;
            written += 1;
        }
    }
    Ok(written)
}

async fn generate_direct_templates<W: Writer>(
    context: &BuildContext,
    writer: &mut W,
    settings: &Settings,
    options: WriteOptions,
) -> Result<usize> {
    let mut written = 0;
    for name in &settings.direct_templates {
        let template = match name.as_str() {
            "index" => Template::Index {
                articles: &context.articles,
            },
            "archives" => Template::Archives {
                dates: &context.dates,
            },
            "categories" => Template::Categories {
                categories: &context.categories,
            },
            "authors" => Template::Authors {
                authors: &context.authors,
            },
            other => {
                warn!(template = %other, "Unknown direct template; skipping");
                continue;
            }
        };
        writer
            .write_file(&format!("{name}.md"), &template, options)
            .await?;
        written += 1;
    }
    Ok(written)
}

/// Write every aggregate page for `context`; returns how many were written.
///
/// Order: period archives, direct templates, categories, authors.
#[instrument(level = "info", skip_all)]
pub async fn generate_pages<W: Writer>(
    context: &BuildContext,
    writer: &mut W,
    settings: &Settings,
) -> Result<usize> {
    let options = WriteOptions {
        relative_urls: settings.relative_urls,
        override_output: true,
    };

    let mut written = generate_period_archives(context, writer, settings, options).await?;
    written += generate_direct_templates(context, writer, settings, options).await?;

    for (category, articles) in &context.categories {
        let dates = in_date_order(&context.dates, articles);
        writer
            .write_file(
                &category.url(&settings.category_save_as),
                &Template::Category { category, dates },
                options,
            )
            .await?;
        written += 1;
    }

    for (author, articles) in &context.authors {
        let dates = in_date_order(&context.dates, articles);
        writer
            .write_file(
                &author.url(&settings.author_save_as),
                &Template::Author { author, dates },
                options,
            )
            .await?;
        written += 1;
    }

    info!(pages = written, "Generated aggregate pages");
    Ok(written)
}
