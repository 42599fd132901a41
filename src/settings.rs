//! Build settings loaded from a YAML file.
//!
//! Every key is optional; missing keys fall back to [`Settings::default`].
//! The only value without a usable default is `butter_config.api_key`,
//! which is checked when the ButterCMS source is registered.
//!
//! ```yaml
//! butter_config:
//!   api_key: "your-read-token"
//!   page_size: 10
//! default_category: misc
//! newest_first_archives: true
//! reverse_category_order: false
//! relative_urls: true
//! year_archive_save_as: "posts/%Y/index.md"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;

/// Connection block for the ButterCMS content API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ButterConfig {
    /// Read API token sent as `auth_token`.
    pub api_key: String,
    /// Number of posts requested per page.
    pub page_size: u32,
    /// API root; `posts/` is joined onto it.
    pub base_url: String,
}

impl Default for ButterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            page_size: 10,
            base_url: "https://api.buttercms.com/v2/".to_string(),
        }
    }
}

/// Site-wide settings consumed by the mapper, the aggregator and the page writer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub butter_config: ButterConfig,
    /// Category given to posts that carry no categories at all.
    pub default_category: String,
    pub default_lang: String,
    /// Sort the date index newest first.
    pub newest_first_archives: bool,
    /// Sort the category index in descending key order.
    pub reverse_category_order: bool,
    /// Emit links relative to each written page instead of `site_url`.
    pub relative_urls: bool,
    pub site_url: String,
    pub sitename: String,
    pub output_path: PathBuf,
    /// URL pattern for articles; `{slug}` is substituted.
    pub article_url: String,
    pub category_save_as: String,
    pub author_save_as: String,
    pub direct_templates: Vec<String>,
    /// strftime patterns; a period archive is only written when its pattern is set.
    pub year_archive_save_as: Option<String>,
    pub month_archive_save_as: Option<String>,
    pub day_archive_save_as: Option<String>,
    /// `(pattern, replacement)` pairs applied before a category is slugified.
    pub category_regex_substitutions: Vec<(String, String)>,
    pub author_regex_substitutions: Vec<(String, String)>,
    /// Word count of summaries derived from the post body.
    pub summary_max_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            butter_config: ButterConfig::default(),
            default_category: "misc".to_string(),
            default_lang: "en".to_string(),
            newest_first_archives: true,
            reverse_category_order: false,
            relative_urls: false,
            site_url: String::new(),
            sitename: "Butter Articles".to_string(),
            output_path: PathBuf::from("output"),
            article_url: "{slug}.html".to_string(),
            category_save_as: "category/{slug}.md".to_string(),
            author_save_as: "author/{slug}.md".to_string(),
            direct_templates: ["index", "categories", "authors", "archives"]
                .into_iter()
                .map(String::from)
                .collect(),
            year_archive_save_as: None,
            month_archive_save_as: None,
            day_archive_save_as: None,
            category_regex_substitutions: Vec::new(),
            author_regex_substitutions: Vec::new(),
            summary_max_length: 50,
        }
    }
}

impl Settings {
    /// Parse settings from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read and parse a settings file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).await?;
        let settings = Self::from_yaml(&text)?;
        info!(
            default_category = %settings.default_category,
            newest_first = settings.newest_first_archives,
            relative_urls = settings.relative_urls,
            "Loaded settings"
        );
        Ok(settings)
    }
}
