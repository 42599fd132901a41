//! Page writer.
//!
//! [`Writer::write_file`] renders a [`Template`] and stores it under a path
//! relative to the output directory. Two options control each write:
//!
//! - `relative_urls`: links are rooted at the page's own depth (`.`, `..`,
//!   `../..`) instead of `site_url`
//! - `override_output`: a page may replace one already written in this run;
//!   without it the second write is skipped with a warning

use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::outputs::pages::Template;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub relative_urls: bool,
    pub override_output: bool,
}

/// Destination for rendered pages.
pub trait Writer {
    async fn write_file(
        &mut self,
        name: &str,
        template: &Template<'_>,
        options: WriteOptions,
    ) -> Result<()>;
}

/// Link root for a page saved at `name`, relative to the output directory.
pub fn relative_root(name: &str) -> String {
    let depth = name.trim_start_matches('/').matches('/').count();
    if depth == 0 {
        ".".to_string()
    } else {
        vec![".."; depth].join("/")
    }
}

/// Writes pages below `settings.output_path`.
#[derive(Debug)]
pub struct FsWriter {
    settings: Settings,
    written: HashSet<PathBuf>,
}

impl FsWriter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            written: HashSet::new(),
        }
    }

    /// Number of distinct files written so far.
    pub fn written(&self) -> usize {
        self.written.len()
    }
}

impl Writer for FsWriter {
    #[instrument(level = "debug", skip(self, template))]
    async fn write_file(
        &mut self,
        name: &str,
        template: &Template<'_>,
        options: WriteOptions,
    ) -> Result<()> {
        let path = self.settings.output_path.join(name.trim_start_matches('/'));
        if self.written.contains(&path) {
            if !options.override_output {
                warn!(
                    path = %path.display(),
                    "Refusing to overwrite a page written earlier in this build"
                );
                return Ok(());
            }
            debug!(path = %path.display(), "Overwriting page");
        }

        let site_url = if options.relative_urls {
            relative_root(name)
        } else {
            self.settings.site_url.trim_end_matches('/').to_string()
        };
        let body = template.render(&site_url, &self.settings)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, body).await?;
        info!(path = %path.display(), "Wrote page");
        self.written.insert(path);
        Ok(())
    }
}
