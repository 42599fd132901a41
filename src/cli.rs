//! Command-line interface definitions for Butter Articles.
//!
//! Flags override the values read from the settings file. The API key can
//! also come from the `BUTTER_API_KEY` environment variable.

use clap::Parser;
use std::path::PathBuf;

use crate::settings::Settings;

/// Command-line arguments for one build.
///
/// # Examples
///
/// ```sh
/// # Build with a settings file
/// butter_articles -s settings.yaml
///
/// # Override the output directory and dump the context as JSON
/// butter_articles -s settings.yaml -o ./public -j ./api
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML settings file
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Output directory for generated pages (overrides `output_path`)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// ButterCMS read token (overrides `butter_config.api_key`)
    #[arg(long, env = "BUTTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory to write a JSON snapshot of the build context into
    #[arg(short, long)]
    pub json_output: Option<PathBuf>,

    /// Only build the context; do not write aggregate pages
    #[arg(long)]
    pub skip_pages: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.output_dir {
            settings.output_path = dir.clone();
        }
        if let Some(key) = &self.api_key {
            settings.butter_config.api_key = key.clone();
        }
    }
}
