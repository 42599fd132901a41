//! # Butter Articles
//!
//! Pulls published posts from the ButterCMS content API, maps them to
//! articles and merges them into a static-site build context grouped by
//! category, author and date.
//!
//! ## Usage
//!
//! ```sh
//! BUTTER_API_KEY=... butter_articles -s settings.yaml -o ./output
//! ```
//!
//! ## Architecture
//!
//! One build runs as a short pipeline:
//! 1. **Fetching**: walk the paginated `posts` endpoint page by page
//! 2. **Mapping**: keep published posts and turn each into an article
//! 3. **Aggregation**: merge into the build context, group by category and
//!    author, sort by date
//! 4. **Output**: write aggregate Markdown pages and an optional JSON snapshot

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod content;
mod error;
mod generator;
mod models;
mod outputs;
mod settings;
mod sources;
mod translations;
mod utils;

use cli::Cli;
use generator::{BuildContext, Generators};
use outputs::writer::FsWriter;
use outputs::{json, pages};
use settings::Settings;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("butter_articles starting up");

    let args = Cli::parse();
    debug!(?args.settings, ?args.output_dir, ?args.json_output, "Parsed CLI arguments");

    // ---- Settings ----
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path).await?,
        None => Settings::default(),
    };
    args.apply(&mut settings);

    // ---- Generators ----
    let mut generators = Generators::new(&settings);
    if let Err(e) = sources::butter::register(&mut generators, &settings) {
        error!(error = %e, "Could not register the ButterCMS source");
        return Err(e.into());
    }
    info!(provider = generators.articles_provider().name(), "Article provider registered");

    // ---- Context ----
    let context = generators
        .generate_context(&settings, BuildContext::default())
        .await
        .inspect_err(|e| error!(error = %e, "Build failed while generating the article context"))?;
    info!(
        articles = context.articles.len(),
        translations = context.translations.len(),
        categories = context.categories.len(),
        authors = context.authors.len(),
        "Article context ready"
    );

    // ---- Pages ----
    if args.skip_pages {
        info!("Skipping aggregate pages");
    } else {
        ensure_writable_dir(&settings.output_path)
            .await
            .inspect_err(|e| {
                error!(
                    path = %settings.output_path.display(),
                    error = %e,
                    "Output directory is not writable (fix perms or choose a different path)"
                )
            })?;
        let mut writer = FsWriter::new(&settings);
        pages::generate_pages(&context, &mut writer, &settings).await?;
        info!(files = writer.written(), output = %settings.output_path.display(), "Pages written");
    }

    // ---- JSON snapshot ----
    if let Some(dir) = &args.json_output {
        json::write_context(&context, dir).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
