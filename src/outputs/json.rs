//! JSON snapshot of the merged build context.
//!
//! Serializes the [`BuildContext`] (articles, translations, date index,
//! category and author listings) so other tools can consume the build
//! without re-fetching:
//!
//! ```text
//! json_output_dir/
//! └── context.json
//! ```

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::generator::BuildContext;

/// Write `context` to `{json_output_dir}/context.json` and return the path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_context(context: &BuildContext, json_output_dir: &Path) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(context)?;

    info!("Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = json_output_dir.join("context.json");
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = context.articles.len(), "Wrote JSON context");
    Ok(path)
}
