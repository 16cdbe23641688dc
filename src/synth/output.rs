//! Writing synthesized documents to disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::SynthesisOutput;
use crate::utils::fs::{atomic_write_multiple, ensure_dir};

/// Write every document of `output` into `dir` and return the written paths, root first.
///
/// All documents are rendered before the first write, so a rendering failure leaves
/// `dir` untouched. Each file is replaced atomically.
pub async fn write_output(output: &SynthesisOutput, dir: &Path) -> Result<Vec<PathBuf>> {
    let rendered = output.render_all().context("Failed to render templates")?;

    ensure_dir(dir)?;
    let files: Vec<(PathBuf, Vec<u8>)> =
        rendered.into_iter().map(|(name, text)| (dir.join(name), text.into_bytes())).collect();
    for (path, content) in &files {
        debug!("Writing {} ({} bytes)", path.display(), content.len());
    }

    atomic_write_multiple(&files).await?;
    info!("Wrote {} templates to {}", files.len(), dir.display());

    Ok(files.into_iter().map(|(path, _)| path).collect())
}
