//! Manifest file discovery.

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::MANIFEST_FILE_NAME;
use crate::core::StackforgeError;

/// Find `stackforge.toml` in the current directory or any parent.
pub fn find_manifest() -> Result<PathBuf> {
    let current = std::env::current_dir()
        .context("Cannot determine current working directory. This may indicate a permission issue or corrupted filesystem")?;
    find_manifest_from(current)
}

/// Use `explicit_path` when given, otherwise search from the current directory.
///
/// # Errors
///
/// - Explicit path provided but doesn't exist
/// - No explicit path and no manifest found via search
pub fn find_manifest_with_optional(explicit_path: Option<PathBuf>) -> Result<PathBuf> {
    match explicit_path {
        Some(path) => {
            if path.exists() {
                Ok(path)
            } else {
                Err(StackforgeError::ManifestNotFound {
                    path: path.display().to_string(),
                }
                .into())
            }
        }
        None => find_manifest(),
    }
}

/// Walk from `current` up to the filesystem root looking for `stackforge.toml`.
///
/// Returns [`StackforgeError::ManifestNotFound`] wrapped in an [`anyhow::Error`] if no
/// manifest exists anywhere on the way.
pub fn find_manifest_from(mut current: PathBuf) -> Result<PathBuf> {
    let start = current.clone();
    loop {
        let manifest_path = current.join(MANIFEST_FILE_NAME);
        if manifest_path.exists() {
            return Ok(manifest_path);
        }

        if !current.pop() {
            return Err(StackforgeError::ManifestNotFound {
                path: start.join(MANIFEST_FILE_NAME).display().to_string(),
            }
            .into());
        }
    }
}
