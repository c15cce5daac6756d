//! Workspace file access
//!
//! The two collaborators the index relies on for disk state: enumerating
//! eligible files under a directory tree and loading a file's text.

use anyhow::{anyhow, Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::eligibility::FileMatcher;

/// Enumerate the eligible files under `root`, in sorted order.
///
/// `root` is usually the workspace itself, but can be any directory below
/// it; directory-creation events re-scan just the created subtree this
/// way.
pub fn find_files(root: &Path, matcher: &FileMatcher) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    // Eligibility (globs, reserved paths, VCS ignores) is entirely the
    // matcher's job, so the walker's own filters stay off.
    let walker = WalkBuilder::new(root).standard_filters(false).build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Walk error under {:?}: {}", root, e);
                continue;
            }
        };

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        if matcher.should_scan(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    log::info!("Found {} file(s) under {:?}", files.len(), root);
    Ok(files)
}

/// Load a file's text, failing on unreadable or non-UTF-8 content.
pub fn load_text(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    String::from_utf8(bytes).map_err(|_| anyhow!("{} is not valid UTF-8", path.display()))
}
