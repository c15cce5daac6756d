//! Scan eligibility
//!
//! Decides whether a given path should be scanned for tags: the configured
//! include glob must match, the exclude glob must not, reserved editor and
//! VCS metadata paths are always out, and optionally anything ignored by
//! version control is out too.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::Gitignore;
use std::path::{Path, PathBuf};

use crate::config::{Settings, CONFIG_FILE};

/// Path components that are never scanned regardless of globs.
const RESERVED_DIRS: &[&str] = &[".git", ".svn", ".hg", ".vscode", ".tagtrack"];

/// File names that are never scanned regardless of globs.
const RESERVED_FILES: &[&str] = &[CONFIG_FILE, "settings.json"];

/// Compiled eligibility check for one settings generation.
#[derive(Debug)]
pub struct FileMatcher {
    root: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
    vcs: Option<Gitignore>,
}

impl FileMatcher {
    pub fn new(root: &Path, settings: &Settings) -> Result<Self> {
        let include = if settings.include.is_empty() {
            build_set("**/*")?
        } else {
            build_set(&settings.include)?
        };
        let exclude = build_set(&settings.exclude)?;

        let vcs = if settings.exclude_vcs_ignored {
            let (gitignore, err) = Gitignore::new(root.join(".gitignore"));
            if let Some(e) = err {
                log::warn!("Problem reading .gitignore: {}", e);
            }
            Some(gitignore)
        } else {
            None
        };

        Ok(Self {
            root: root.to_path_buf(),
            include,
            exclude,
            vcs,
        })
    }

    /// Whether tags should be searched for in `path`.
    pub fn should_scan(&self, path: &Path) -> bool {
        if is_reserved(path) {
            return false;
        }

        // Globs are matched against the workspace-relative path so that
        // config like `src/**/*.rs` behaves the same from any directory.
        let rel = path.strip_prefix(&self.root).unwrap_or(path);

        if !self.include.is_match(rel) {
            return false;
        }
        if self.exclude.is_match(rel) {
            return false;
        }

        if let Some(vcs) = &self.vcs {
            if vcs.matched(rel, path.is_dir()).is_ignore() {
                return false;
            }
        }

        true
    }
}

/// Whether the path touches editor or VCS metadata that is never scanned.
pub fn is_reserved(path: &Path) -> bool {
    let in_reserved_dir = path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| RESERVED_DIRS.contains(&s))
            .unwrap_or(false)
    });
    if in_reserved_dir {
        return true;
    }

    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| RESERVED_FILES.contains(&n))
        .unwrap_or(false)
}

fn build_set(glob: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    if !glob.is_empty() {
        builder.add(Glob::new(glob).with_context(|| format!("Invalid glob pattern '{glob}'"))?);
    }
    builder.build().context("Failed to build glob set")
}
