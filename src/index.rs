//! The tag index
//!
//! An in-memory, ordered collection of every tag across the workspace. All
//! mutation goes through the narrow operation set here so the sort and
//! version invariants are enforced in one place; call sites never splice
//! the underlying storage directly.
//!
//! # Ordering
//!
//! After every mutating batch operation the index is sorted by
//! `(display text ascending, start line ascending)`. This keeps list
//! rendering and numeric selection deterministic across updates.
//!
//! # Overlapping re-scans
//!
//! Two re-scans of the same file can overlap around the text-loading gap:
//! the first handler starts loading, the second starts and finishes before
//! the first's continuation runs. The index hands out a monotonically
//! increasing [`ScanToken`] per path; a commit is applied only if no newer
//! scan for that path has already completed, so the last scan to complete
//! wins and superseded results are discarded instead of appended.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::extract::extract_all;
use crate::models::Tag;
use crate::pattern::Pattern;

/// Ticket for one in-flight re-scan of one file.
///
/// Obtained from [`TagIndex::begin_scan`] before loading the file's text,
/// redeemed with [`TagIndex::commit_scan`] once extraction is done.
#[derive(Debug)]
pub struct ScanToken {
    path: PathBuf,
    seq: u64,
}

/// Counters reported by a full rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Files whose text was scanned.
    pub files: usize,
    /// Files that could not be loaded and were skipped.
    pub skipped: usize,
    /// Total tags in the index after the rebuild.
    pub total: usize,
}

/// The in-memory collection of all current tags.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: Vec<Tag>,
    /// Highest scan sequence number handed out per path.
    issued: HashMap<PathBuf, u64>,
    /// Sequence number of the last scan applied per path.
    committed: HashMap<PathBuf, u64>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// All tags in display order.
    pub fn all(&self) -> &[Tag] {
        &self.tags
    }

    /// Clear the index and repopulate it from a full file sweep.
    ///
    /// Files whose text failed to load are counted and skipped, never
    /// fatal. Used only at startup and on bulk configuration change.
    pub fn rebuild_all(
        &mut self,
        patterns: &[Pattern],
        files: impl IntoIterator<Item = (PathBuf, anyhow::Result<String>)>,
    ) -> RebuildStats {
        log::debug!("Rebuilding tag index...");

        self.tags.clear();
        // A rebuild supersedes every in-flight per-file scan.
        let known: Vec<PathBuf> = self.issued.keys().cloned().collect();
        for path in known {
            self.invalidate(&path);
        }

        let mut stats = RebuildStats::default();

        for (path, text) in files {
            match text {
                Ok(text) => {
                    self.tags.extend(extract_all(patterns, &path, &text));
                    stats.files += 1;
                }
                Err(e) => {
                    log::info!("[skipping] file {:?}: {:#}", path, e);
                    stats.skipped += 1;
                }
            }
        }

        self.sort_tags();
        stats.total = self.tags.len();

        log::info!(
            "Found {} tag(s) in {} file(s) (skipped {})",
            stats.total,
            stats.files,
            stats.skipped
        );

        stats
    }

    /// Replace the tags of one file with a fresh extraction of `text`.
    ///
    /// Idempotent: re-running with unchanged text leaves the index content
    /// unchanged. Returns the number of tags added for the file.
    pub fn update_for_file(&mut self, patterns: &[Pattern], path: &Path, text: &str) -> usize {
        let token = self.begin_scan(path);
        let tags = extract_all(patterns, path, text);
        self.commit_scan(token, tags)
            .expect("a just-issued token is the newest scan for its path")
    }

    /// Start a re-scan of `path`, capturing its version stamp.
    pub fn begin_scan(&mut self, path: &Path) -> ScanToken {
        let seq = self.next_seq(path);
        ScanToken {
            path: path.to_path_buf(),
            seq,
        }
    }

    /// Apply a finished re-scan: remove the file's old tags, append the
    /// new ones, re-sort.
    ///
    /// Returns `None` without touching the index when a newer scan for the
    /// same path has already been applied.
    pub fn commit_scan(&mut self, token: ScanToken, tags: Vec<Tag>) -> Option<usize> {
        let last_applied = self.committed.get(&token.path).copied().unwrap_or(0);
        if token.seq <= last_applied {
            log::debug!(
                "Discarding superseded scan of {:?} (seq {} <= {})",
                token.path,
                token.seq,
                last_applied
            );
            return None;
        }

        let removed = self.remove_where(|tag| tag.path == token.path);
        let added = tags.len();
        debug_assert!(tags.iter().all(|tag| tag.path == token.path));
        self.tags.extend(tags);
        self.sort_tags();
        self.committed.insert(token.path.clone(), token.seq);

        log::info!(
            "[+{} -{} = {}] file {:?}",
            added,
            removed,
            added as i64 - removed as i64,
            token.path
        );
        Some(added)
    }

    /// Remove every tag belonging to exactly `path`.
    pub fn remove_for_file(&mut self, path: &Path) -> usize {
        self.invalidate(path);
        let removed = self.remove_where(|tag| tag.path == path);
        if removed > 0 {
            log::info!("Removed {} tag(s) for deleted file {:?}", removed, path);
        }
        removed
    }

    /// Remove every tag whose file lives under `dir`.
    ///
    /// The comparison is path-segment aware: `/foo` covers `/foo/x` but
    /// never `/foobar/x`.
    pub fn remove_for_directory(&mut self, dir: &Path) -> usize {
        let affected: Vec<PathBuf> = self
            .tags
            .iter()
            .filter(|tag| tag.path.starts_with(dir))
            .map(|tag| tag.path.clone())
            .collect();
        for path in affected {
            self.invalidate(&path);
        }

        let removed = self.remove_where(|tag| tag.path.starts_with(dir));
        if removed > 0 {
            log::info!("Removed {} tag(s) under deleted directory {:?}", removed, dir);
        }
        removed
    }

    /// Tags of one pattern, optionally restricted to one file.
    pub fn query(&self, pattern_name: &str, file: Option<&Path>) -> Vec<Tag> {
        self.tags
            .iter()
            .filter(|tag| tag.pattern == pattern_name)
            .filter(|tag| file.map(|f| tag.is_in_file(f)).unwrap_or(true))
            .cloned()
            .collect()
    }

    /// Batch form of [`query`](Self::query): one entry per pattern, in
    /// pattern-set order, present even when empty. This order governs the
    /// group order in the list view.
    pub fn query_grouped(
        &self,
        patterns: &[Pattern],
        file: Option<&Path>,
    ) -> Vec<(String, Vec<Tag>)> {
        patterns
            .iter()
            .map(|p| (p.name.clone(), self.query(&p.name, file)))
            .collect()
    }

    fn sort_tags(&mut self) {
        self.tags
            .sort_by_cached_key(|tag| (tag.display_text(), tag.start.line));
    }

    fn remove_where(&mut self, keep_out: impl Fn(&Tag) -> bool) -> usize {
        let before = self.tags.len();
        self.tags.retain(|tag| !keep_out(tag));
        before - self.tags.len()
    }

    /// Mark any in-flight scan of `path` as superseded.
    fn invalidate(&mut self, path: &Path) {
        let seq = self.next_seq(path);
        self.committed.insert(path.to_path_buf(), seq);
    }

    fn next_seq(&mut self, path: &Path) -> u64 {
        let seq = self.issued.entry(path.to_path_buf()).or_insert(0);
        *seq += 1;
        *seq
    }
}
