//! Editor host seam
//!
//! The router never talks to a concrete editor; it talks to these traits.
//! A real integration implements them against its UI toolkit, the CLI
//! implements them against stdout, and the tests implement them with
//! in-memory fakes.

use std::path::{Path, PathBuf};

use crate::config::GoToBehavior;
use crate::models::Position;
use crate::pattern::Pattern;
use crate::views::TagGroup;

/// Everything the router needs from the surrounding editor.
pub trait EditorHost {
    /// Paths of the documents currently visible in editors. Unsaved
    /// (untitled) buffers have no path and are not represented here.
    fn visible_paths(&self) -> Vec<PathBuf>;

    /// Path of the active document, if any.
    fn active_path(&self) -> Option<PathBuf>;

    /// Current in-memory text of an open document, which may be newer
    /// than what is on disk.
    fn document_text(&self, path: &Path) -> Option<String>;

    /// Whether the file is open in any visible editor.
    fn is_open(&self, path: &Path) -> bool {
        self.visible_paths().iter().any(|p| p == path)
    }

    /// Replace the grouped list view contents.
    fn publish_tree(&self, groups: &[TagGroup]);

    /// Replace the highlight ranges for one pattern in one editor.
    fn apply_highlights(&self, editor: &Path, pattern: &Pattern, ranges: &[(Position, Position)]);

    /// Replace the summary counter text.
    fn set_status(&self, text: &str);

    /// Navigate to a location, honoring the configured go-to behavior.
    fn open_at(&self, path: &Path, start: Position, end: Position, behavior: GoToBehavior);

    /// Surface a warning to the user (e.g. malformed configuration).
    fn warn_user(&self, message: &str);
}

/// One row offered by a [`Picker`].
#[derive(Debug, Clone)]
pub struct PickItem {
    pub label: String,
    pub detail: String,
}

/// Generic selection-list collaborator for the two-stage navigate and
/// delete flows. Returns the index of the chosen item, or `None` when the
/// user backs out.
pub trait Picker {
    fn pick(&self, title: &str, items: &[PickItem]) -> Option<usize>;
}

/// Host implementation for the CLI: no editors, status and navigation go
/// to stdout.
#[derive(Debug, Default)]
pub struct CliHost {
    /// Print counter updates as they happen (watch mode). One-shot
    /// commands render the counter themselves instead.
    live_status: bool,
}

impl CliHost {
    pub fn live() -> Self {
        Self { live_status: true }
    }
}

impl EditorHost for CliHost {
    fn visible_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn active_path(&self) -> Option<PathBuf> {
        None
    }

    fn document_text(&self, _path: &Path) -> Option<String> {
        None
    }

    fn publish_tree(&self, groups: &[TagGroup]) {
        log::debug!("Tree refreshed: {} group(s)", groups.len());
    }

    fn apply_highlights(
        &self,
        _editor: &Path,
        _pattern: &Pattern,
        _ranges: &[(Position, Position)],
    ) {
    }

    fn set_status(&self, text: &str) {
        if self.live_status {
            println!("{text}");
        } else {
            log::debug!("Status: {text}");
        }
    }

    fn open_at(&self, path: &Path, start: Position, end: Position, behavior: GoToBehavior) {
        let line_col = |p: Position| format!("{}:{}", p.line + 1, p.column + 1);
        match behavior {
            GoToBehavior::Start => println!("{}:{}", path.display(), line_col(start)),
            GoToBehavior::End => println!("{}:{}", path.display(), line_col(end)),
            GoToBehavior::Highlight => println!(
                "{}:{}-{}",
                path.display(),
                line_col(start),
                line_col(end)
            ),
        }
    }

    fn warn_user(&self, message: &str) {
        crate::output::warn(message);
    }
}

/// Picker that prints a numbered menu and reads the chosen number from
/// stdin. An empty line or anything unparsable backs out.
#[derive(Debug, Default)]
pub struct StdinPicker;

impl Picker for StdinPicker {
    fn pick(&self, title: &str, items: &[PickItem]) -> Option<usize> {
        use std::io::Write;

        println!("{title}:");
        for item in items {
            println!("  {}  {}", item.label, item.detail);
        }
        print!("> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        std::io::stdin().read_line(&mut line).ok()?;
        let choice: usize = line.trim().parse().ok()?;

        // Menu entries are numbered from 1.
        choice
            .checked_sub(1)
            .filter(|&index| index < items.len())
    }
}
