//! Change routing
//!
//! One coordinating component subscribes to every external event source
//! (document edits, filesystem changes, configuration changes, editor
//! focus changes) and decides, per event, which narrow index operation to
//! run and which views to refresh afterwards.
//!
//! Within one event's handling the index mutation always completes before
//! any view refresh; views never observe the index mid-mutation. Across
//! events no ordering is guaranteed: each handler is self-contained and
//! idempotent for the paths it touches, and the index's scan tokens settle
//! races between overlapping re-scans of the same file.
//!
//! A failing handler is caught and logged at the [`Tracker::handle`]
//! boundary; one bad event never stops future events from being handled.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{Settings, UpdateTrigger};
use crate::edit;
use crate::eligibility::FileMatcher;
use crate::extract::extract_all;
use crate::host::{EditorHost, PickItem, Picker};
use crate::index::{RebuildStats, TagIndex};
use crate::models::Tag;
use crate::pattern::{compile_set, BadgeRegistry, Pattern};
use crate::views;
use crate::workspace;

/// External events the router reacts to.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    /// An open document's in-memory text changed (fires while typing).
    DocumentChanged(PathBuf),
    /// An open document was written to disk.
    DocumentSaved(PathBuf),
    /// A filesystem entry changed on disk.
    FsChanged(PathBuf),
    /// A filesystem entry appeared: a file create, or a directory create,
    /// which is how renames surface.
    FsCreated(PathBuf),
    /// A filesystem entry disappeared; could have been a file or a
    /// directory, the filesystem no longer knows.
    FsDeleted(PathBuf),
    /// The set of visible editors changed.
    VisibleEditorsChanged,
    /// This tool's own configuration changed.
    ConfigChanged,
}

/// The live tag tracker: settings, compiled patterns, the tag index, and
/// the host seam, coordinated by event dispatch.
pub struct Tracker<H: EditorHost> {
    root: PathBuf,
    settings: Settings,
    patterns: Vec<Pattern>,
    index: TagIndex,
    matcher: FileMatcher,
    badges: BadgeRegistry,
    host: H,
}

impl<H: EditorHost> Tracker<H> {
    /// Create a tracker for the workspace at `root`, loading its
    /// configuration and compiling the pattern set. The index starts
    /// empty; call [`initial_scan`](Self::initial_scan) to populate it.
    pub fn new(root: impl AsRef<Path>, host: H) -> Result<Self> {
        let root = root
            .as_ref()
            .canonicalize()
            .with_context(|| format!("Workspace root {:?} not found", root.as_ref()))?;
        log::info!("Creating tracker for workspace {:?}", root);

        let settings = Settings::load(&root)?;
        let badges = BadgeRegistry::new(&root);
        let matcher = FileMatcher::new(&root, &settings)?;

        let mut tracker = Self {
            root,
            settings,
            patterns: Vec::new(),
            index: TagIndex::new(),
            matcher,
            badges,
            host,
        };
        tracker.compile_patterns();
        Ok(tracker)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Populate the index with a full workspace scan and render all
    /// three views from the result.
    pub fn initial_scan(&mut self) -> Result<RebuildStats> {
        let stats = self.rebuild_index()?;
        self.refresh_all();
        Ok(stats)
    }

    /// Route one event. Failures are logged here and never propagate, so
    /// the event stream stays alive.
    pub fn handle(&mut self, event: ChangeEvent) {
        log::debug!("Event: {:?}", event);
        if let Err(e) = self.dispatch(event) {
            log::error!("Event handler failed: {:#}", e);
        }
    }

    fn dispatch(&mut self, event: ChangeEvent) -> Result<()> {
        match event {
            ChangeEvent::DocumentChanged(path) => self.on_document_changed(path),
            ChangeEvent::DocumentSaved(path) => self.on_document_saved(path),
            ChangeEvent::FsChanged(path) => self.on_fs_changed(path),
            ChangeEvent::FsCreated(path) => self.on_fs_created(path),
            ChangeEvent::FsDeleted(path) => self.on_fs_deleted(path),
            ChangeEvent::VisibleEditorsChanged => {
                self.refresh_decorations();
                Ok(())
            }
            ChangeEvent::ConfigChanged => self.on_config_changed(),
        }
    }

    fn on_document_changed(&mut self, path: PathBuf) -> Result<()> {
        if self.settings.update_trigger != UpdateTrigger::OnChange {
            return Ok(());
        }
        if !self.matcher.should_scan(&path) {
            log::debug!("doc change [skipped] {:?}", path);
            return Ok(());
        }

        // In-memory text, no disk read: the buffer is newer than the file.
        let text = match self.host.document_text(&path) {
            Some(text) => text,
            None => {
                log::debug!("doc change [not open] {:?}", path);
                return Ok(());
            }
        };
        self.index.update_for_file(&self.patterns, &path, &text);

        self.refresh_tree();
        self.refresh_counter();
        if self.host.active_path().as_deref() == Some(path.as_path()) {
            self.refresh_decorations();
        }
        Ok(())
    }

    fn on_document_saved(&mut self, path: PathBuf) -> Result<()> {
        if self.settings.update_trigger != UpdateTrigger::OnSave {
            return Ok(());
        }
        if !self.matcher.should_scan(&path) {
            log::debug!("doc save [skipped] {:?}", path);
            return Ok(());
        }

        if self.scan_from_disk(&path)?.is_some() {
            self.refresh_tree();
            self.refresh_counter();
            if self.host.active_path().as_deref() == Some(path.as_path()) {
                self.refresh_decorations();
            }
        }
        Ok(())
    }

    fn on_fs_changed(&mut self, path: PathBuf) -> Result<()> {
        if self.settings.update_trigger == UpdateTrigger::Manual {
            return Ok(());
        }
        if !path.is_file() {
            log::debug!("fs change [skipped dir] {:?}", path);
            return Ok(());
        }
        // Open documents are handled by the document-change path; doing
        // both would scan the same file twice per edit.
        if self.host.is_open(&path) {
            log::debug!("fs change [already open] {:?}", path);
            return Ok(());
        }
        if !self.matcher.should_scan(&path) {
            log::debug!("fs change [skipped] {:?}", path);
            return Ok(());
        }

        match self.scan_from_disk(&path) {
            Ok(Some(_)) => {
                self.refresh_tree();
                self.refresh_counter();
            }
            Ok(None) => {}
            Err(e) => log::error!("Failed to update tags for {:?}: {:#}", path, e),
        }
        Ok(())
    }

    fn on_fs_created(&mut self, path: PathBuf) -> Result<()> {
        if self.settings.update_trigger == UpdateTrigger::Manual {
            return Ok(());
        }

        if path.is_dir() {
            // Directory creation is how renames surface: re-scan every
            // eligible file under the new directory.
            log::info!("fs create dir {:?}", path);
            let files = workspace::find_files(&path, &self.matcher)?;
            for file in files {
                match workspace::load_text(&file) {
                    Ok(text) => {
                        self.index.update_for_file(&self.patterns, &file, &text);
                    }
                    Err(e) => log::info!("[skipping] file {:?}: {:#}", file, e),
                }
            }

            self.refresh_tree();
            self.refresh_counter();
            // Files under the directory may already be open in editors.
            self.refresh_decorations();
            return Ok(());
        }

        self.on_fs_changed(path)
    }

    fn on_fs_deleted(&mut self, path: PathBuf) -> Result<()> {
        if self.settings.update_trigger == UpdateTrigger::Manual {
            return Ok(());
        }
        if !self.matcher.should_scan(&path) {
            log::debug!("fs delete [skipped] {:?}", path);
            return Ok(());
        }

        // The entry is already gone, so it can no longer be stat'ed: try
        // it as a file first, then as a directory.
        let mut removed = self.index.remove_for_file(&path);
        if removed == 0 {
            removed = self.index.remove_for_directory(&path);
        }

        if removed > 0 {
            self.refresh_tree();
            self.refresh_counter();
        } else {
            log::debug!("fs delete: no tags under {:?}", path);
        }
        Ok(())
    }

    fn on_config_changed(&mut self) -> Result<()> {
        log::info!("Configuration changed, reloading...");

        self.settings = Settings::load(&self.root)?;
        self.compile_patterns();
        self.matcher = FileMatcher::new(&self.root, &self.settings)?;

        self.rebuild_index()?;
        self.refresh_all();
        Ok(())
    }

    /// Compile the pattern set from the current settings, surfacing each
    /// malformed entry as a user-visible warning, and replace the badge
    /// registry contents.
    fn compile_patterns(&mut self) {
        let (patterns, errors) = compile_set(
            &self.settings.patterns,
            &self.settings.default_pattern,
        );
        for e in &errors {
            self.host.warn_user(&e.to_string());
        }
        self.patterns = patterns;

        if let Err(e) = self.badges.sync(&self.patterns) {
            log::warn!("Failed to refresh pattern badges: {:#}", e);
        }
    }

    fn rebuild_index(&mut self) -> Result<RebuildStats> {
        let files = workspace::find_files(&self.root, &self.matcher)?;
        let stats = self.index.rebuild_all(
            &self.patterns,
            files.into_iter().map(|path| {
                let text = workspace::load_text(&path);
                (path, text)
            }),
        );
        Ok(stats)
    }

    /// Re-scan one file from disk, guarded by a scan token captured
    /// before the read so a slower scan can never clobber a newer one.
    fn scan_from_disk(&mut self, path: &Path) -> Result<Option<usize>> {
        let token = self.index.begin_scan(path);
        let text = workspace::load_text(path)?;
        let tags = extract_all(&self.patterns, path, &text);
        Ok(self.index.commit_scan(token, tags))
    }

    //
    // View refresh
    //

    pub fn refresh_all(&self) {
        self.refresh_tree();
        self.refresh_counter();
        self.refresh_decorations();
    }

    fn refresh_tree(&self) {
        let groups = views::build_tree(&self.index, &self.patterns);
        self.host.publish_tree(&groups);
    }

    fn refresh_counter(&self) {
        if !self.settings.counter.enabled {
            return;
        }
        let text = views::render_counter(&self.settings.counter.template, &self.index, &self.patterns);
        self.host.set_status(&text);
    }

    fn refresh_decorations(&self) {
        for path in self.host.visible_paths() {
            if !self.matcher.should_scan(&path) {
                continue;
            }
            let grouped = self.index.query_grouped(&self.patterns, Some(&path));
            for (pattern, (_, tags)) in self.patterns.iter().zip(grouped) {
                let ranges: Vec<_> = tags.iter().map(|t| (t.start, t.end)).collect();
                self.host.apply_highlights(&path, pattern, &ranges);
            }
        }
    }

    //
    // Actions
    //

    /// Navigate to `tag`, or run the two-stage pattern/tag selection when
    /// none is given.
    pub fn go_to_tag(&self, tag: Option<&Tag>, picker: &dyn Picker) -> Result<()> {
        let tag = match tag {
            Some(tag) => tag.clone(),
            None => match self.pick_tag(picker)? {
                Some(tag) => tag,
                None => return Ok(()),
            },
        };

        self.host
            .open_at(&tag.path, tag.start, tag.end, self.settings.go_to);
        Ok(())
    }

    /// Delete `tag` from its source file (selection fallback as for
    /// [`go_to_tag`](Self::go_to_tag)), then re-scan that file so the
    /// index reflects the shifted offsets.
    pub fn delete_tag(&mut self, tag: Option<&Tag>, picker: &dyn Picker) -> Result<()> {
        let tag = match tag {
            Some(tag) => tag.clone(),
            None => match self.pick_tag(picker)? {
                Some(tag) => tag,
                None => return Ok(()),
            },
        };

        edit::delete_tag(&tag)?;

        let text = workspace::load_text(&tag.path)?;
        self.index.update_for_file(&self.patterns, &tag.path, &text);

        self.refresh_tree();
        self.refresh_counter();
        self.refresh_decorations();
        Ok(())
    }

    /// Two-stage selection: pick a pattern, then one of its tags.
    fn pick_tag(&self, picker: &dyn Picker) -> Result<Option<Tag>> {
        if self.patterns.is_empty() {
            bail!("No patterns configured");
        }

        let items: Vec<PickItem> = self
            .patterns
            .iter()
            .enumerate()
            .map(|(i, p)| PickItem {
                label: format!("{}: {}", i + 1, p.name.to_uppercase()),
                detail: p.regex.as_str().to_string(),
            })
            .collect();
        let pattern = match picker.pick("Select a pattern", &items) {
            Some(i) => &self.patterns[i],
            None => return Ok(None),
        };

        let tags = self.index.query(&pattern.name, None);
        if tags.is_empty() {
            log::info!("No tags for pattern '{}'", pattern.name);
            return Ok(None);
        }

        let items: Vec<PickItem> = tags
            .iter()
            .enumerate()
            .map(|(i, t)| PickItem {
                label: format!("{}: {}", i + 1, t.display_text()),
                detail: t.tooltip(),
            })
            .collect();
        Ok(picker
            .pick("Select a tag", &items)
            .map(|i| tags[i].clone()))
    }
}
