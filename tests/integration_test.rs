//! Integration tests for tagtrack

use tagtrack::host::{EditorHost, PickItem, Picker};
use tagtrack::views::{build_tree, render_counter, TagGroup};
use tagtrack::{ChangeEvent, GoToBehavior, Pattern, Position, Tracker};

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Host that records everything the tracker pushes at it.
#[derive(Default)]
struct RecordingHost {
    visible: RefCell<Vec<PathBuf>>,
    statuses: RefCell<Vec<String>>,
    opened: RefCell<Vec<(PathBuf, Position, Position)>>,
}

impl EditorHost for RecordingHost {
    fn visible_paths(&self) -> Vec<PathBuf> {
        self.visible.borrow().clone()
    }

    fn active_path(&self) -> Option<PathBuf> {
        None
    }

    fn document_text(&self, _path: &Path) -> Option<String> {
        None
    }

    fn publish_tree(&self, _groups: &[TagGroup]) {}

    fn apply_highlights(
        &self,
        _editor: &Path,
        _pattern: &Pattern,
        _ranges: &[(Position, Position)],
    ) {
    }

    fn set_status(&self, text: &str) {
        self.statuses.borrow_mut().push(text.to_string());
    }

    fn open_at(&self, path: &Path, start: Position, end: Position, _behavior: GoToBehavior) {
        self.opened
            .borrow_mut()
            .push((path.to_path_buf(), start, end));
    }

    fn warn_user(&self, _message: &str) {}
}

/// Picker that always chooses the first entry.
struct FirstPicker;

impl Picker for FirstPicker {
    fn pick(&self, _title: &str, items: &[PickItem]) -> Option<usize> {
        items.first().map(|_| 0)
    }
}

fn sample_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("tagtrack.toml"),
        r#"
counter = { template = "{todo} todo, {fixme} fixme ({all})" }

[[patterns]]
name = "todo"
pattern = "TODO:.*"

[[patterns]]
name = "fixme"
pattern = "FIXME:.*"
"#,
    )
    .unwrap();

    std::fs::create_dir(temp.path().join("src")).unwrap();
    std::fs::write(
        temp.path().join("src/lib.rs"),
        "// TODO: first\nfn lib() {}\n// FIXME: broken\n",
    )
    .unwrap();
    std::fs::write(
        temp.path().join("src/main.rs"),
        "fn main() {}\n// TODO: second\n",
    )
    .unwrap();

    temp
}

#[test]
fn full_workflow() {
    let temp = sample_workspace();
    let mut tracker = Tracker::new(temp.path(), RecordingHost::default()).unwrap();

    let stats = tracker.initial_scan().unwrap();
    assert_eq!(stats.files, 2);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.total, 3);

    // Groups follow pattern order; items are sorted by display text.
    let tree = build_tree(tracker.index(), tracker.patterns());
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].label, "TODO");
    assert_eq!(tree[0].count, 2);
    assert_eq!(tree[0].items[0].label, "TODO: first");
    assert_eq!(tree[0].items[1].label, "TODO: second");
    assert_eq!(tree[1].label, "FIXME");
    assert_eq!(tree[1].count, 1);

    // Counter rendered through the configured template.
    let counter = render_counter(
        &tracker.settings().counter.template,
        tracker.index(),
        tracker.patterns(),
    );
    assert_eq!(counter, "2 todo, 1 fixme (3)");
    assert_eq!(
        tracker.host().statuses.borrow().last().unwrap(),
        "2 todo, 1 fixme (3)"
    );
}

#[test]
fn live_updates_follow_filesystem_events() {
    let temp = sample_workspace();
    let mut tracker = Tracker::new(temp.path(), RecordingHost::default()).unwrap();
    tracker.initial_scan().unwrap();
    assert_eq!(tracker.index().len(), 3);

    // Edit a file on disk.
    let main_rs = tracker.root().join("src/main.rs");
    std::fs::write(&main_rs, "fn main() {}\n// TODO: second\n// TODO: third\n").unwrap();
    tracker.handle(ChangeEvent::FsChanged(main_rs.clone()));
    assert_eq!(tracker.index().len(), 4);

    // Create a new file.
    let extra = tracker.root().join("src/extra.rs");
    std::fs::write(&extra, "// FIXME: extra\n").unwrap();
    tracker.handle(ChangeEvent::FsCreated(extra));
    assert_eq!(tracker.index().len(), 5);

    // Delete one file.
    std::fs::remove_file(&main_rs).unwrap();
    tracker.handle(ChangeEvent::FsDeleted(main_rs));
    assert_eq!(tracker.index().len(), 3);

    // Delete the whole directory.
    let src = tracker.root().join("src");
    std::fs::remove_dir_all(&src).unwrap();
    tracker.handle(ChangeEvent::FsDeleted(src));
    assert!(tracker.index().is_empty());
}

#[test]
fn goto_navigates_through_the_two_stage_picker() {
    let temp = sample_workspace();
    let mut tracker = Tracker::new(temp.path(), RecordingHost::default()).unwrap();
    tracker.initial_scan().unwrap();

    // FirstPicker chooses the first pattern (todo), then its first tag
    // ("TODO: first" in src/lib.rs).
    tracker.go_to_tag(None, &FirstPicker).unwrap();

    let opened = tracker.host().opened.borrow();
    assert_eq!(opened.len(), 1);
    let (path, start, _end) = &opened[0];
    assert!(path.ends_with("src/lib.rs"));
    assert_eq!(*start, Position::new(0, 3));
}

#[test]
fn delete_keeps_file_and_index_consistent() {
    let temp = sample_workspace();
    let mut tracker = Tracker::new(temp.path(), RecordingHost::default()).unwrap();
    tracker.initial_scan().unwrap();

    let tag = tracker
        .index()
        .query("fixme", None)
        .into_iter()
        .next()
        .unwrap();
    tracker.delete_tag(Some(&tag), &FirstPicker).unwrap();

    let lib_rs = std::fs::read_to_string(tracker.root().join("src/lib.rs")).unwrap();
    assert_eq!(lib_rs, "// TODO: first\nfn lib() {}\n//\n");
    assert!(tracker.index().query("fixme", None).is_empty());
    assert_eq!(tracker.index().len(), 2);
}

#[test]
fn config_reload_rebuilds_everything() {
    let temp = sample_workspace();
    let mut tracker = Tracker::new(temp.path(), RecordingHost::default()).unwrap();
    tracker.initial_scan().unwrap();
    assert_eq!(tracker.index().len(), 3);

    // Narrow the pattern set to fixme only.
    std::fs::write(
        tracker.root().join("tagtrack.toml"),
        "[[patterns]]\nname = \"fixme\"\npattern = \"FIXME:.*\"\n",
    )
    .unwrap();
    tracker.handle(ChangeEvent::ConfigChanged);

    assert_eq!(tracker.index().len(), 1);
    assert!(tracker.index().query("todo", None).is_empty());
    assert_eq!(tracker.index().query("fixme", None).len(), 1);
}
