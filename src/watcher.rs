//! File system watcher feeding the change router
//!
//! Translates raw notify events into [`ChangeEvent`]s and runs them
//! through the tracker. Everything is cooperative: events are drained one
//! at a time on the calling thread, so handlers are serialized and views
//! are only refreshed between events, never mid-mutation.

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;

use crate::config::CONFIG_FILE;
use crate::host::EditorHost;
use crate::router::{ChangeEvent, Tracker};

/// Configuration for the watch loop.
#[derive(Debug, Clone, Default)]
pub struct WatchConfig {
    /// Suppress the startup banner (only log).
    pub quiet: bool,
}

/// Watch the workspace and keep the tracker's index and views live.
///
/// Blocks until the event channel disconnects (interrupted).
pub fn watch<H: EditorHost>(
    root: &Path,
    tracker: &mut Tracker<H>,
    config: WatchConfig,
) -> Result<()> {
    log::info!("Starting file watcher for {:?}", root);

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(tx, Config::default())
        .context("Failed to create file watcher")?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .context("Failed to start watching directory")?;

    if !config.quiet {
        println!("Watching {} for tag changes...", root.display());
    }

    loop {
        // Short timeout keeps the loop responsive to channel shutdown.
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(Ok(event)) => {
                for change in translate(&event) {
                    tracker.handle(change);
                }
            }
            Ok(Err(e)) => {
                log::warn!("Watch error: {}", e);
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                log::info!("Watcher channel disconnected, stopping...");
                break;
            }
        }
    }

    if !config.quiet {
        println!("Watcher stopped.");
    }

    Ok(())
}

/// Map one notify event onto router events, one per affected path.
///
/// A change to this tool's own configuration file becomes
/// [`ChangeEvent::ConfigChanged`]; other settings-like files are not ours
/// and stay ordinary filesystem events for the eligibility check to veto.
fn translate(event: &Event) -> Vec<ChangeEvent> {
    event
        .paths
        .iter()
        .filter_map(|path| {
            let is_config = path.ends_with(CONFIG_FILE);
            match event.kind {
                EventKind::Create(_) | EventKind::Modify(_) if is_config => {
                    Some(ChangeEvent::ConfigChanged)
                }
                EventKind::Create(_) => Some(ChangeEvent::FsCreated(path.clone())),
                EventKind::Modify(_) => Some(ChangeEvent::FsChanged(path.clone())),
                EventKind::Remove(_) => Some(ChangeEvent::FsDeleted(path.clone())),
                _ => None,
            }
        })
        .collect()
}
