//! CLI argument parsing and command handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

use crate::host::{CliHost, StdinPicker};
use crate::router::Tracker;
use crate::views::{self, TagGroup};
use crate::watcher::{self, WatchConfig};

/// Tagtrack: a live index of pattern matches across a workspace
#[derive(Parser, Debug)]
#[command(
    name = "ttk",
    version,
    about = "Track tagged comments (TODO, FIXME, ...) across a workspace",
    long_about = "Tagtrack scans a workspace for configurable regex patterns and keeps \
                  the resulting tag index live as files change. Configure patterns in \
                  tagtrack.toml at the workspace root."
)]
pub struct Cli {
    /// Enable verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the workspace once and print the grouped tag list
    Scan {
        /// Workspace root (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Output the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan, then watch the workspace and keep the index live
    Watch {
        /// Workspace root (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Suppress banners (only log errors)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Scan and print the summary counter line
    Count {
        /// Workspace root (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
    },

    /// Pick a tag interactively and print its location
    Goto {
        /// Workspace root (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
    },

    /// Pick a tag interactively and remove it from its source file
    Delete {
        /// Workspace root (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Setup logging based on verbosity
        let log_level = match self.verbose {
            0 => "warn",  // Default: only warnings and errors
            1 => "info",  // -v: show info messages
            2 => "debug", // -vv: show debug messages
            _ => "trace", // -vvv: show trace messages
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();

        match self.command {
            Command::Scan { path, json } => handle_scan(&path, json),
            Command::Watch { path, quiet } => handle_watch(&path, quiet),
            Command::Count { path } => handle_count(&path),
            Command::Goto { path } => handle_goto(&path),
            Command::Delete { path } => handle_delete(&path),
        }
    }
}

fn handle_scan(path: &Path, json: bool) -> Result<()> {
    let mut tracker = Tracker::new(path, CliHost::default())?;
    let stats = tracker.initial_scan()?;

    let tree = views::build_tree(tracker.index(), tracker.patterns());

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    print_tree(&tree);
    println!(
        "{}",
        format!(
            "{} tag(s) in {} file(s), {} skipped",
            stats.total, stats.files, stats.skipped
        )
        .dimmed()
    );
    Ok(())
}

fn handle_watch(path: &Path, quiet: bool) -> Result<()> {
    let mut tracker = Tracker::new(path, CliHost::live())?;
    let stats = tracker.initial_scan()?;

    if !quiet {
        println!(
            "Indexed {} tag(s) in {} file(s) (skipped {})",
            stats.total, stats.files, stats.skipped
        );
    }

    let root = tracker.root().to_path_buf();
    watcher::watch(&root, &mut tracker, WatchConfig { quiet })
}

fn handle_count(path: &Path) -> Result<()> {
    let mut tracker = Tracker::new(path, CliHost::default())?;
    tracker.initial_scan()?;

    println!(
        "{}",
        views::render_counter(
            &tracker.settings().counter.template,
            tracker.index(),
            tracker.patterns()
        )
    );
    Ok(())
}

fn handle_goto(path: &Path) -> Result<()> {
    let mut tracker = Tracker::new(path, CliHost::default())?;
    tracker.initial_scan()?;
    tracker.go_to_tag(None, &StdinPicker)
}

fn handle_delete(path: &Path) -> Result<()> {
    let mut tracker = Tracker::new(path, CliHost::default())?;
    tracker.initial_scan()?;
    tracker.delete_tag(None, &StdinPicker)
}

fn print_tree(tree: &[TagGroup]) {
    for group in tree {
        println!("{} ({})", group.label.bold(), group.count);
        for item in &group.items {
            println!("  {}  {}", item.label, item.description.dimmed());
        }
    }
}
