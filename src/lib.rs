//! Tagtrack: a live workspace tag index
//!
//! Tagtrack maintains an incrementally-updated index of pattern matches
//! ("tags") across the text files of a workspace, and keeps its
//! presentation surfaces (grouped list, inline highlights, summary
//! counter) synchronized with that index as files are edited, created,
//! deleted, or renamed, and as the pattern configuration changes.
//!
//! # Architecture
//!
//! - **Pattern compiler**: turns named regex entries into compiled,
//!   reusable matchers
//! - **Match extractor**: pure function from (pattern, text) to ordered
//!   match descriptors
//! - **Tag index**: the in-memory tag collection with per-file incremental
//!   updates, scoped removals, and a stable sort contract
//! - **Change router**: maps external events onto narrow index operations
//!   and view refreshes
//!
//! # Example Usage
//!
//! ```no_run
//! use tagtrack::{host::CliHost, router::Tracker};
//!
//! let mut tracker = Tracker::new(".", CliHost::default()).unwrap();
//! let stats = tracker.initial_scan().unwrap();
//!
//! println!("Indexed {} tags", stats.total);
//! ```

pub mod cli;
pub mod config;
pub mod edit;
pub mod eligibility;
pub mod extract;
pub mod host;
pub mod index;
pub mod models;
pub mod output;
pub mod pattern;
pub mod router;
pub mod views;
pub mod watcher;
pub mod workspace;

// Re-export commonly used types
pub use config::{GoToBehavior, Settings, UpdateTrigger};
pub use index::{RebuildStats, TagIndex};
pub use models::{Position, Tag};
pub use pattern::{Pattern, PatternError};
pub use router::{ChangeEvent, Tracker};
