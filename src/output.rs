//! User-facing output utilities for clean, colored terminal messages
//!
//! These helpers print to stderr without internal logging noise
//! (timestamps, log levels, crate names); `log` covers the diagnostic
//! channel, this covers the user.

use owo_colors::OwoColorize;

/// Display a warning message to the user in yellow with padding
///
/// # Example
/// ```ignore
/// output::warn("pattern entry is missing required field 'name'");
/// ```
pub fn warn(message: &str) {
    eprintln!("\n{}\n", message.yellow());
}

/// Display an error message to the user in red with padding
///
/// # Example
/// ```ignore
/// output::error("Workspace root \"/missing\" not found");
/// ```
pub fn error(message: &str) {
    eprintln!("\n{}\n", message.red());
}

/// Display an informational message to the user in default color with padding
pub fn info(message: &str) {
    eprintln!("\n{}\n", message);
}
