//! Pattern compilation
//!
//! Turns `[[patterns]]` config entries into compiled, reusable matchers.
//! Each matcher is compiled once per configuration generation and shared by
//! every scan; per-scan recompilation would waste work and risk flag drift
//! between call sites.
//!
//! A compiled pattern also gets a paired visual badge (a colored SVG keyed
//! by pattern name) via [`BadgeRegistry`]. The registry is reset whenever
//! the pattern set is replaced so renamed or removed patterns do not leave
//! orphaned badges behind.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{DefaultPatternSettings, PatternConfig, Style};

/// Why a pattern entry failed to compile.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern entry is missing required field 'name'")]
    MissingName,
    #[error("pattern '{name}' is missing required field 'pattern'")]
    MissingSource { name: String },
    #[error("pattern '{name}' has an invalid regular expression: {source}")]
    InvalidRegex {
        name: String,
        source: regex::Error,
    },
}

/// A named, compiled search rule plus its display style.
///
/// Immutable once constructed; configuration changes replace the whole
/// pattern set rather than mutating patterns in place.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub name: String,
    pub regex: Regex,
    pub style: Style,
}

impl Pattern {
    /// Compile one config entry, merging flag and style defaults.
    ///
    /// Matching is repeat-capable by construction: extraction uses the
    /// regex crate's iterator APIs, which enumerate every match rather
    /// than only the first.
    pub fn compile(
        config: &PatternConfig,
        defaults: &DefaultPatternSettings,
    ) -> Result<Pattern, PatternError> {
        let name = match &config.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => return Err(PatternError::MissingName),
        };

        let source = match &config.pattern {
            Some(source) if !source.is_empty() => source,
            _ => return Err(PatternError::MissingSource { name }),
        };

        let case_sensitive = config.case_sensitive.unwrap_or(defaults.case_sensitive);
        let multi_line = config.multi_line.unwrap_or(defaults.multi_line);

        let regex = RegexBuilder::new(source)
            .case_insensitive(!case_sensitive)
            .multi_line(multi_line)
            .build()
            .map_err(|source| PatternError::InvalidRegex {
                name: name.clone(),
                source,
            })?;

        Ok(Pattern {
            name,
            regex,
            style: config.style.merged_over(&defaults.style),
        })
    }
}

/// Compile a full pattern set.
///
/// A malformed entry is skipped and reported; it does not abort compilation
/// of the remaining entries.
pub fn compile_set(
    configs: &[PatternConfig],
    defaults: &DefaultPatternSettings,
) -> (Vec<Pattern>, Vec<PatternError>) {
    let mut patterns = Vec::with_capacity(configs.len());
    let mut errors = Vec::new();

    for config in configs {
        match Pattern::compile(config, defaults) {
            Ok(pattern) => patterns.push(pattern),
            Err(e) => {
                log::warn!("Skipping pattern entry: {}", e);
                errors.push(e);
            }
        }
    }

    log::info!(
        "Compiled {} pattern(s), skipped {}",
        patterns.len(),
        errors.len()
    );

    (patterns, errors)
}

const BADGE_TEMPLATE: &str = r##"<svg
    xmlns="http://www.w3.org/2000/svg"
    width="16"
    height="16"
    viewBox="0 0 24 24"
    fill="none"
    stroke="currentColor"
    stroke-width="2"
    stroke-linecap="round"
    stroke-linejoin="round">
    <path color="{{color}}" d="M20.59 13.41l-7.17 7.17a2 2 0 0 1-2.83 0L2 12V2h10l8.59 8.59a2 2 0 0 1 0 2.82z"></path>
    <line color="{{color}}" x1="7" y1="7" x2="7" y2="7"></line>
</svg>
"##;

const BADGE_FALLBACK_COLOR: &str = "#CF3F61";

/// On-disk registry of per-pattern badge SVGs, kept under
/// `.tagtrack/badges/` in the workspace.
#[derive(Debug, Clone)]
pub struct BadgeRegistry {
    dir: PathBuf,
}

impl BadgeRegistry {
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join(".tagtrack").join("badges"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the badge for a pattern name.
    pub fn badge_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.svg"))
    }

    /// Replace the registry contents with one badge per pattern.
    ///
    /// Prior badges are discarded first, including those of patterns that
    /// no longer exist under any name.
    pub fn sync(&self, patterns: &[Pattern]) -> Result<()> {
        self.reset()?;

        for pattern in patterns {
            let color = pattern
                .style
                .background
                .as_deref()
                .or(pattern.style.color.as_deref())
                .unwrap_or(BADGE_FALLBACK_COLOR);
            let body = BADGE_TEMPLATE.replace("{{color}}", color);

            std::fs::write(self.badge_path(&pattern.name), body).with_context(|| {
                format!("Failed to write badge for pattern '{}'", pattern.name)
            })?;
        }

        log::debug!("Wrote {} badge(s) to {:?}", patterns.len(), self.dir);
        Ok(())
    }

    /// Remove all registered badges, creating the directory if needed.
    pub fn reset(&self) -> Result<()> {
        if self.dir.exists() {
            for entry in std::fs::read_dir(&self.dir)
                .with_context(|| format!("Failed to read badge directory {:?}", self.dir))?
            {
                let entry = entry?;
                std::fs::remove_file(entry.path())
                    .with_context(|| format!("Failed to remove badge {:?}", entry.path()))?;
            }
        } else {
            std::fs::create_dir_all(&self.dir)
                .with_context(|| format!("Failed to create badge directory {:?}", self.dir))?;
        }

        Ok(())
    }
}
