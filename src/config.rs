//! Workspace configuration loading
//!
//! Settings live in a `tagtrack.toml` file at the workspace root and are
//! loaded into an immutable snapshot. The snapshot is replaced wholesale on
//! a configuration-change event; nothing ever mutates it in place.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::{Display, EnumString};

/// Name of the configuration file looked up at the workspace root.
pub const CONFIG_FILE: &str = "tagtrack.toml";

/// Which editor-level event triggers a single-file re-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UpdateTrigger {
    OnChange,
    OnSave,
    Manual,
}

/// Where the cursor lands when navigating to a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GoToBehavior {
    Start,
    End,
    Highlight,
}

/// Display style for a pattern's highlights and badge.
///
/// All keys are optional so that per-pattern styles can override just the
/// keys they care about; unset keys fall through to the default pattern
/// style via [`Style::merged_over`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub color: Option<String>,
    pub background: Option<String>,
    pub underline: Option<bool>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl Style {
    /// Merge this style over `base`: keys set here win, unset keys fall
    /// through to `base`.
    pub fn merged_over(&self, base: &Style) -> Style {
        Style {
            color: self.color.clone().or_else(|| base.color.clone()),
            background: self.background.clone().or_else(|| base.background.clone()),
            underline: self.underline.or(base.underline),
            bold: self.bold.or(base.bold),
            italic: self.italic.or(base.italic),
        }
    }
}

/// One `[[patterns]]` entry as written in the config file.
///
/// `name` and `pattern` are required but modeled as options so that the
/// compiler can report which field is missing instead of failing the whole
/// parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub case_sensitive: Option<bool>,
    pub multi_line: Option<bool>,
    pub style: Style,
}

/// Flag and style defaults applied to every pattern that does not override
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPatternSettings {
    pub case_sensitive: bool,
    pub multi_line: bool,
    pub style: Style,
}

impl Default for DefaultPatternSettings {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            multi_line: false,
            style: Style {
                color: Some("#FFFFFF".to_string()),
                background: Some("#CF3F61".to_string()),
                underline: None,
                bold: None,
                italic: None,
            },
        }
    }
}

/// Summary counter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSettings {
    pub enabled: bool,
    /// Template string; `{all}` expands to the total tag count and
    /// `{name}` to the count for the pattern with that name.
    pub template: String,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            template: "tags: {all}".to_string(),
        }
    }
}

/// Immutable settings snapshot for one configuration generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub update_trigger: UpdateTrigger,
    /// Glob selecting the files to scan.
    pub include: String,
    /// Glob removing files from the include set.
    pub exclude: String,
    /// Also skip files ignored by version control.
    pub exclude_vcs_ignored: bool,
    pub go_to: GoToBehavior,
    pub counter: CounterSettings,
    pub default_pattern: DefaultPatternSettings,
    pub patterns: Vec<PatternConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            update_trigger: UpdateTrigger::OnChange,
            include: "**/*".to_string(),
            exclude: "**/{node_modules,vendor}/*".to_string(),
            exclude_vcs_ignored: false,
            go_to: GoToBehavior::End,
            counter: CounterSettings::default(),
            default_pattern: DefaultPatternSettings::default(),
            patterns: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from `tagtrack.toml` under `root`.
    ///
    /// A missing file yields the defaults; a present but malformed file is
    /// an error so the user hears about the typo instead of silently
    /// scanning with defaults.
    pub fn load(root: &Path) -> Result<Settings> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            log::debug!("No {} found, using default settings", CONFIG_FILE);
            return Ok(Settings::default());
        }

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let settings: Settings = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        log::info!(
            "Loaded settings: {} pattern(s), trigger={}",
            settings.patterns.len(),
            settings.update_trigger
        );

        Ok(settings)
    }
}
