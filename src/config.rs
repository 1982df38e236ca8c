//! Configuration with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/tabtree/tabtree.toml`
//! 3. Local config: `./tabtree.toml`
//! 4. Environment variables: `TABTREE_*` prefix
//!
//! CLI flags override individual fields on top of the merged settings.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Column layout and export knobs for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// First column considered when searching for markers/values
    pub start_column: usize,
    /// Column holding the numeric figure
    pub amount_column: usize,
    /// Spreadsheet letter of the figure column, used by the formula path
    pub formula_column: String,
    /// Level columns in flattened exports (widened to the observed depth)
    pub max_levels: usize,
    /// Separator for the full-path string
    pub delimiter: String,
    /// Rows per parallel batch in the label/amount join
    pub batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_column: 1,
            amount_column: 10,
            formula_column: "K".to_string(),
            max_levels: 9,
            delimiter: " > ".to_string(),
            batch_size: 10_000,
        }
    }
}

impl Settings {
    /// Load merged settings. `local_path` defaults to `./tabtree.toml`.
    pub fn load(local_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(global) = Self::global_config_path() {
            builder = builder.add_source(File::from(global).required(false));
        }

        let local = local_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("tabtree.toml"));
        builder = builder
            .add_source(File::from(local).required(false))
            .add_source(Environment::with_prefix("TABTREE").try_parsing(true));

        let merged: SettingsOverlay = builder.build()?.try_deserialize()?;
        Ok(merged.apply_to(Settings::default()))
    }

    /// Global config path: `$XDG_CONFIG_HOME/tabtree/tabtree.toml`
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tabtree").map(|dirs| dirs.config_dir().join("tabtree.toml"))
    }
}

/// Partial settings for merging: unspecified fields inherit from the base.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsOverlay {
    pub start_column: Option<usize>,
    pub amount_column: Option<usize>,
    pub formula_column: Option<String>,
    pub max_levels: Option<usize>,
    pub delimiter: Option<String>,
    pub batch_size: Option<usize>,
}

impl SettingsOverlay {
    pub fn apply_to(self, base: Settings) -> Settings {
        Settings {
            start_column: self.start_column.unwrap_or(base.start_column),
            amount_column: self.amount_column.unwrap_or(base.amount_column),
            formula_column: self.formula_column.unwrap_or(base.formula_column),
            max_levels: self.max_levels.unwrap_or(base.max_levels),
            delimiter: self.delimiter.unwrap_or(base.delimiter),
            batch_size: self.batch_size.unwrap_or(base.batch_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.start_column, 1);
        assert_eq!(settings.amount_column, 10);
        assert_eq!(settings.formula_column, "K");
        assert_eq!(settings.delimiter, " > ");
    }

    #[test]
    fn test_overlay_keeps_unspecified_fields() {
        let overlay = SettingsOverlay {
            amount_column: Some(4),
            ..SettingsOverlay::default()
        };
        let merged = overlay.apply_to(Settings::default());
        assert_eq!(merged.amount_column, 4);
        assert_eq!(merged.start_column, 1);
        assert_eq!(merged.max_levels, 9);
    }
}
