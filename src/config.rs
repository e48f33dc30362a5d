use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::classifier::{ClassifyOptions, DEFAULT_ID_PREFIX};
use crate::error::Result;
use crate::session::lifecycle::DEFAULT_TREE_PATH_MARKER;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_ignore_legendary")]
    pub ignore_legendary: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub state_path: Option<PathBuf>,
    #[serde(default = "default_tree_path_marker")]
    pub tree_path_marker: String,
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

fn default_ignore_legendary() -> bool {
    true
}
fn default_theme() -> String {
    "default".to_string()
}
fn default_tree_path_marker() -> String {
    DEFAULT_TREE_PATH_MARKER.to_string()
}
fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_legendary: default_ignore_legendary(),
            theme: default_theme(),
            state_path: None,
            tree_path_marker: default_tree_path_marker(),
            id_prefix: default_id_prefix(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leveljumper")
            .join("config.toml")
    }

    /// Blank strings would make every path look like the tree view or collapse
    /// ids to `_<n>`; fall back to defaults instead.
    pub fn normalize(&mut self) {
        if self.tree_path_marker.trim().is_empty() {
            self.tree_path_marker = default_tree_path_marker();
        }
        if self.id_prefix.trim().is_empty() {
            self.id_prefix = default_id_prefix();
        }
    }

    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            ignore_legendary: self.ignore_legendary,
            id_prefix: self.id_prefix.clone(),
        }
    }
}
