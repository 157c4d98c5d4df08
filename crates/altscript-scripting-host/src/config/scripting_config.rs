use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::paths::ProjectPaths;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptingConfig {
    /// Include call stacks in script exception reports
    #[serde(default)]
    pub debug: bool,

    /// Write the script interface listing when the runtime starts
    #[serde(default)]
    pub generate_docs: bool,

    /// Where the listing is written (default: <data dir>/docs)
    #[serde(default)]
    pub docs_dir: Option<PathBuf>,

    /// Namespace of the listing and prefix of its file name
    #[serde(default = "default_docs_module")]
    pub docs_module: String,
}

fn default_docs_module() -> String {
    "alt".to_string()
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            generate_docs: false,
            docs_dir: None,
            docs_module: default_docs_module(),
        }
    }
}

impl ScriptingConfig {
    /// Get the docs directory path (use provided or default)
    pub fn docs_dir(&self) -> PathBuf {
        self.docs_dir.clone().unwrap_or_else(|| {
            ProjectPaths::new("altscript")
                .map(|p| p.data_dir().join("docs"))
                .unwrap_or_else(|| PathBuf::from(".docs"))
        })
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectPaths::new("altscript").map(|p| p.config_dir().join("config.toml"))
    }

    /// Load from the default location
    pub fn load() -> Result<Self, ConfigLoadError> {
        let path = Self::config_path().ok_or_else(|| ConfigLoadError::NotFound(PathBuf::new()))?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        info!(target: "scripting", "Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when the
    /// file is missing or invalid
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(ConfigLoadError::NotFound(_)) => Self::default(),
            Err(e) => {
                tracing::warn!(target: "scripting", "Using default config: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!(target: "scripting", "Saved config to {}", path.display());
        Ok(())
    }
}
