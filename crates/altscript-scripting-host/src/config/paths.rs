use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Platform-specific config and data locations for the application
///
/// On Linux this follows the XDG base directories (`~/.config/<name>`,
/// `~/.local/share/<name>`); macOS and Windows use their native locations.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    dirs: ProjectDirs,
}

impl ProjectPaths {
    /// Returns `None` when no home directory can be determined
    pub fn new(name: &str) -> Option<Self> {
        ProjectDirs::from("", "", name).map(|dirs| Self { dirs })
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dirs.config_dir().to_path_buf()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dirs.data_dir().to_path_buf()
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    pub fn project_path(&self) -> &Path {
        self.dirs.project_path()
    }
}
