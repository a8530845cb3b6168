//! Unified path management for FinChat files.
//!
//! ```text
//! ~/.config/finchat/           # Config directory
//! └── config.toml              # ClientConfig
//!
//! ~/.local/share/finchat/      # Data directory
//! └── storage.json             # Key-value store (identity + conversations)
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for finchat_core::FinchatError {
    fn from(err: PathError) -> Self {
        finchat_core::FinchatError::config(err.to_string())
    }
}

const APP_DIR: &str = "finchat";
const CONFIG_FILE: &str = "config.toml";
const STORAGE_FILE: &str = "storage.json";

pub struct FinchatPaths;

impl FinchatPaths {
    /// Returns the FinChat configuration directory (e.g. `~/.config/finchat/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the FinChat data directory (e.g. `~/.local/share/finchat/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Returns the key-value storage file inside `dir`, or inside the data
    /// directory when `dir` is `None`.
    pub fn storage_file(dir: Option<&PathBuf>) -> Result<PathBuf, PathError> {
        match dir {
            Some(dir) => Ok(dir.join(STORAGE_FILE)),
            None => Ok(Self::data_dir()?.join(STORAGE_FILE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_file_honors_override() {
        let dir = PathBuf::from("/tmp/finchat-test");
        assert_eq!(
            FinchatPaths::storage_file(Some(&dir)).unwrap(),
            dir.join("storage.json")
        );
    }
}
