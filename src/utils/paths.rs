//! Cross-Platform Path Utilities
//!
//! Functions for resolving the server's data directories.

use std::path::{Path, PathBuf};

use taskline_core::{CoreError, CoreResult};

/// Get the user's home directory
pub fn home_dir() -> CoreResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| CoreError::config("Could not determine home directory"))
}

/// Get the Taskline directory (~/.taskline/)
pub fn taskline_dir() -> CoreResult<PathBuf> {
    Ok(home_dir()?.join(".taskline"))
}

/// Get the config file path (~/.taskline/config.json)
pub fn config_path() -> CoreResult<PathBuf> {
    Ok(taskline_dir()?.join("config.json"))
}

/// Get the database file path (~/.taskline/data.db)
pub fn database_path() -> CoreResult<PathBuf> {
    Ok(taskline_dir()?.join("data.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> CoreResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .map_err(|e| CoreError::config(format!("Failed to create {}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Get the Taskline directory, creating it if it doesn't exist
pub fn ensure_taskline_dir() -> CoreResult<PathBuf> {
    let path = taskline_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taskline_dir() {
        let dir = taskline_dir().unwrap();
        assert!(dir.to_string_lossy().contains(".taskline"));
    }

    #[test]
    fn test_config_path() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().ends_with("config.json"));
    }

    #[test]
    fn test_ensure_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.exists());
    }
}
