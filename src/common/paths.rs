//! Configuration and log paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/orbit-e2e/`
//! - macOS: `~/Library/Application Support/orbit-e2e/`
//! - Windows: `%APPDATA%\orbit-e2e\`

use std::path::PathBuf;

/// Name used for the configuration and data directories
const APP_NAME: &str = "orbit-e2e";

/// Name of the run log file inside the log directory
pub const LOG_FILE_NAME: &str = "orbit-e2e.log";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join("logs"))
}

/// Get the path to the run log file
pub fn log_path() -> Option<PathBuf> {
    log_dir().map(|dir| dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().unwrap(), "config.toml");
        }
    }

    #[test]
    fn test_log_path_is_under_log_dir() {
        if let (Some(dir), Some(path)) = (log_dir(), log_path()) {
            assert!(path.starts_with(dir));
        }
    }
}
