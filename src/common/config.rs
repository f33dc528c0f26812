//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// How to find the application under test
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Default values for the run flags
    #[serde(default)]
    pub flags: Flags,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Application lookup settings
#[derive(Debug, Deserialize)]
pub struct ApplicationConfig {
    /// Regular expression matched against top-level window titles
    #[serde(default = "default_title_pattern")]
    pub title_pattern: String,

    /// Class name of the profiler main window
    #[serde(default = "default_main_window_class")]
    pub main_window_class: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            title_pattern: default_title_pattern(),
            main_window_class: default_main_window_class(),
        }
    }
}

fn default_title_pattern() -> String {
    "orbitprofiler".to_string()
}

fn default_main_window_class() -> String {
    "OrbitMainWindow".to_string()
}

/// Run flags, overridable from the command line
#[derive(Debug, Deserialize)]
pub struct Flags {
    /// Expect the main window to be open already and leave the application running
    #[serde(default)]
    pub dev_mode: bool,

    /// Expect the application to be started with the new UI
    #[serde(default)]
    pub enable_ui_beta: bool,

    /// Connect to an instance during set-up
    #[serde(default = "default_auto_connect")]
    pub auto_connect: bool,

    /// Only connect to instances whose name contains this text
    #[serde(default)]
    pub instance_filter: Option<String>,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            dev_mode: false,
            enable_ui_beta: false,
            auto_connect: default_auto_connect(),
            instance_filter: None,
        }
    }
}

fn default_auto_connect() -> bool {
    true
}

/// Timeout settings
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// How long set-up waits for the application to show a window
    #[serde(default = "default_attach")]
    pub attach_secs: u64,

    /// How long to wait for the main window after connecting
    #[serde(default = "default_main_window")]
    pub main_window_secs: u64,

    /// How long to wait for the first instance to show up
    #[serde(default = "default_instance_list")]
    pub instance_list_secs: u64,

    /// How long to wait for the process list to fill
    #[serde(default = "default_process_list")]
    pub process_list_secs: u64,

    /// How long to wait for the processes frame to be enabled (UI beta)
    #[serde(default = "default_processes_frame")]
    pub processes_frame_secs: u64,

    /// How long to wait for the process list to become active (UI beta)
    #[serde(default = "default_process_list_active")]
    pub process_list_active_secs: u64,

    /// How long to wait for the symbols of a module to load
    #[serde(default = "default_symbol_loading")]
    pub symbol_loading_secs: u64,

    /// How long to wait for a view to reflect a filter or menu action
    #[serde(default = "default_view_update")]
    pub view_update_secs: u64,

    /// Pause for the loading overlay of the tables to disappear (UI beta)
    #[serde(default = "default_overlay_settle")]
    pub overlay_settle_ms: u64,

    /// Interval between two checks of a polled condition
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Pause after every click
    #[serde(default = "default_after_click_wait")]
    pub after_click_wait_ms: u64,

    /// Default length of a capture
    #[serde(default = "default_capture_duration")]
    pub capture_duration_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            attach_secs: default_attach(),
            main_window_secs: default_main_window(),
            instance_list_secs: default_instance_list(),
            process_list_secs: default_process_list(),
            processes_frame_secs: default_processes_frame(),
            process_list_active_secs: default_process_list_active(),
            symbol_loading_secs: default_symbol_loading(),
            view_update_secs: default_view_update(),
            overlay_settle_ms: default_overlay_settle(),
            poll_interval_ms: default_poll_interval(),
            after_click_wait_ms: default_after_click_wait(),
            capture_duration_ms: default_capture_duration(),
        }
    }
}

fn default_attach() -> u64 {
    30
}
fn default_main_window() -> u64 {
    30
}
fn default_instance_list() -> u64 {
    100
}
fn default_process_list() -> u64 {
    30
}
fn default_processes_frame() -> u64 {
    15
}
fn default_process_list_active() -> u64 {
    10
}
fn default_symbol_loading() -> u64 {
    60
}
fn default_view_update() -> u64 {
    10
}
fn default_overlay_settle() -> u64 {
    2000
}
fn default_poll_interval() -> u64 {
    500
}
fn default_after_click_wait() -> u64 {
    500
}
fn default_capture_duration() -> u64 {
    5000
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.application.title_pattern, "orbitprofiler");
        assert_eq!(config.application.main_window_class, "OrbitMainWindow");
        assert!(config.flags.auto_connect);
        assert!(!config.flags.dev_mode);
        assert_eq!(config.timeouts.instance_list_secs, 100);
        assert_eq!(config.timeouts.after_click_wait_ms, 500);
        assert_eq!(config.timeouts.symbol_loading_secs, 60);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
[flags]
dev_mode = true
instance_filter = "gamelet-2"

[timeouts]
poll_interval_ms = 10
"#,
        )
        .unwrap();

        assert!(config.flags.dev_mode);
        assert_eq!(config.flags.instance_filter.as_deref(), Some("gamelet-2"));
        assert!(config.flags.auto_connect);
        assert_eq!(config.timeouts.poll_interval_ms, 10);
        assert_eq!(config.timeouts.main_window_secs, 30);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[application]\ntitle_pattern = \"^orbit\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.application.title_pattern, "^orbit");

        let err = Config::load_from(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::FileRead { .. }));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let err = Config::parse("[flags]\ndev_mode = \"maybe\"").unwrap_err();
        assert!(matches!(err, crate::Error::ConfigParse(_)));
    }
}
