//! Explicit run configuration handed to a suite

use std::time::Duration;

use crate::common::config::Config;
use crate::uia::Timings;

/// Everything a suite and its fragments may consult
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Regular expression matched against window titles when attaching
    pub title_pattern: String,
    /// Class name of the profiler main window
    pub main_window_class: String,
    /// Expect the main window to be open already and leave the application running
    pub dev_mode: bool,
    /// Connect to an instance during set-up
    pub auto_connect: bool,
    /// Expect the application to be started with the new UI
    pub enable_ui_beta: bool,
    /// Only connect to instances whose name contains this text
    pub instance_filter: Option<String>,
    pub timings: Timings,
    pub timeouts: SuiteTimeouts,
}

/// Bounds of the polled waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteTimeouts {
    pub attach: Duration,
    pub main_window: Duration,
    pub instance_list: Duration,
    pub process_list: Duration,
    pub processes_frame: Duration,
    pub process_list_active: Duration,
    pub symbol_loading: Duration,
    pub view_update: Duration,
    pub overlay_settle: Duration,
    pub capture_duration: Duration,
}

impl SuiteConfig {
    /// Resolve a suite configuration from the configuration file
    pub fn from_config(config: &Config) -> Self {
        let t = &config.timeouts;
        Self {
            title_pattern: config.application.title_pattern.clone(),
            main_window_class: config.application.main_window_class.clone(),
            dev_mode: config.flags.dev_mode,
            auto_connect: config.flags.auto_connect,
            enable_ui_beta: config.flags.enable_ui_beta,
            instance_filter: config.flags.instance_filter.clone(),
            timings: Timings {
                after_click_wait: Duration::from_millis(t.after_click_wait_ms),
                poll_interval: Duration::from_millis(t.poll_interval_ms),
            },
            timeouts: SuiteTimeouts {
                attach: Duration::from_secs(t.attach_secs),
                main_window: Duration::from_secs(t.main_window_secs),
                instance_list: Duration::from_secs(t.instance_list_secs),
                process_list: Duration::from_secs(t.process_list_secs),
                processes_frame: Duration::from_secs(t.processes_frame_secs),
                process_list_active: Duration::from_secs(t.process_list_active_secs),
                symbol_loading: Duration::from_secs(t.symbol_loading_secs),
                view_update: Duration::from_secs(t.view_update_secs),
                overlay_settle: Duration::from_millis(t.overlay_settle_ms),
                capture_duration: Duration::from_millis(t.capture_duration_ms),
            },
        }
    }

    /// Short waits and no pauses, for in-memory desktops
    pub fn fast() -> Self {
        let mut config = Self::default();
        config.timings = Timings::instant();
        config.timeouts = SuiteTimeouts {
            attach: Duration::from_millis(200),
            main_window: Duration::from_millis(200),
            instance_list: Duration::from_millis(200),
            process_list: Duration::from_millis(200),
            processes_frame: Duration::from_millis(200),
            process_list_active: Duration::from_millis(200),
            symbol_loading: Duration::from_millis(200),
            view_update: Duration::from_millis(200),
            overlay_settle: Duration::ZERO,
            capture_duration: Duration::ZERO,
        };
        config
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    pub fn with_ui_beta(mut self, enable_ui_beta: bool) -> Self {
        self.enable_ui_beta = enable_ui_beta;
        self
    }

    pub fn with_instance_filter(mut self, filter: Option<String>) -> Self {
        self.instance_filter = filter;
        self
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_converts_units() {
        let config = Config::parse(
            r#"
[flags]
enable_ui_beta = true

[timeouts]
overlay_settle_ms = 250
instance_list_secs = 7
"#,
        )
        .unwrap();
        let suite = SuiteConfig::from_config(&config);
        assert!(suite.enable_ui_beta);
        assert_eq!(suite.timeouts.overlay_settle, Duration::from_millis(250));
        assert_eq!(suite.timeouts.instance_list, Duration::from_secs(7));
        assert_eq!(suite.timings.after_click_wait, Duration::from_millis(500));
    }

    #[test]
    fn test_builders_override_flags() {
        let suite = SuiteConfig::fast()
            .with_dev_mode(true)
            .with_auto_connect(false)
            .with_instance_filter(Some("gamelet".to_string()));
        assert!(suite.dev_mode);
        assert!(!suite.auto_connect);
        assert_eq!(suite.instance_filter.as_deref(), Some("gamelet"));
        assert_eq!(suite.timings.after_click_wait, Duration::ZERO);
    }
}
