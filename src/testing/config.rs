//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML test scenarios.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::orbit::FragmentSpec;
use crate::suite::SuiteConfig;
use crate::uia::{ControlQuery, MouseButton};

/// A complete test scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct TestScenario {
    /// Name of the test scenario, used as the suite name
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// Optional shell commands to run before the test
    pub setup: Option<Vec<SetupStep>>,
    /// The application to attach to
    pub target: TargetConfig,
    /// The sequence of test steps to execute
    pub steps: Vec<TestStep>,
}

/// A setup step that runs before the test
#[derive(Deserialize, Debug)]
pub struct SetupStep {
    /// Shell command to execute
    pub shell: String,
}

/// The application under test and overrides of the run configuration
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Desktop fixture, relative to the scenario file; the running profiler when absent
    #[serde(default)]
    pub desktop: Option<PathBuf>,
    /// Window title pattern used to attach
    pub title_pattern: Option<String>,
    pub dev_mode: Option<bool>,
    pub auto_connect: Option<bool>,
    pub enable_ui_beta: Option<bool>,
    pub instance_filter: Option<String>,
}

impl TargetConfig {
    /// Apply the overrides of this target to a base configuration
    pub fn apply(&self, mut config: SuiteConfig) -> SuiteConfig {
        if let Some(pattern) = &self.title_pattern {
            config.title_pattern = pattern.clone();
        }
        if let Some(dev_mode) = self.dev_mode {
            config.dev_mode = dev_mode;
        }
        if let Some(auto_connect) = self.auto_connect {
            config.auto_connect = auto_connect;
        }
        if let Some(beta) = self.enable_ui_beta {
            config.enable_ui_beta = beta;
        }
        if self.instance_filter.is_some() {
            config.instance_filter = self.instance_filter.clone();
        }
        config
    }
}

/// A single test step in the execution flow
#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Run a built-in Orbit fragment
    Fragment(FragmentSpec),
    /// Click a control
    Click {
        control: ControlSpec,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        double: bool,
    },
    /// Replace the text of an edit control
    SetText { control: ControlSpec, text: String },
    /// Send keystrokes to a control (the top window by default)
    TypeKeys {
        control: Option<ControlSpec>,
        keys: String,
    },
    /// Assert that a control exists, optionally checking its state
    ExpectControl {
        control: ControlSpec,
        expect: Option<ControlExpectation>,
    },
    /// Assert that no control matches
    ExpectMissing { control: ControlSpec },
    /// Poll until a control exists and satisfies the expectation
    WaitFor {
        control: ControlSpec,
        /// Timeout in milliseconds (default: the main window timeout)
        timeout_ms: Option<u64>,
        expect: Option<ControlExpectation>,
    },
    /// Assert properties of the current top window
    ExpectTopWindow {
        class_name: Option<String>,
        title: Option<String>,
    },
    /// Scan a data view for a row
    FindRow {
        /// The group holding the data view
        panel: ControlSpec,
        text: String,
        #[serde(default)]
        column: usize,
        #[serde(default)]
        partial: bool,
        /// Expected row index; missing or null when no row may match
        expect_row: Option<usize>,
    },
    /// Pause for a fixed time
    Sleep { millis: u64 },
}

impl TestStep {
    /// Short label used for fragment names and output
    pub fn describe(&self) -> String {
        match self {
            TestStep::Fragment(spec) => spec.to_string(),
            TestStep::Click {
                control,
                button,
                double,
            } => {
                let kind = if *double { "double click" } else { "click" };
                match button {
                    MouseButton::Left => format!("{kind} {control}"),
                    MouseButton::Right => format!("right {kind} {control}"),
                }
            }
            TestStep::SetText { control, text } => format!("set text of {control} to \"{text}\""),
            TestStep::TypeKeys { control, keys } => match control {
                Some(control) => format!("type \"{keys}\" into {control}"),
                None => format!("type \"{keys}\""),
            },
            TestStep::ExpectControl { control, .. } => format!("expect {control}"),
            TestStep::ExpectMissing { control } => format!("expect no {control}"),
            TestStep::WaitFor { control, .. } => format!("wait for {control}"),
            TestStep::ExpectTopWindow { class_name, title } => {
                let mut parts = Vec::new();
                if let Some(title) = title {
                    parts.push(format!("title \"{title}\""));
                }
                if let Some(class_name) = class_name {
                    parts.push(format!("class {class_name}"));
                }
                format!("expect top window {}", parts.join(", "))
            }
            TestStep::FindRow { panel, text, .. } => format!("find \"{text}\" in {panel}"),
            TestStep::Sleep { millis } => format!("sleep {millis} ms"),
        }
    }
}

/// Describes a control relative to a parent control, a window, or the top window
#[derive(Deserialize, Debug, Clone)]
pub struct ControlSpec {
    #[serde(flatten)]
    pub query: ControlQuery,
    /// Search below this control instead of the window
    pub parent: Option<Box<ControlSpec>>,
    /// Search in this window (best match on title, id or class)
    pub window: Option<String>,
}

impl fmt::Display for ControlSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)?;
        if let Some(parent) = &self.parent {
            write!(f, " in {parent}")?;
        } else if let Some(window) = &self.window {
            write!(f, " in window '{window}'")?;
        }
        Ok(())
    }
}

/// State checks for a control; every field set must hold
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ControlExpectation {
    pub text: Option<String>,
    pub text_contains: Option<String>,
    pub visible: Option<bool>,
    pub enabled: Option<bool>,
    pub active: Option<bool>,
    pub checked: Option<bool>,
    /// Grid rows, or children for controls without the grid pattern
    pub item_count: Option<usize>,
    pub control_count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uia::ControlType;

    #[test]
    fn test_parse_scenario() {
        let scenario: TestScenario = serde_yaml::from_str(
            r#"
name: Move tabs
target:
  desktop: orbit_desktop.yaml
  enable_ui_beta: false
steps:
  - action: fragment
    fragment: connect_to_instance
  - action: click
    control: { control_type: TabItem, name: Functions }
    button: right
  - action: expect_control
    control:
      control_type: MenuItem
      name_contains: Move
      window: TabBarContextMenu
    expect: { visible: true }
  - action: find_row
    panel: { control_type: Group, name: ProcessesDataView }
    text: sshd
    expect_row: 1
  - action: sleep
    millis: 10
"#,
        )
        .unwrap();

        assert_eq!(scenario.steps.len(), 5);
        assert!(matches!(
            scenario.steps[0],
            TestStep::Fragment(FragmentSpec::ConnectToInstance)
        ));
        match &scenario.steps[1] {
            TestStep::Click {
                control,
                button,
                double,
            } => {
                assert_eq!(control.query, ControlQuery::named(ControlType::TabItem, "Functions"));
                assert_eq!(*button, MouseButton::Right);
                assert!(!double);
            }
            other => panic!("unexpected step {other:?}"),
        }
        match &scenario.steps[2] {
            TestStep::ExpectControl { control, expect } => {
                assert_eq!(control.window.as_deref(), Some("TabBarContextMenu"));
                assert_eq!(expect.as_ref().unwrap().visible, Some(true));
            }
            other => panic!("unexpected step {other:?}"),
        }
        assert_eq!(
            scenario.steps[1].describe(),
            "right click TabItem 'Functions'"
        );
    }

    #[test]
    fn test_nested_parent_display() {
        let spec: ControlSpec = serde_yaml::from_str(
            "control_type: Tab\nrecurse: false\nparent: { control_type: Group, name: RightTabWidget }\n",
        )
        .unwrap();
        assert!(!spec.query.recurse);
        assert_eq!(spec.to_string(), "Tab in Group 'RightTabWidget'");
    }

    #[test]
    fn test_target_overrides() {
        let target: TargetConfig = serde_yaml::from_str(
            "desktop: d.yaml\ndev_mode: true\ninstance_filter: eu\n",
        )
        .unwrap();
        let config = target.apply(SuiteConfig::fast());
        assert!(config.dev_mode);
        assert!(config.auto_connect);
        assert_eq!(config.instance_filter.as_deref(), Some("eu"));
    }

    #[test]
    fn test_target_without_desktop() {
        let target: TargetConfig = serde_yaml::from_str("title_pattern: ^orbit\n").unwrap();
        assert!(target.desktop.is_none());
        assert_eq!(target.apply(SuiteConfig::fast()).title_pattern, "^orbit");
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<TestStep, _> = serde_yaml::from_str("action: drag\n");
        assert!(result.is_err());
    }
}
