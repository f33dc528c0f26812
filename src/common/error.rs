//! Error types for orbit-e2e
//!
//! Every failure of a run is fatal to that run. Messages name the search
//! parameters or the failed condition so a failing scenario can be diagnosed
//! from the log alone.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for orbit-e2e
#[derive(Error, Debug)]
pub enum Error {
    // === Application Errors ===
    #[error("Could not find application with a window title matching '{pattern}'. Make sure to start it before running E2E tests")]
    ApplicationNotFound { pattern: String },

    #[error("Application is no longer running")]
    ApplicationClosed,

    #[error("No UI automation backend on this platform. Pass --desktop <fixture> to run against a scripted desktop")]
    BackendUnavailable,

    #[error("UI automation error: {0}")]
    Automation(String),

    #[error("Could not find window '{0}'")]
    WindowNotFound(String),

    // === Element Errors ===
    #[error("Could not find element of type {control_type} ({filters})")]
    ElementNotFound {
        control_type: String,
        filters: String,
    },

    #[error("Element is no longer available: {0}")]
    ElementNotAvailable(String),

    #[error("Element {element} does not support the {pattern} pattern")]
    PatternNotSupported {
        pattern: &'static str,
        element: String,
    },

    #[error("Grid item ({row}, {column}) is out of range for a {rows}x{columns} grid")]
    GridIndexOutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    // === Test Errors ===
    #[error("Error executing test case {suite}, fragment {fragment}. Condition did not hold: \"{description}\"")]
    AssertionFailed {
        suite: String,
        fragment: String,
        description: String,
    },

    #[error("Timed out after {timeout_ms} ms waiting for {description}{}", last_error_suffix(.last_error))]
    WaitTimeout {
        timeout_ms: u64,
        description: String,
        last_error: Option<String>,
    },

    #[error("Cannot {action} while suite is {state}")]
    InvalidSuiteState { action: String, state: String },

    #[error("Unknown scenario '{0}'. Use 'orbit-e2e list' to see the available scenarios")]
    UnknownScenario(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid desktop fixture: {0}")]
    Fixture(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(" (last error: {e})"),
        None => String::new(),
    }
}

impl Error {
    /// Create an assertion failure for a fragment of a suite
    pub fn assertion_failed(suite: &str, fragment: &str, description: &str) -> Self {
        Self::AssertionFailed {
            suite: suite.to_string(),
            fragment: fragment.to_string(),
            description: description.to_string(),
        }
    }

    /// Create an invalid suite state error
    pub fn invalid_state(action: &str, state: impl std::fmt::Display) -> Self {
        Self::InvalidSuiteState {
            action: action.to_string(),
            state: state.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this is one of the fatal "not found" lookups
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ApplicationNotFound { .. }
                | Error::WindowNotFound(_)
                | Error::ElementNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_message_names_suite_and_fragment() {
        let err = Error::assertion_failed("Move tabs", "MoveTab", "Tab is visible");
        assert_eq!(
            err.to_string(),
            "Error executing test case Move tabs, fragment MoveTab. Condition did not hold: \"Tab is visible\""
        );
    }

    #[test]
    fn test_wait_timeout_includes_last_error() {
        let err = Error::WaitTimeout {
            timeout_ms: 200,
            description: "main window".to_string(),
            last_error: Some("boom".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 200 ms waiting for main window (last error: boom)"
        );

        let err = Error::WaitTimeout {
            timeout_ms: 200,
            description: "main window".to_string(),
            last_error: None,
        };
        assert_eq!(err.to_string(), "Timed out after 200 ms waiting for main window");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(Error::WindowNotFound("x".into()).is_not_found());
        assert!(!Error::ApplicationClosed.is_not_found());
    }
}
