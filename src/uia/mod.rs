//! Accessibility tree abstraction
//!
//! The traits here are the seam between the scenarios and whatever exposes
//! the application's widget tree. Everything that touches the live UI
//! returns a `Result`, since elements disappear whenever the UI changes.

mod control;
mod control_type;
#[cfg(windows)]
mod native;
pub mod query;
pub mod wait;

pub use control::Control;
pub use control_type::ControlType;
pub use query::{find_control, try_find_control, ControlQuery};
pub use wait::{wait_for_condition, Timings};

#[cfg(windows)]
pub use native::NativeBackend;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// Identity of a live element, stable for as long as the element exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeId(pub u64);

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Mouse button used for a click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
        }
    }
}

/// Key sequence that commits the text of an edit
pub const ENTER_KEY: &str = "{ENTER}";

/// A node of the accessibility tree
pub trait Element: Send + Sync {
    /// Identity used for equality between controls
    fn runtime_id(&self) -> RuntimeId;

    /// Short human readable description, usable even when the element is gone
    fn describe(&self) -> String;

    fn control_type(&self) -> Result<ControlType>;

    /// Texts of the element; the first one is its name
    fn texts(&self) -> Result<Vec<String>>;

    fn automation_id(&self) -> Result<String>;

    fn class_name(&self) -> Result<String>;

    fn children(&self) -> Result<Vec<Control>>;

    fn parent(&self) -> Result<Option<Control>>;

    fn is_visible(&self) -> Result<bool>;

    fn is_enabled(&self) -> Result<bool>;

    /// Whether the element (or its window) has the keyboard focus
    fn is_active(&self) -> Result<bool>;

    /// Toggle state for check boxes and toggle buttons
    fn toggle_state(&self) -> Result<Option<bool>> {
        Ok(None)
    }

    fn click(&self, button: MouseButton, double: bool) -> Result<()>;

    fn set_focus(&self) -> Result<()>;

    /// Replace the text of an edit control
    fn set_text(&self, text: &str) -> Result<()>;

    /// Send keystrokes while this element has the focus
    fn type_keys(&self, keys: &str) -> Result<()>;

    /// Row and column count when the element supports the grid pattern
    fn grid_dimensions(&self) -> Result<Option<(usize, usize)>> {
        Ok(None)
    }

    /// Cell of a grid
    ///
    /// Backends that only expose realized items cannot index columns hidden
    /// by scrolling correctly, so results for scrolled-out columns may be off.
    fn grid_item(&self, _row: usize, _column: usize) -> Result<Control> {
        Err(Error::PatternNotSupported {
            pattern: "grid",
            element: self.describe(),
        })
    }
}

/// A running application the suite is attached to
pub trait Application: Send + Sync {
    fn process_id(&self) -> u32;

    /// Whether any of the application's windows is still open
    fn is_running(&self) -> bool;

    /// Open top-level windows, topmost last
    fn windows(&self) -> Result<Vec<Control>>;

    /// The topmost open window
    fn top_window(&self) -> Result<Control> {
        self.windows()?
            .pop()
            .ok_or_else(|| Error::WindowNotFound("top window".to_string()))
    }

    /// Find an open window by title, automation id, class name, or title substring
    fn window(&self, best_match: &str) -> Result<Control> {
        let windows = self.windows()?;

        for window in windows.iter().rev() {
            if window.text()? == best_match {
                return Ok(window.clone());
            }
        }
        for window in windows.iter().rev() {
            if window.automation_id()? == best_match || window.class_name()? == best_match {
                return Ok(window.clone());
            }
        }
        let needle = best_match.to_lowercase();
        for window in windows.iter().rev() {
            if window.text()?.to_lowercase().contains(&needle) {
                return Ok(window.clone());
            }
        }

        Err(Error::WindowNotFound(best_match.to_string()))
    }

    /// Apply input timings for the rest of the session
    fn apply_timings(&self, timings: &Timings);
}

/// Something that can attach to a running application
pub trait Backend: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Attach to the application owning a window whose title matches `title_pattern`
    fn connect(&self, title_pattern: &regex::Regex) -> Result<Arc<dyn Application>>;
}

/// The UI Automation backend of this platform
pub fn native_backend() -> Result<Box<dyn Backend>> {
    #[cfg(windows)]
    {
        Ok(Box::new(NativeBackend))
    }
    #[cfg(not(windows))]
    {
        Err(Error::BackendUnavailable)
    }
}

/// Compile a window title pattern
pub fn title_regex(pattern: &str) -> Result<regex::Regex> {
    regex::Regex::new(pattern)
        .map_err(|e| Error::Config(format!("invalid title pattern '{}': {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_regex() {
        let pattern = title_regex("^orbitprofiler").unwrap();
        assert!(pattern.is_match("orbitprofiler - Session setup"));
        assert!(matches!(title_regex("orbit("), Err(Error::Config(_))));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_no_native_backend_off_windows() {
        let err = native_backend().err().unwrap();
        assert!(matches!(err, Error::BackendUnavailable));
        assert!(err.to_string().contains("--desktop"));
    }
}
