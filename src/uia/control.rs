use std::fmt;
use std::sync::Arc;

use super::{ControlType, Element, MouseButton, RuntimeId};
use crate::common::{Error, Result};

/// Non-owning handle to a live element
///
/// Cloning is cheap. A control is not re-validated: once the element is gone
/// every call fails with `ElementNotAvailable`. Two controls are equal when
/// they refer to the same element.
#[derive(Clone)]
pub struct Control {
    element: Arc<dyn Element>,
}

impl Control {
    pub fn new(element: Arc<dyn Element>) -> Self {
        Self { element }
    }

    pub fn runtime_id(&self) -> RuntimeId {
        self.element.runtime_id()
    }

    pub fn describe(&self) -> String {
        self.element.describe()
    }

    pub fn control_type(&self) -> Result<ControlType> {
        self.element.control_type()
    }

    pub fn texts(&self) -> Result<Vec<String>> {
        self.element.texts()
    }

    /// The first text of the element, or an empty string
    pub fn text(&self) -> Result<String> {
        Ok(self.element.texts()?.into_iter().next().unwrap_or_default())
    }

    /// Current text of an edit, which follows its name; empty elsewhere
    pub fn value(&self) -> Result<String> {
        Ok(self.element.texts()?.into_iter().nth(1).unwrap_or_default())
    }

    pub fn automation_id(&self) -> Result<String> {
        self.element.automation_id()
    }

    pub fn class_name(&self) -> Result<String> {
        self.element.class_name()
    }

    pub fn children(&self) -> Result<Vec<Control>> {
        self.element.children()
    }

    /// Direct children of the given control type
    pub fn children_of_type(&self, control_type: ControlType) -> Result<Vec<Control>> {
        let mut matching = Vec::new();
        for child in self.children()? {
            if child.control_type()? == control_type {
                matching.push(child);
            }
        }
        Ok(matching)
    }

    /// Number of direct children
    pub fn control_count(&self) -> Result<usize> {
        Ok(self.children()?.len())
    }

    /// Number of rows for grids, number of item children otherwise
    pub fn item_count(&self) -> Result<usize> {
        if let Some((rows, _)) = self.element.grid_dimensions()? {
            return Ok(rows);
        }
        let mut count = 0;
        for child in self.children()? {
            if child.control_type()?.is_item() {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn parent(&self) -> Result<Option<Control>> {
        self.element.parent()
    }

    pub fn is_visible(&self) -> Result<bool> {
        self.element.is_visible()
    }

    pub fn is_enabled(&self) -> Result<bool> {
        self.element.is_enabled()
    }

    pub fn is_active(&self) -> Result<bool> {
        self.element.is_active()
    }

    pub fn toggle_state(&self) -> Result<Option<bool>> {
        self.element.toggle_state()
    }

    /// Whether the element still exists in the tree
    pub fn exists(&self) -> bool {
        self.element.control_type().is_ok()
    }

    pub fn click_input(&self, button: MouseButton) -> Result<()> {
        tracing::trace!(control = %self.describe(), %button, "click");
        self.element.click(button, false)
    }

    pub fn double_click_input(&self) -> Result<()> {
        tracing::trace!(control = %self.describe(), "double click");
        self.element.click(MouseButton::Left, true)
    }

    pub fn set_focus(&self) -> Result<()> {
        self.element.set_focus()
    }

    pub fn set_edit_text(&self, text: &str) -> Result<()> {
        self.element.set_text(text)
    }

    pub fn type_keys(&self, keys: &str) -> Result<()> {
        self.element.type_keys(keys)
    }

    /// Row and column count through the grid pattern
    pub fn grid_dimensions(&self) -> Result<(usize, usize)> {
        self.element
            .grid_dimensions()?
            .ok_or_else(|| Error::PatternNotSupported {
                pattern: "grid",
                element: self.describe(),
            })
    }

    pub fn grid_item(&self, row: usize, column: usize) -> Result<Control> {
        self.element.grid_item(row, column)
    }
}

impl PartialEq for Control {
    fn eq(&self, other: &Self) -> bool {
        self.runtime_id() == other.runtime_id()
    }
}

impl Eq for Control {}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Control({} @ {})", self.describe(), self.runtime_id())
    }
}
