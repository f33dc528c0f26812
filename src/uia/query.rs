//! Control lookup
//!
//! `find_control` walks the live tree below a parent and returns the first
//! element that matches every supplied filter. The walk is read-only and
//! visits elements in pre-order, so the first match in document order wins.

use std::fmt;

use serde::Deserialize;

use super::{Control, ControlType};
use crate::common::{Error, Result};

/// Search parameters for `find_control`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ControlQuery {
    pub control_type: ControlType,
    /// Exact match on the first text
    #[serde(default)]
    pub name: Option<String>,
    /// Substring match on the first text
    #[serde(default)]
    pub name_contains: Option<String>,
    /// Exact match on the automation id part after the last `.`
    #[serde(default)]
    pub auto_id_leaf: Option<String>,
    /// Exact match on the class name
    #[serde(default)]
    pub class_name: Option<String>,
    /// Search all descendants (default) or only the direct children
    #[serde(default = "default_recurse")]
    pub recurse: bool,
}

fn default_recurse() -> bool {
    true
}

impl ControlQuery {
    pub fn new(control_type: ControlType) -> Self {
        Self {
            control_type,
            name: None,
            name_contains: None,
            auto_id_leaf: None,
            class_name: None,
            recurse: true,
        }
    }

    /// Query by control type and exact name, the most common lookup
    pub fn named(control_type: ControlType, name: impl Into<String>) -> Self {
        Self::new(control_type).name(name)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    pub fn auto_id_leaf(mut self, leaf: impl Into<String>) -> Self {
        self.auto_id_leaf = Some(leaf.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Only look at the direct children of the parent
    pub fn direct_children(mut self) -> Self {
        self.recurse = false;
        self
    }

    /// Whether `control` satisfies every filter of this query
    ///
    /// Empty filter values match anything.
    pub fn matches(&self, control: &Control) -> Result<bool> {
        if control.control_type()? != self.control_type {
            return Ok(false);
        }
        if let Some(class_name) = active(&self.class_name) {
            if control.class_name()? != class_name {
                return Ok(false);
            }
        }
        let name = active(&self.name);
        let name_contains = active(&self.name_contains);
        if name.is_some() || name_contains.is_some() {
            let text = control.text()?;
            if let Some(name) = name {
                if text != name {
                    return Ok(false);
                }
            }
            if let Some(needle) = name_contains {
                if !text.contains(needle) {
                    return Ok(false);
                }
            }
        }
        if let Some(leaf) = active(&self.auto_id_leaf) {
            let automation_id = control.automation_id()?;
            let actual = automation_id.rsplit('.').next().unwrap_or_default();
            if actual != leaf {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn not_found(&self) -> Error {
        Error::ElementNotFound {
            control_type: self.control_type.to_string(),
            filters: self.filters(),
        }
    }

    fn filters(&self) -> String {
        fn show(value: &Option<String>) -> String {
            match active(value) {
                Some(v) => format!("\"{v}\""),
                None => "None".to_string(),
            }
        }
        format!(
            "name={}, name_contains={}, auto_id_leaf={}, class_name={}{}",
            show(&self.name),
            show(&self.name_contains),
            show(&self.auto_id_leaf),
            show(&self.class_name),
            if self.recurse { "" } else { ", direct children only" }
        )
    }
}

/// A filter value that takes part in matching; empty strings do not
fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl fmt::Display for ControlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.control_type)?;
        if let Some(name) = active(&self.name) {
            write!(f, " '{name}'")?;
        }
        if let Some(needle) = active(&self.name_contains) {
            write!(f, " containing '{needle}'")?;
        }
        if let Some(leaf) = active(&self.auto_id_leaf) {
            write!(f, " #{leaf}")?;
        }
        if let Some(class_name) = active(&self.class_name) {
            write!(f, " .{class_name}")?;
        }
        Ok(())
    }
}

/// Return the first descendant of `parent` matching `query`
///
/// Fails with `ElementNotFound`, naming every search parameter, when nothing
/// below `parent` matches.
pub fn find_control(parent: &Control, query: &ControlQuery) -> Result<Control> {
    try_find_control(parent, query)?.ok_or_else(|| query.not_found())
}

/// Like `find_control`, but `Ok(None)` when nothing matches
pub fn try_find_control(parent: &Control, query: &ControlQuery) -> Result<Option<Control>> {
    if !query.recurse {
        for child in parent.children()? {
            if query.matches(&child)? {
                return Ok(Some(child));
            }
        }
        return Ok(None);
    }

    let mut stack: Vec<Control> = parent.children()?.into_iter().rev().collect();
    while let Some(control) = stack.pop() {
        if query.matches(&control)? {
            return Ok(Some(control));
        }
        stack.extend(control.children()?.into_iter().rev());
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDesktop;
    use crate::uia::Application;

    const TREE: &str = r#"
windows:
  - name: orbitprofiler
    class_name: OrbitMainWindow
    children:
      - control_type: Group
        name: Outer
        children:
          - control_type: Button
            name: Refresh
            automation_id: MainWindow.outer.refreshButton
          - control_type: Button
            name: Close tab
            class_name: QToolButton
      - control_type: Button
        name: Refresh
        automation_id: MainWindow.refreshButton
      - control_type: Button
        name: Close
        class_name: QPushButton
"#;

    fn root() -> Control {
        MockDesktop::from_yaml(TREE).unwrap().top_window().unwrap()
    }

    #[test]
    fn test_first_match_in_preorder_wins() {
        let root = root();
        let found = find_control(&root, &ControlQuery::named(ControlType::Button, "Refresh")).unwrap();
        assert_eq!(
            found.automation_id().unwrap(),
            "MainWindow.outer.refreshButton"
        );
    }

    #[test]
    fn test_direct_children_only() {
        let root = root();
        let query = ControlQuery::named(ControlType::Button, "Refresh").direct_children();
        let found = find_control(&root, &query).unwrap();
        assert_eq!(found.automation_id().unwrap(), "MainWindow.refreshButton");
    }

    #[test]
    fn test_all_filters_must_match() {
        let root = root();
        let query = ControlQuery::new(ControlType::Button)
            .name_contains("Close")
            .class_name("QPushButton");
        let found = find_control(&root, &query).unwrap();
        assert_eq!(found.text().unwrap(), "Close");

        let query = ControlQuery::new(ControlType::Button).auto_id_leaf("refreshButton");
        let found = find_control(&root, &query).unwrap();
        assert_eq!(
            found.automation_id().unwrap(),
            "MainWindow.outer.refreshButton"
        );
    }

    #[test]
    fn test_not_found_names_search_parameters() {
        let root = root();
        let query = ControlQuery::named(ControlType::Button, "Open").class_name("QPushButton");
        let err = find_control(&root, &query).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find element of type Button (name=\"Open\", name_contains=None, auto_id_leaf=None, class_name=\"QPushButton\")"
        );
        assert!(try_find_control(&root, &query).unwrap().is_none());
    }

    #[test]
    fn test_type_mismatch_is_not_a_match() {
        let root = root();
        let query = ControlQuery::named(ControlType::Edit, "Refresh");
        assert!(try_find_control(&root, &query).unwrap().is_none());
    }

    #[test]
    fn test_empty_filters_are_ignored() {
        let root = root();
        let query = ControlQuery::new(ControlType::Button)
            .name("")
            .name_contains("")
            .auto_id_leaf("")
            .class_name("");
        let found = find_control(&root, &query).unwrap();
        assert_eq!(found.text().unwrap(), "Refresh");

        let query = ControlQuery::named(ControlType::Button, "Close").class_name("");
        let found = find_control(&root, &query).unwrap();
        assert_eq!(found.class_name().unwrap(), "QPushButton");
        assert_eq!(query.to_string(), "Button 'Close'");
        assert_eq!(
            query.not_found().to_string(),
            "Could not find element of type Button (name=\"Close\", name_contains=None, auto_id_leaf=None, class_name=None)"
        );
    }
}
