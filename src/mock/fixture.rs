//! Desktop fixture format
//!
//! A fixture lists the top-level windows of one application and their
//! element trees. Elements may carry reactions that run when they are
//! clicked or receive keys, which is enough to script the screen changes a
//! scenario expects.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::uia::ControlType;

/// A whole desktop: one application with its windows
#[derive(Debug, Clone, Deserialize)]
pub struct DesktopFixture {
    #[serde(default = "default_process_id")]
    pub process_id: u32,
    pub windows: Vec<NodeFixture>,
}

fn default_process_id() -> u32 {
    4242
}

/// One element and its subtree
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeFixture {
    /// Fixture-only handle used by reactions
    #[serde(default)]
    pub key: Option<String>,
    /// Defaults to `Window` for top-level nodes and `Custom` elsewhere
    #[serde(default)]
    pub control_type: Option<ControlType>,
    #[serde(default)]
    pub name: String,
    /// Initial text of an edit
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub automation_id: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub active: bool,
    /// Toggle state; clicking an element with a toggle state flips it
    #[serde(default)]
    pub checked: Option<bool>,
    /// Makes the element a grid: children are cells, row-major
    #[serde(default)]
    pub columns: Option<usize>,
    /// Key of a grid whose rows are filtered by this element's text
    #[serde(default)]
    pub filters: Option<String>,
    /// Makes an edit accept digits only and commit a whole number on Enter
    #[serde(default)]
    pub number_input: Option<NumberInput>,
    /// Whether a top-level window starts open (default true)
    #[serde(default)]
    pub open: Option<bool>,
    #[serde(default)]
    pub on_click: Vec<Reaction>,
    #[serde(default)]
    pub on_double_click: Vec<Reaction>,
    #[serde(default)]
    pub on_right_click: Vec<Reaction>,
    /// Reactions to exact key sequences typed on this element or a descendant
    #[serde(default)]
    pub on_key: BTreeMap<String, Vec<Reaction>>,
    #[serde(default)]
    pub children: Vec<NodeFixture>,
}

fn default_true() -> bool {
    true
}

/// Validation of a numeric edit
///
/// On commit a value below `min` (or no value) is replaced by the last
/// committed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumberInput {
    #[serde(default)]
    pub min: u64,
}

/// A scripted change of the desktop
///
/// A missing `target` means the element the reaction is attached to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "do", rename_all = "snake_case")]
pub enum Reaction {
    /// Open a top-level window and raise it
    OpenWindow { target: String },
    /// Close a top-level window (by default the one containing the element)
    CloseWindow { target: Option<String> },
    /// Re-parent an element as the last child of `parent`
    MoveTo { target: Option<String>, parent: String },
    /// Move an element to whichever of the two parents it is not under
    ToggleParent {
        target: Option<String>,
        between: (String, String),
    },
    SetText { target: Option<String>, text: String },
    SetVisible { target: Option<String>, value: bool },
    ToggleVisible { target: Option<String> },
    SetEnabled { target: Option<String>, value: bool },
    SetActive { target: Option<String>, value: bool },
    SetChecked { target: Option<String>, value: bool },
    /// Append new elements below `parent`
    AddChildren {
        parent: String,
        children: Vec<NodeFixture>,
    },
    /// Remove an element and its subtree
    Remove { target: Option<String> },
    /// Replace the click reactions of another element
    Bind {
        target: String,
        #[serde(default)]
        on_click: Vec<Reaction>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reactions() {
        let node: NodeFixture = serde_yaml::from_str(
            r#"
control_type: TabItem
name: Functions
on_right_click:
  - do: open_window
    target: tab_menu
  - do: bind
    target: move_item
    on_click:
      - do: toggle_parent
        target: functions
        between: [left_bar, right_bar]
      - do: close_window
"#,
        )
        .unwrap();

        assert_eq!(node.control_type, Some(ControlType::TabItem));
        assert_eq!(node.on_right_click.len(), 2);
        match &node.on_right_click[1] {
            Reaction::Bind { target, on_click } => {
                assert_eq!(target, "move_item");
                assert_eq!(
                    on_click[0],
                    Reaction::ToggleParent {
                        target: Some("functions".to_string()),
                        between: ("left_bar".to_string(), "right_bar".to_string()),
                    }
                );
                assert_eq!(on_click[1], Reaction::CloseWindow { target: None });
            }
            other => panic!("expected Bind, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_number_input() {
        let node: NodeFixture = serde_yaml::from_str(
            "control_type: Edit\nvalue: \"10\"\nnumber_input: { min: 1 }\n",
        )
        .unwrap();
        assert_eq!(node.number_input, Some(NumberInput { min: 1 }));
        assert_eq!(node.value, "10");
    }

    #[test]
    fn test_unknown_node_field_is_rejected() {
        let result: Result<NodeFixture, _> = serde_yaml::from_str("name: x\ncolour: red\n");
        assert!(result.is_err());
    }
}
