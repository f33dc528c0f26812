//! Element arena and reaction engine of the mock desktop

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::fixture::{DesktopFixture, NodeFixture, NumberInput, Reaction};
use super::Action;
use crate::common::{Error, Result};
use crate::uia::{ControlType, MouseButton, ENTER_KEY};

pub(super) type NodeId = usize;

#[derive(Debug)]
pub(super) struct Node {
    pub key: Option<String>,
    pub control_type: ControlType,
    pub name: String,
    /// Text content of edits; other elements only have a name
    pub value: String,
    pub automation_id: String,
    pub class_name: String,
    pub visible: bool,
    pub enabled: bool,
    pub active: bool,
    pub checked: Option<bool>,
    pub columns: Option<usize>,
    pub filters: Option<String>,
    pub number_input: Option<NumberInput>,
    /// Last value a number input accepted
    pub committed: String,
    pub filtered_out: bool,
    pub removed: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub on_click: Vec<Reaction>,
    pub on_double_click: Vec<Reaction>,
    pub on_right_click: Vec<Reaction>,
    pub on_key: BTreeMap<String, Vec<Reaction>>,
}

#[derive(Debug)]
pub(super) struct DesktopState {
    pub id: u64,
    pub process_id: u32,
    pub nodes: Vec<Node>,
    /// Open top-level windows, topmost last
    pub z_order: Vec<NodeId>,
    pub keys: HashMap<String, NodeId>,
    pub focused: Option<NodeId>,
    pub actions: Vec<Action>,
    pub after_click_wait: Duration,
}

impl DesktopState {
    pub fn build(id: u64, fixture: DesktopFixture) -> Result<Self> {
        let mut state = Self {
            id,
            process_id: fixture.process_id,
            nodes: Vec::new(),
            z_order: Vec::new(),
            keys: HashMap::new(),
            focused: None,
            actions: Vec::new(),
            after_click_wait: Duration::ZERO,
        };

        if fixture.windows.is_empty() {
            return Err(Error::Fixture("a desktop needs at least one window".to_string()));
        }

        for window in fixture.windows {
            let open = window.open.unwrap_or(true);
            let id = state.insert(window, None)?;
            if open {
                state.z_order.push(id);
            }
        }

        Ok(state)
    }

    fn insert(&mut self, fixture: NodeFixture, parent: Option<NodeId>) -> Result<NodeId> {
        let id = self.nodes.len();
        let default_type = if parent.is_none() {
            ControlType::Window
        } else {
            ControlType::Custom
        };

        if let Some(key) = &fixture.key {
            if self.keys.insert(key.clone(), id).is_some() {
                return Err(Error::Fixture(format!("duplicate key '{key}'")));
            }
        }

        self.nodes.push(Node {
            key: fixture.key,
            control_type: fixture.control_type.unwrap_or(default_type),
            name: fixture.name,
            committed: fixture.value.clone(),
            value: fixture.value,
            automation_id: fixture.automation_id,
            class_name: fixture.class_name,
            visible: fixture.visible,
            enabled: fixture.enabled,
            active: fixture.active,
            checked: fixture.checked,
            columns: fixture.columns,
            filters: fixture.filters,
            number_input: fixture.number_input,
            filtered_out: false,
            removed: false,
            parent,
            children: Vec::new(),
            on_click: fixture.on_click,
            on_double_click: fixture.on_double_click,
            on_right_click: fixture.on_right_click,
            on_key: fixture.on_key,
        });

        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }

        for child in fixture.children {
            self.insert(child, Some(id))?;
        }

        Ok(id)
    }

    pub fn describe(&self, id: NodeId) -> String {
        match self.nodes.get(id) {
            Some(node) if node.name.is_empty() => node.control_type.to_string(),
            Some(node) => format!("{} '{}'", node.control_type, node.name),
            None => format!("<unknown element {id}>"),
        }
    }

    pub fn root_of(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.nodes[id].parent {
            id = parent;
        }
        id
    }

    pub fn is_window(&self, id: NodeId) -> bool {
        self.nodes[id].parent.is_none()
    }

    /// An element is available while it exists and its window is open
    pub fn is_available(&self, id: NodeId) -> bool {
        match self.nodes.get(id) {
            Some(node) if !node.removed => self.z_order.contains(&self.root_of(id)),
            _ => false,
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        if self.is_available(id) {
            Ok(&self.nodes[id])
        } else {
            Err(Error::ElementNotAvailable(self.describe(id)))
        }
    }

    /// Children currently present in the tree
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.node(id)?;
        Ok(node
            .children
            .iter()
            .copied()
            .filter(|&c| !self.nodes[c].removed && !self.nodes[c].filtered_out)
            .collect())
    }

    pub fn is_active(&self, id: NodeId) -> Result<bool> {
        let node = self.node(id)?;
        if self.is_window(id) {
            return Ok(self.z_order.last() == Some(&id));
        }
        Ok(node.active || self.focused == Some(id))
    }

    pub fn grid_dimensions(&self, id: NodeId) -> Result<Option<(usize, usize)>> {
        let Some(columns) = self.node(id)?.columns else {
            return Ok(None);
        };
        let cells = self.children(id)?.len();
        let columns = columns.max(1);
        Ok(Some((cells.div_ceil(columns), columns)))
    }

    pub fn grid_item(&self, id: NodeId, row: usize, column: usize) -> Result<Option<NodeId>> {
        let Some((rows, columns)) = self.grid_dimensions(id)? else {
            return Ok(None);
        };
        let cells = self.children(id)?;
        match cells.get(row * columns + column) {
            Some(&cell) if column < columns => Ok(Some(cell)),
            _ => Err(Error::GridIndexOutOfRange {
                row,
                column,
                rows,
                columns,
            }),
        }
    }

    pub fn click(&mut self, id: NodeId, button: MouseButton, double: bool) -> Result<()> {
        let node = self.node(id)?;
        let enabled = node.enabled;
        self.actions.push(Action::Click {
            target: self.describe(id),
            button,
            double,
        });

        if !enabled {
            tracing::debug!(element = %self.describe(id), "click on disabled element ignored");
            return Ok(());
        }

        let node = &mut self.nodes[id];
        let reactions = match (button, double) {
            (MouseButton::Right, _) => node.on_right_click.clone(),
            (MouseButton::Left, true) => node.on_double_click.clone(),
            (MouseButton::Left, false) => {
                if let Some(checked) = node.checked {
                    node.checked = Some(!checked);
                }
                node.on_click.clone()
            }
        };
        self.apply_all(id, &reactions)
    }

    pub fn set_focus(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        self.actions.push(Action::Focus {
            target: self.describe(id),
        });
        self.focused = Some(id);
        self.raise(self.root_of(id));
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        let node = self.node(id)?;
        if !node.control_type.is_text_input() {
            return Err(Error::PatternNotSupported {
                pattern: "value",
                element: self.describe(id),
            });
        }
        self.actions.push(Action::SetText {
            target: self.describe(id),
            text: text.to_string(),
        });
        self.update_text(id, text.to_string())
    }

    pub fn type_keys(&mut self, id: NodeId, keys: &str) -> Result<()> {
        self.node(id)?;
        self.actions.push(Action::TypeKeys {
            target: self.describe(id),
            keys: keys.to_string(),
        });

        // Key handlers bubble up from the element to its window
        let mut current = Some(id);
        while let Some(node_id) = current {
            if let Some(reactions) = self.nodes[node_id].on_key.get(keys).cloned() {
                return self.apply_all(node_id, &reactions);
            }
            current = self.nodes[node_id].parent;
        }

        if !self.nodes[id].control_type.is_text_input() {
            return Ok(());
        }
        let typed = match self.nodes[id].number_input {
            Some(input) if keys == ENTER_KEY => {
                self.commit_number(id, input);
                return Ok(());
            }
            Some(_) => keys.chars().filter(char::is_ascii_digit).collect(),
            None => keys.to_string(),
        };
        let text = format!("{}{}", self.nodes[id].value, typed);
        self.update_text(id, text)
    }

    /// Accept the edit's number or fall back to the last accepted one
    fn commit_number(&mut self, id: NodeId, input: NumberInput) {
        let node = &mut self.nodes[id];
        match node.value.parse::<u64>() {
            Ok(number) if number >= input.min => {
                node.value = number.to_string();
                node.committed = node.value.clone();
            }
            _ => node.value = node.committed.clone(),
        }
    }

    fn update_text(&mut self, id: NodeId, text: String) -> Result<()> {
        if !self.nodes[id].control_type.is_text_input() {
            self.nodes[id].name = text;
            return Ok(());
        }

        let needle = text.to_lowercase();
        self.nodes[id].value = text;
        if let Some(grid_key) = self.nodes[id].filters.clone() {
            let grid = self.resolve(&grid_key)?;
            self.apply_filter(grid, &needle);
        }
        Ok(())
    }

    /// Hide the grid rows none of whose cells contain `needle`
    fn apply_filter(&mut self, grid: NodeId, needle: &str) {
        let columns = self.nodes[grid].columns.unwrap_or(1).max(1);
        let cells: Vec<NodeId> = self.nodes[grid]
            .children
            .iter()
            .copied()
            .filter(|&c| !self.nodes[c].removed)
            .collect();

        for row in cells.chunks(columns) {
            let keep = needle.is_empty()
                || row
                    .iter()
                    .any(|&c| self.nodes[c].name.to_lowercase().contains(needle));
            for &cell in row {
                self.nodes[cell].filtered_out = !keep;
            }
        }
    }

    fn resolve(&self, key: &str) -> Result<NodeId> {
        self.keys
            .get(key)
            .copied()
            .ok_or_else(|| Error::Fixture(format!("unknown key '{key}'")))
    }

    fn target(&self, origin: NodeId, target: &Option<String>) -> Result<NodeId> {
        match target {
            Some(key) => self.resolve(key),
            None => Ok(origin),
        }
    }

    fn raise(&mut self, window: NodeId) {
        self.z_order.retain(|&w| w != window);
        self.z_order.push(window);
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    fn apply_all(&mut self, origin: NodeId, reactions: &[Reaction]) -> Result<()> {
        for reaction in reactions {
            self.apply(origin, reaction)?;
        }
        Ok(())
    }

    fn apply(&mut self, origin: NodeId, reaction: &Reaction) -> Result<()> {
        tracing::trace!(origin = %self.describe(origin), ?reaction, "apply reaction");

        match reaction {
            Reaction::OpenWindow { target } => {
                let window = self.resolve(target)?;
                if !self.is_window(window) {
                    return Err(Error::Fixture(format!("'{target}' is not a window")));
                }
                self.raise(window);
            }
            Reaction::CloseWindow { target } => {
                let window = self.root_of(self.target(origin, target)?);
                self.z_order.retain(|&w| w != window);
                if let Some(focused) = self.focused {
                    if self.root_of(focused) == window {
                        self.focused = None;
                    }
                }
            }
            Reaction::MoveTo { target, parent } => {
                let id = self.target(origin, target)?;
                let parent = self.resolve(parent)?;
                self.reparent(id, parent);
            }
            Reaction::ToggleParent { target, between } => {
                let id = self.target(origin, target)?;
                let first = self.resolve(&between.0)?;
                let second = self.resolve(&between.1)?;
                let parent = if self.nodes[id].parent == Some(first) {
                    second
                } else {
                    first
                };
                self.reparent(id, parent);
            }
            Reaction::SetText { target, text } => {
                let id = self.target(origin, target)?;
                self.update_text(id, text.clone())?;
            }
            Reaction::SetVisible { target, value } => {
                let id = self.target(origin, target)?;
                self.nodes[id].visible = *value;
            }
            Reaction::ToggleVisible { target } => {
                let id = self.target(origin, target)?;
                self.nodes[id].visible = !self.nodes[id].visible;
            }
            Reaction::SetEnabled { target, value } => {
                let id = self.target(origin, target)?;
                self.nodes[id].enabled = *value;
            }
            Reaction::SetActive { target, value } => {
                let id = self.target(origin, target)?;
                self.nodes[id].active = *value;
            }
            Reaction::SetChecked { target, value } => {
                let id = self.target(origin, target)?;
                self.nodes[id].checked = Some(*value);
            }
            Reaction::AddChildren { parent, children } => {
                let parent = self.resolve(parent)?;
                for child in children {
                    self.insert(child.clone(), Some(parent))?;
                }
            }
            Reaction::Remove { target } => {
                let id = self.target(origin, target)?;
                self.detach(id);
                self.remove_subtree(id);
                if self.is_window(id) {
                    self.z_order.retain(|&w| w != id);
                }
                if let Some(focused) = self.focused {
                    if self.nodes[focused].removed {
                        self.focused = None;
                    }
                }
            }
            Reaction::Bind { target, on_click } => {
                let id = self.resolve(target)?;
                self.nodes[id].on_click = on_click.clone();
            }
        }
        Ok(())
    }

    fn reparent(&mut self, id: NodeId, parent: NodeId) {
        self.detach(id);
        self.nodes[id].parent = Some(parent);
        self.nodes[parent].children.push(id);
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            self.nodes[node].removed = true;
            if let Some(key) = self.nodes[node].key.clone() {
                self.keys.remove(&key);
            }
            stack.extend(self.nodes[node].children.iter().copied());
        }
    }
}
