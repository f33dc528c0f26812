//! Scripted in-memory desktop
//!
//! Implements the accessibility traits over a tree loaded from a fixture
//! file, so scenarios can run without the real application. Reactions in the
//! fixture stand in for the application's behaviour; every interaction is
//! recorded in an action log.

mod fixture;
mod state;

pub use fixture::{DesktopFixture, NodeFixture, Reaction};

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::common::{Error, Result};
use crate::uia::{
    Application, Backend, Control, ControlType, Element, MouseButton, RuntimeId, Timings,
};
use state::{DesktopState, NodeId};

static NEXT_DESKTOP_ID: AtomicU64 = AtomicU64::new(1);

/// One recorded interaction with the desktop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Click {
        target: String,
        button: MouseButton,
        double: bool,
    },
    Focus {
        target: String,
    },
    SetText {
        target: String,
        text: String,
    },
    TypeKeys {
        target: String,
        keys: String,
    },
}

/// An application with its windows, backed by a fixture
#[derive(Clone)]
pub struct MockDesktop {
    state: Arc<Mutex<DesktopState>>,
}

impl MockDesktop {
    pub fn from_fixture(fixture: DesktopFixture) -> Result<Self> {
        let id = NEXT_DESKTOP_ID.fetch_add(1, Ordering::Relaxed);
        let state = DesktopState::build(id, fixture)?;
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Parse a fixture from YAML (or JSON) text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let fixture: DesktopFixture =
            serde_yaml::from_str(content).map_err(|e| Error::Fixture(e.to_string()))?;
        Self::from_fixture(fixture)
    }

    /// Load a fixture file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::from_yaml(&content).map_err(|e| match e {
            Error::Fixture(msg) => Error::Fixture(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// A backend that attaches to this desktop
    pub fn backend(&self) -> MockBackend {
        MockBackend {
            desktop: self.clone(),
        }
    }

    /// Look an element up by its fixture key
    pub fn element(&self, key: &str) -> Result<Control> {
        let state = self.lock();
        let id = state
            .keys
            .get(key)
            .copied()
            .ok_or_else(|| Error::Fixture(format!("unknown key '{key}'")))?;
        Ok(self.control(&state, id))
    }

    /// Interactions so far, oldest first
    pub fn actions(&self) -> Vec<Action> {
        self.lock().actions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, DesktopState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn control(&self, state: &DesktopState, id: NodeId) -> Control {
        Control::new(Arc::new(MockElement {
            state: Arc::clone(&self.state),
            desktop_id: state.id,
            id,
        }))
    }

    fn controls(&self, state: &DesktopState, ids: impl IntoIterator<Item = NodeId>) -> Vec<Control> {
        ids.into_iter().map(|id| self.control(state, id)).collect()
    }
}

impl Application for MockDesktop {
    fn process_id(&self) -> u32 {
        self.lock().process_id
    }

    fn is_running(&self) -> bool {
        !self.lock().z_order.is_empty()
    }

    fn windows(&self) -> Result<Vec<Control>> {
        let state = self.lock();
        if state.z_order.is_empty() {
            return Err(Error::ApplicationClosed);
        }
        Ok(self.controls(&state, state.z_order.clone()))
    }

    fn apply_timings(&self, timings: &Timings) {
        self.lock().after_click_wait = timings.after_click_wait;
    }
}

/// Backend attaching to a single `MockDesktop`
pub struct MockBackend {
    desktop: MockDesktop,
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn connect(&self, title_pattern: &regex::Regex) -> Result<Arc<dyn Application>> {
        let found = {
            let state = self.desktop.lock();
            state
                .z_order
                .iter()
                .any(|&w| title_pattern.is_match(&state.nodes[w].name))
        };

        if found {
            Ok(Arc::new(self.desktop.clone()))
        } else {
            Err(Error::ApplicationNotFound {
                pattern: title_pattern.as_str().to_string(),
            })
        }
    }
}

struct MockElement {
    state: Arc<Mutex<DesktopState>>,
    desktop_id: u64,
    id: NodeId,
}

impl MockElement {
    fn lock(&self) -> MutexGuard<'_, DesktopState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn control(&self, id: NodeId) -> Control {
        Control::new(Arc::new(MockElement {
            state: Arc::clone(&self.state),
            desktop_id: self.desktop_id,
            id,
        }))
    }

    fn after_click(&self) {
        let wait = self.lock().after_click_wait;
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}

impl Element for MockElement {
    fn runtime_id(&self) -> RuntimeId {
        RuntimeId((self.desktop_id << 32) | self.id as u64)
    }

    fn describe(&self) -> String {
        self.lock().describe(self.id)
    }

    fn control_type(&self) -> Result<ControlType> {
        Ok(self.lock().node(self.id)?.control_type)
    }

    fn texts(&self) -> Result<Vec<String>> {
        let state = self.lock();
        let node = state.node(self.id)?;
        if node.control_type.is_text_input() {
            Ok(vec![node.name.clone(), node.value.clone()])
        } else {
            Ok(vec![node.name.clone()])
        }
    }

    fn automation_id(&self) -> Result<String> {
        Ok(self.lock().node(self.id)?.automation_id.clone())
    }

    fn class_name(&self) -> Result<String> {
        Ok(self.lock().node(self.id)?.class_name.clone())
    }

    fn children(&self) -> Result<Vec<Control>> {
        let children = self.lock().children(self.id)?;
        Ok(children.into_iter().map(|id| self.control(id)).collect())
    }

    fn parent(&self) -> Result<Option<Control>> {
        let parent = self.lock().node(self.id)?.parent;
        Ok(parent.map(|id| self.control(id)))
    }

    fn is_visible(&self) -> Result<bool> {
        Ok(self.lock().node(self.id)?.visible)
    }

    fn is_enabled(&self) -> Result<bool> {
        Ok(self.lock().node(self.id)?.enabled)
    }

    fn is_active(&self) -> Result<bool> {
        self.lock().is_active(self.id)
    }

    fn toggle_state(&self) -> Result<Option<bool>> {
        Ok(self.lock().node(self.id)?.checked)
    }

    fn click(&self, button: MouseButton, double: bool) -> Result<()> {
        self.lock().click(self.id, button, double)?;
        self.after_click();
        Ok(())
    }

    fn set_focus(&self) -> Result<()> {
        self.lock().set_focus(self.id)
    }

    fn set_text(&self, text: &str) -> Result<()> {
        self.lock().set_text(self.id, text)
    }

    fn type_keys(&self, keys: &str) -> Result<()> {
        self.lock().type_keys(self.id, keys)
    }

    fn grid_dimensions(&self) -> Result<Option<(usize, usize)>> {
        self.lock().grid_dimensions(self.id)
    }

    fn grid_item(&self, row: usize, column: usize) -> Result<Control> {
        let cell = self.lock().grid_item(self.id, row, column)?;
        match cell {
            Some(id) => Ok(self.control(id)),
            None => Err(Error::PatternNotSupported {
                pattern: "grid",
                element: self.describe(),
            }),
        }
    }
}
