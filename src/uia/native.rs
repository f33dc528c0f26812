//! Windows UI Automation backend
//!
//! Attaches to the profiler through the system's UI Automation client. Tree
//! navigation uses the control view, so purely structural elements are
//! skipped the same way inspection tools skip them.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use uiautomation::patterns::{UIGridPattern, UITogglePattern, UIValuePattern};
use uiautomation::types::ToggleState;
use uiautomation::{UIAutomation, UIElement, UITreeWalker};

use super::{Application, Backend, Control, ControlType, Element, MouseButton, RuntimeId, Timings};
use crate::common::{Error, Result};

/// Interval between two synthesized keystrokes, in milliseconds
const KEY_INTERVAL_MS: u64 = 10;

fn automation_error(e: uiautomation::Error) -> Error {
    Error::Automation(e.to_string())
}

/// Client objects shared by every element of one application
struct Client {
    automation: UIAutomation,
    walker: UITreeWalker,
    root: UIElement,
    after_click_wait_ms: AtomicU64,
}

// SAFETY: UI Automation client objects are free-threaded; `UIAutomation::new`
// joins the multithreaded apartment, so they may be used from any thread.
unsafe impl Send for Client {}
unsafe impl Sync for Client {}

impl Client {
    fn new() -> Result<Self> {
        let automation = UIAutomation::new().map_err(automation_error)?;
        let walker = automation
            .get_control_view_walker()
            .map_err(automation_error)?;
        let root = automation.get_root_element().map_err(automation_error)?;
        Ok(Self {
            automation,
            walker,
            root,
            after_click_wait_ms: AtomicU64::new(Timings::default().after_click_wait.as_millis() as u64),
        })
    }

    /// Top-level windows of the desktop, topmost first
    fn top_level(&self) -> Vec<UIElement> {
        let mut windows = Vec::new();
        let mut next = self.walker.get_first_child(&self.root).ok();
        while let Some(window) = next {
            next = self.walker.get_next_sibling(&window).ok();
            windows.push(window);
        }
        windows
    }
}

/// Backend over the desktop's UI Automation tree
#[derive(Debug, Default)]
pub struct NativeBackend;

impl Backend for NativeBackend {
    fn name(&self) -> &str {
        "uia"
    }

    fn connect(&self, title_pattern: &regex::Regex) -> Result<Arc<dyn Application>> {
        let client = Client::new()?;
        for window in client.top_level() {
            let Ok(title) = window.get_name() else {
                continue;
            };
            if !title_pattern.is_match(&title) {
                continue;
            }
            let process_id = window.get_process_id().map_err(automation_error)? as u32;
            tracing::debug!(title, process_id, "found application window");
            return Ok(Arc::new(NativeApplication {
                client: Arc::new(client),
                process_id,
            }));
        }
        Err(Error::ApplicationNotFound {
            pattern: title_pattern.as_str().to_string(),
        })
    }
}

/// One running process, seen through its top-level windows
struct NativeApplication {
    client: Arc<Client>,
    process_id: u32,
}

impl Application for NativeApplication {
    fn process_id(&self) -> u32 {
        self.process_id
    }

    fn is_running(&self) -> bool {
        self.windows().map(|w| !w.is_empty()).unwrap_or(false)
    }

    fn windows(&self) -> Result<Vec<Control>> {
        let mut windows: Vec<Control> = self
            .client
            .top_level()
            .into_iter()
            .filter(|w| {
                w.get_process_id()
                    .map(|pid| pid as u32 == self.process_id)
                    .unwrap_or(false)
            })
            .map(|w| NativeElement::control(&self.client, w))
            .collect();
        if windows.is_empty() {
            return Err(Error::ApplicationClosed);
        }
        // UI Automation lists the topmost window first
        windows.reverse();
        Ok(windows)
    }

    fn apply_timings(&self, timings: &Timings) {
        self.client
            .after_click_wait_ms
            .store(timings.after_click_wait.as_millis() as u64, Ordering::Relaxed);
    }
}

struct NativeElement {
    client: Arc<Client>,
    element: UIElement,
    runtime_id: RuntimeId,
}

// SAFETY: see `Client`
unsafe impl Send for NativeElement {}
unsafe impl Sync for NativeElement {}

impl NativeElement {
    fn control(client: &Arc<Client>, element: UIElement) -> Control {
        let mut hasher = DefaultHasher::new();
        element.get_runtime_id().unwrap_or_default().hash(&mut hasher);
        Control::new(Arc::new(Self {
            client: Arc::clone(client),
            element,
            runtime_id: RuntimeId(hasher.finish()),
        }))
    }

    fn after_click(&self) {
        let wait = self.client.after_click_wait_ms.load(Ordering::Relaxed);
        if wait > 0 {
            std::thread::sleep(Duration::from_millis(wait));
        }
    }

    fn unsupported(&self, pattern: &'static str) -> Error {
        Error::PatternNotSupported {
            pattern,
            element: self.describe(),
        }
    }
}

impl Element for NativeElement {
    fn runtime_id(&self) -> RuntimeId {
        self.runtime_id
    }

    fn describe(&self) -> String {
        match (self.control_type(), self.element.get_name()) {
            (Ok(control_type), Ok(name)) if name.is_empty() => control_type.to_string(),
            (Ok(control_type), Ok(name)) => format!("{control_type} '{name}'"),
            _ => format!("<element {}>", self.runtime_id),
        }
    }

    fn control_type(&self) -> Result<ControlType> {
        let control_type = self.element.get_control_type().map_err(automation_error)?;
        Ok(format!("{control_type:?}")
            .parse()
            .unwrap_or(ControlType::Custom))
    }

    fn texts(&self) -> Result<Vec<String>> {
        let mut texts = vec![self.element.get_name().map_err(automation_error)?];
        if self.control_type()?.is_text_input() {
            if let Ok(value) = self.element.get_pattern::<UIValuePattern>() {
                texts.push(value.get_value().map_err(automation_error)?);
            }
        }
        Ok(texts)
    }

    fn automation_id(&self) -> Result<String> {
        self.element.get_automation_id().map_err(automation_error)
    }

    fn class_name(&self) -> Result<String> {
        self.element.get_classname().map_err(automation_error)
    }

    fn children(&self) -> Result<Vec<Control>> {
        let walker = &self.client.walker;
        let mut children = Vec::new();
        let mut next = walker.get_first_child(&self.element).ok();
        while let Some(child) = next {
            next = walker.get_next_sibling(&child).ok();
            children.push(NativeElement::control(&self.client, child));
        }
        Ok(children)
    }

    fn parent(&self) -> Result<Option<Control>> {
        let Ok(parent) = self.client.walker.get_parent(&self.element) else {
            return Ok(None);
        };
        let is_desktop = self
            .client
            .automation
            .compare_elements(&parent, &self.client.root)
            .map_err(automation_error)?;
        if is_desktop {
            return Ok(None);
        }
        Ok(Some(NativeElement::control(&self.client, parent)))
    }

    fn is_visible(&self) -> Result<bool> {
        Ok(!self.element.is_offscreen().map_err(automation_error)?)
    }

    fn is_enabled(&self) -> Result<bool> {
        self.element.is_enabled().map_err(automation_error)
    }

    fn is_active(&self) -> Result<bool> {
        self.element.has_keyboard_focus().map_err(automation_error)
    }

    fn toggle_state(&self) -> Result<Option<bool>> {
        let Ok(toggle) = self.element.get_pattern::<UITogglePattern>() else {
            return Ok(None);
        };
        Ok(match toggle.get_toggle_state().map_err(automation_error)? {
            ToggleState::On => Some(true),
            ToggleState::Off => Some(false),
            _ => None,
        })
    }

    fn click(&self, button: MouseButton, double: bool) -> Result<()> {
        let clicked = match (button, double) {
            (MouseButton::Right, _) => self.element.right_click(),
            (MouseButton::Left, true) => self.element.double_click(),
            (MouseButton::Left, false) => self.element.click(),
        };
        clicked.map_err(automation_error)?;
        self.after_click();
        Ok(())
    }

    fn set_focus(&self) -> Result<()> {
        self.element.set_focus().map_err(automation_error)
    }

    fn set_text(&self, text: &str) -> Result<()> {
        let value = self
            .element
            .get_pattern::<UIValuePattern>()
            .map_err(|_| self.unsupported("value"))?;
        value.set_value(text).map_err(automation_error)
    }

    fn type_keys(&self, keys: &str) -> Result<()> {
        self.element
            .send_keys(keys, KEY_INTERVAL_MS)
            .map_err(automation_error)
    }

    fn grid_dimensions(&self) -> Result<Option<(usize, usize)>> {
        let Ok(grid) = self.element.get_pattern::<UIGridPattern>() else {
            return Ok(None);
        };
        let rows = grid.get_row_count().map_err(automation_error)?;
        let columns = grid.get_column_count().map_err(automation_error)?;
        Ok(Some((rows.max(0) as usize, columns.max(0) as usize)))
    }

    fn grid_item(&self, row: usize, column: usize) -> Result<Control> {
        let grid = self
            .element
            .get_pattern::<UIGridPattern>()
            .map_err(|_| self.unsupported("grid"))?;
        let (rows, columns) = self.grid_dimensions()?.unwrap_or_default();
        if row >= rows || column >= columns {
            return Err(Error::GridIndexOutOfRange {
                row,
                column,
                rows,
                columns,
            });
        }
        let item = grid
            .get_item(row as i32, column as i32)
            .map_err(automation_error)?;
        Ok(NativeElement::control(&self.client, item))
    }
}
