//! Wrappers over recurring widget groups of the profiler UI
//!
//! The wrappers resolve their parts once, at construction, and are not
//! re-validated afterwards.

use crate::common::Result;
use crate::uia::{find_control, try_find_control, Control, ControlQuery, ControlType};

/// A track of the capture window: a tab-like title plus a content group
#[derive(Debug, Clone)]
pub struct Track {
    container: Control,
    title: Control,
    content: Control,
}

impl Track {
    pub fn new(container: Control) -> Result<Self> {
        let title = find_control(&container, &ControlQuery::new(ControlType::TabItem))?;
        let content = find_control(&container, &ControlQuery::new(ControlType::Group))?;
        Ok(Self {
            container,
            title,
            content,
        })
    }

    pub fn container(&self) -> &Control {
        &self.container
    }

    pub fn title(&self) -> &Control {
        &self.title
    }

    pub fn content(&self) -> &Control {
        &self.content
    }
}

/// A data view: a grid named "DataView" with a filter edit and an optional
/// refresh button, all inside one group
#[derive(Debug, Clone)]
pub struct DataViewPanel {
    panel: Control,
    table: Control,
    refresh_button: Option<Control>,
    filter: Control,
}

impl DataViewPanel {
    pub fn new(panel: Control) -> Result<Self> {
        let table = find_control(&panel, &ControlQuery::named(ControlType::Tree, "DataView"))?;
        let refresh_button =
            try_find_control(&panel, &ControlQuery::named(ControlType::Button, "Refresh"))?;
        let filter = find_control(&panel, &ControlQuery::named(ControlType::Edit, "Filter"))?;
        Ok(Self {
            panel,
            table,
            refresh_button,
            filter,
        })
    }

    pub fn panel(&self) -> &Control {
        &self.panel
    }

    pub fn table(&self) -> &Control {
        &self.table
    }

    pub fn refresh_button(&self) -> Option<&Control> {
        self.refresh_button.as_ref()
    }

    pub fn filter(&self) -> &Control {
        &self.filter
    }

    pub fn row_count(&self) -> Result<usize> {
        Ok(self.table.grid_dimensions()?.0)
    }

    pub fn column_count(&self) -> Result<usize> {
        Ok(self.table.grid_dimensions()?.1)
    }

    /// Cell at `row` x `column`, through the grid pattern
    ///
    /// Columns hidden by horizontal scrolling are not indexed correctly by
    /// backends that only expose realized items.
    pub fn item_at(&self, row: usize, column: usize) -> Result<Control> {
        self.table.grid_item(row, column)
    }

    /// First row whose cell in `column` equals `text` (or contains it, with `partial_match`)
    pub fn find_first_item_row(
        &self,
        text: &str,
        column: usize,
        partial_match: bool,
    ) -> Result<Option<usize>> {
        find_first_item_row(&self.table, text, column, partial_match)
    }
}

/// Scan one column of a grid for `text`
///
/// Returns the index of the first matching row, `None` when no row matches.
pub fn find_first_item_row(
    grid: &Control,
    text: &str,
    column: usize,
    partial_match: bool,
) -> Result<Option<usize>> {
    let (rows, _) = grid.grid_dimensions()?;
    for row in 0..rows {
        let item_text = grid.grid_item(row, column)?.text()?;
        if item_text == text || (partial_match && item_text.contains(text)) {
            return Ok(Some(row));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDesktop;
    use crate::uia::Application;

    const PANEL: &str = r#"
windows:
  - name: orbitprofiler
    children:
      - control_type: Group
        name: ProcessesDataView
        children:
          - control_type: Tree
            name: DataView
            columns: 2
            children:
              - { control_type: TreeItem, name: hello_ggp_standalone }
              - { control_type: TreeItem, name: "1234" }
              - { control_type: TreeItem, name: hello_ggp }
              - { control_type: TreeItem, name: "77" }
              - { control_type: TreeItem, name: sshd }
              - { control_type: TreeItem, name: "1" }
          - control_type: Edit
            name: Filter
      - control_type: Group
        name: Tracks
        children:
          - control_type: Group
            name: Track
            children:
              - { control_type: TabItem, name: Scheduler }
              - { control_type: Group, name: SchedulerContent }
"#;

    fn panel() -> DataViewPanel {
        let desktop = MockDesktop::from_yaml(PANEL).unwrap();
        let top = desktop.top_window().unwrap();
        let group = find_control(
            &top,
            &ControlQuery::named(ControlType::Group, "ProcessesDataView"),
        )
        .unwrap();
        DataViewPanel::new(group).unwrap()
    }

    #[test]
    fn test_panel_resolves_parts() {
        let panel = panel();
        assert_eq!(panel.filter().text().unwrap(), "Filter");
        assert!(panel.refresh_button().is_none());
        assert_eq!(panel.row_count().unwrap(), 3);
        assert_eq!(panel.column_count().unwrap(), 2);
        assert_eq!(panel.item_at(2, 1).unwrap().text().unwrap(), "1");
    }

    #[test]
    fn test_exact_match_skips_partial_candidates() {
        let panel = panel();
        assert_eq!(panel.find_first_item_row("hello_ggp", 0, false).unwrap(), Some(1));
    }

    #[test]
    fn test_partial_match_returns_first_containing_row() {
        let panel = panel();
        assert_eq!(panel.find_first_item_row("hello", 0, true).unwrap(), Some(0));
        assert_eq!(panel.find_first_item_row("7", 1, true).unwrap(), Some(1));
    }

    #[test]
    fn test_absent_text_returns_none() {
        let panel = panel();
        assert_eq!(panel.find_first_item_row("bash", 0, true).unwrap(), None);
        assert_eq!(panel.find_first_item_row("hello", 0, false).unwrap(), None);
    }

    #[test]
    fn test_track_resolves_title_and_content() {
        let desktop = MockDesktop::from_yaml(PANEL).unwrap();
        let top = desktop.top_window().unwrap();
        let container =
            find_control(&top, &ControlQuery::named(ControlType::Group, "Track")).unwrap();
        let track = Track::new(container.clone()).unwrap();
        assert_eq!(track.container(), &container);
        assert_eq!(track.title().text().unwrap(), "Scheduler");
        assert_eq!(track.content().text().unwrap(), "SchedulerContent");
    }

    #[test]
    fn test_panel_without_table_fails() {
        let desktop = MockDesktop::from_yaml(PANEL).unwrap();
        let top = desktop.top_window().unwrap();
        let group = find_control(&top, &ControlQuery::named(ControlType::Group, "Tracks")).unwrap();
        assert!(DataViewPanel::new(group).unwrap_err().is_not_found());
    }
}
