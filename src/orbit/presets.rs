use crate::common::Result;
use crate::controls::DataViewPanel;
use crate::suite::FragmentContext;
use crate::uia::{ControlQuery, ControlType, MouseButton};

use super::choose_menu_item;
use super::main_window::functions_tab_title;

/// Shown in the hook column of hooked functions
pub(super) const HOOKED_MARK: char = '\u{2713}';
pub(super) const HOOK_COLUMN: usize = 0;
pub(super) const FUNCTION_COLUMN: usize = 1;

/// Load a preset through the context menu of the presets tree
pub fn load_preset(ctx: &mut FragmentContext<'_>, preset: &str) -> Result<()> {
    let tree = ctx.find_control(&ControlQuery::named(ControlType::Tree, "PresetsTreeView"))?;
    let item = ctx.find_control_in(&tree, &ControlQuery::named(ControlType::TreeItem, preset))?;
    item.click_input(MouseButton::Right)?;
    choose_menu_item(ctx, "PresetsContextMenu", "Load Preset")?;

    tracing::info!("Loaded preset {}", preset);
    Ok(())
}

/// Bring the tab holding the functions view to the front, when there is one
pub(super) fn show_functions_tab(ctx: &mut FragmentContext<'_>) -> Result<()> {
    let tab_title = functions_tab_title(ctx.config());
    if let Some(tab) = ctx.try_find_control(&ControlQuery::named(ControlType::TabItem, tab_title))? {
        tab.click_input(MouseButton::Left)?;
    }
    Ok(())
}

pub(super) fn functions_view(ctx: &mut FragmentContext<'_>) -> Result<DataViewPanel> {
    DataViewPanel::new(
        ctx.find_control(&ControlQuery::named(ControlType::Group, "FunctionsDataView"))?,
    )
}

/// The function's row in the functions view carries the hook mark
pub fn verify_function_hooked(ctx: &mut FragmentContext<'_>, function: &str) -> Result<()> {
    show_functions_tab(ctx)?;

    let panel = functions_view(ctx)?;
    let Some(row) = panel.find_first_item_row(function, FUNCTION_COLUMN, true)? else {
        return Err(ctx.failure(&format!("Function {function} was found")));
    };

    let hook = panel.item_at(row, HOOK_COLUMN)?.text()?;
    ctx.expect_true(
        hook.contains(HOOKED_MARK),
        &format!("Function {function} is hooked"),
    )?;
    tracing::info!("Verified {} was hooked.", function);
    Ok(())
}
