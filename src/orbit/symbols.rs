//! Symbol loading and hooking from the modules and functions views

use crate::common::Result;
use crate::controls::DataViewPanel;
use crate::suite::{FragmentContext, SuiteConfig};
use crate::uia::{ControlQuery, ControlType, MouseButton};

use super::presets::{functions_view, show_functions_tab, FUNCTION_COLUMN, HOOKED_MARK, HOOK_COLUMN};
use super::{choose_menu_item, DATA_VIEW_MENU};

const LOADED_COLUMN: usize = 0;
const MODULE_COLUMN: usize = 1;

/// Shown in the loaded column once a module's symbols are in
const LOADED_MARK: char = '*';

/// Title of the tab holding the modules view
fn modules_tab_title(config: &SuiteConfig) -> &'static str {
    if config.enable_ui_beta {
        "Symbols"
    } else {
        "Home"
    }
}

/// Replace the filter text of a data view
fn filter_rows(panel: &DataViewPanel, text: &str) -> Result<()> {
    let filter = panel.filter();
    filter.set_focus()?;
    filter.set_edit_text("")?;
    if !text.is_empty() {
        filter.type_keys(text)?;
    }
    Ok(())
}

/// Load the symbols of the single module matching `module_search_string`
pub fn load_symbols(ctx: &mut FragmentContext<'_>, module_search_string: &str) -> Result<()> {
    let tab_title = modules_tab_title(ctx.config());
    if let Some(tab) = ctx.try_find_control(&ControlQuery::named(ControlType::TabItem, tab_title))? {
        tab.click_input(MouseButton::Left)?;
    }

    let modules = DataViewPanel::new(
        ctx.find_control(&ControlQuery::named(ControlType::Group, "ModulesDataView"))?,
    )?;
    filter_rows(&modules, module_search_string)?;

    let timeout = ctx.config().timeouts.view_update;
    ctx.wait_for(
        &format!("a single module to match \"{module_search_string}\""),
        timeout,
        |_| Ok(modules.row_count()? == 1),
    )?;

    let module = modules.item_at(0, MODULE_COLUMN)?;
    let module_name = module.text()?;
    module.click_input(MouseButton::Right)?;
    choose_menu_item(ctx, DATA_VIEW_MENU, "Load Symbols")?;
    tracing::info!("Loading symbols of {}", module_name);

    let timeout = ctx.config().timeouts.symbol_loading;
    ctx.wait_for(
        &format!("the symbols of {module_name} to be loaded"),
        timeout,
        |_| {
            Ok(modules
                .item_at(0, LOADED_COLUMN)?
                .text()?
                .contains(LOADED_MARK))
        },
    )?;
    tracing::info!("Loaded symbols of {}", module_name);
    Ok(())
}

/// Hook the first function matching `function_search_string`
pub fn filter_and_hook_function(
    ctx: &mut FragmentContext<'_>,
    function_search_string: &str,
) -> Result<()> {
    show_functions_tab(ctx)?;

    let functions = functions_view(ctx)?;
    filter_rows(&functions, function_search_string)?;

    let timeout = ctx.config().timeouts.view_update;
    ctx.wait_for(
        &format!("a function to match \"{function_search_string}\""),
        timeout,
        |_| Ok(functions.row_count()? >= 1),
    )?;

    let function = functions.item_at(0, FUNCTION_COLUMN)?;
    let function_name = function.text()?;
    function.click_input(MouseButton::Right)?;
    choose_menu_item(ctx, DATA_VIEW_MENU, "Hook")?;

    ctx.wait_for(
        &format!("{function_name} to be marked as hooked"),
        timeout,
        |_| {
            Ok(functions
                .item_at(0, HOOK_COLUMN)?
                .text()?
                .contains(HOOKED_MARK))
        },
    )?;
    tracing::info!("Hooked function {}", function_name);
    Ok(())
}
