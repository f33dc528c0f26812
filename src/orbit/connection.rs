//! Session setup: instance and process selection

use crate::common::Result;
use crate::controls::{find_first_item_row, DataViewPanel};
use crate::suite::FragmentContext;
use crate::uia::{Control, ControlQuery, ControlType, MouseButton};

/// Wait until the main window is the top window, then refresh the cached one
pub fn wait_for_main_window(ctx: &mut FragmentContext<'_>) -> Result<()> {
    let class = ctx.config().main_window_class.clone();
    let timeout = ctx.config().timeouts.main_window;
    let application = ctx.application();

    ctx.wait_for("the main window to be on top", timeout, |_| {
        Ok(application.top_window()?.class_name()? == class)
    })?;

    let window = ctx.top_window(true)?;
    ctx.expect_eq(window.class_name()?, class, "Main window is visible")
}

/// First instance cell matching the filter, or the first instance
fn pick_instance(list: &Control, filter: Option<&str>) -> Result<Option<Control>> {
    let Some(filter) = filter else {
        return list.grid_item(0, 0).map(Some);
    };
    match find_first_item_row(list, filter, 0, true)? {
        Some(row) => list.grid_item(row, 0).map(Some),
        None => Ok(None),
    }
}

/// Connect to the first available instance
pub fn connect_to_instance(ctx: &mut FragmentContext<'_>) -> Result<()> {
    let config = ctx.config().clone();

    tracing::info!("Start connecting to instance.");
    if config.enable_ui_beta {
        ctx.find_control(&ControlQuery::named(
            ControlType::RadioButton,
            "ConnectToStadia",
        ))?
        .click_input(MouseButton::Left)?;
    }

    let instance_list = ctx.find_control(&ControlQuery::named(ControlType::Table, "InstanceList"))?;
    instance_list.click_input(MouseButton::Left)?;
    ctx.wait_for(
        "the instance list to show an instance",
        config.timeouts.instance_list,
        |_| Ok(instance_list.item_count()? >= 1),
    )?;

    let rows = instance_list.item_count()?;
    tracing::info!("Found {} rows in the instance list", rows);
    ctx.expect_true(rows >= 1, "Found at least one instance")?;

    let instance = pick_instance(&instance_list, config.instance_filter.as_deref())?;
    let Some(instance) = instance else {
        return Err(ctx.failure(&format!(
            "Found an instance matching \"{}\"",
            config.instance_filter.as_deref().unwrap_or_default()
        )));
    };
    tracing::debug!(instance = %instance.text()?, "selecting instance");
    instance.double_click_input()?;
    tracing::info!("Connecting to instance, waiting for the process list...");

    if config.enable_ui_beta {
        // The process list comes up disabled, then a translucent loading
        // overlay stays on top of it for a moment
        ctx.wait_for(
            "the processes frame to be enabled",
            config.timeouts.processes_frame,
            |ctx| {
                ctx.find_control(&ControlQuery::named(ControlType::Custom, "ProcessesFrame"))?
                    .is_enabled()
            },
        )?;
        ctx.wait_for(
            "the process list to be active",
            config.timeouts.process_list_active,
            |ctx| {
                ctx.find_control(&ControlQuery::named(ControlType::Table, "ProcessList"))?
                    .is_active()
            },
        )?;
        ctx.sleep(config.timeouts.overlay_settle);
    } else {
        wait_for_main_window(ctx)?;
    }
    tracing::info!("Process list ready");
    Ok(())
}

/// Connection performed during suite set-up
pub fn connect_to_gamelet(ctx: &mut FragmentContext<'_>) -> Result<()> {
    tracing::info!("Auto-connecting to an instance");
    connect_to_instance(ctx)
}

/// Filter the process list and select the first remaining process
pub fn filter_and_select_first_process(
    ctx: &mut FragmentContext<'_>,
    process_filter: &str,
) -> Result<()> {
    let config = ctx.config().clone();

    let (filter_edit, process_list) = if config.enable_ui_beta {
        (
            ctx.find_control(&ControlQuery::named(ControlType::Edit, "FilterProcesses"))?,
            ctx.find_control(&ControlQuery::named(ControlType::Table, "ProcessList"))?,
        )
    } else {
        let panel = DataViewPanel::new(
            ctx.find_control(&ControlQuery::named(ControlType::Group, "ProcessesDataView"))?,
        )?;
        (panel.filter().clone(), panel.table().clone())
    };

    tracing::info!("Waiting for process list to be populated");
    ctx.wait_for(
        "the process list to be populated",
        config.timeouts.process_list,
        |_| Ok(process_list.item_count()? > 0),
    )?;

    tracing::info!("Setting filter text for process list");
    if !process_filter.is_empty() {
        filter_edit.set_focus()?;
        filter_edit.set_edit_text("")?;
        filter_edit.type_keys(process_filter)?;
    }
    ctx.expect_true(
        process_list.item_count()? > 0,
        "Process list has at least one entry",
    )?;

    let item_type = if config.enable_ui_beta {
        ControlType::DataItem
    } else {
        ControlType::TreeItem
    };
    let Some(first) = process_list.children_of_type(item_type)?.into_iter().next() else {
        return Err(ctx.failure("Process list has a selectable entry"));
    };

    if config.enable_ui_beta {
        tracing::info!("Process selected, continuing to main window...");
        first.double_click_input()?;
        wait_for_main_window(ctx)
    } else {
        first.click_input(MouseButton::Left)
    }
}
