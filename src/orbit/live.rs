//! Live tab fragments

use crate::common::Result;
use crate::controls::DataViewPanel;
use crate::suite::FragmentContext;
use crate::uia::{Control, ControlQuery, ControlType, MouseButton};

use super::{choose_menu_item, DATA_VIEW_MENU};

const FUNCTION_COLUMN: usize = 0;

/// Iterator widgets currently shown above the live functions
fn iterators(frame: &Control) -> Result<Vec<Control>> {
    frame.children_of_type(ControlType::Group)
}

/// Add an iterator over the calls of `function_name` from the live view
pub fn add_iterator(ctx: &mut FragmentContext<'_>, function_name: &str) -> Result<()> {
    if let Some(tab) = ctx.try_find_control(&ControlQuery::named(ControlType::TabItem, "Live"))? {
        tab.click_input(MouseButton::Left)?;
    }

    let live = DataViewPanel::new(ctx.find_control(&ControlQuery::named(
        ControlType::Group,
        "LiveFunctionsDataView",
    ))?)?;
    let Some(row) = live.find_first_item_row(function_name, FUNCTION_COLUMN, false)? else {
        return Err(ctx.failure(&format!("Function {function_name} is in the live view")));
    };

    let frame = ctx.find_control(&ControlQuery::named(ControlType::Group, "IteratorsFrame"))?;
    let before = iterators(&frame)?.len();

    live.item_at(row, FUNCTION_COLUMN)?
        .click_input(MouseButton::Right)?;
    choose_menu_item(ctx, DATA_VIEW_MENU, "Add iterator(s)")?;

    let timeout = ctx.config().timeouts.view_update;
    ctx.wait_for(
        &format!("an iterator for {function_name} to appear"),
        timeout,
        |_| Ok(iterators(&frame)?.len() > before),
    )?;

    let mut names = Vec::new();
    for iterator in iterators(&frame)? {
        names.push(iterator.text()?);
    }
    tracing::debug!(?names, "iterators");
    ctx.expect_true(
        names.iter().any(|name| name.contains(function_name)),
        &format!("Iterator for \"{function_name}\" was added"),
    )?;
    tracing::info!("Added iterator for {}", function_name);
    Ok(())
}
