use crate::common::Result;
use crate::suite::{FragmentContext, SuiteConfig};
use crate::uia::{Control, ControlQuery, ControlType, MouseButton};

/// Title of the tab holding the functions view
pub fn functions_tab_title(config: &SuiteConfig) -> &'static str {
    if config.enable_ui_beta {
        "Symbols"
    } else {
        "Functions"
    }
}

fn move_through_context_menu(ctx: &mut FragmentContext<'_>, item: &Control) -> Result<()> {
    item.click_input(MouseButton::Right)?;
    let menu = ctx.application().window("TabBarContextMenu")?;
    ctx.find_control_in(&menu, &ControlQuery::new(ControlType::MenuItem).name_contains("Move"))?
        .click_input(MouseButton::Left)
}

fn tab_bar(ctx: &mut FragmentContext<'_>, widget: &str) -> Result<Control> {
    let widget = ctx.find_control(&ControlQuery::named(ControlType::Group, widget))?;
    ctx.find_control_in(&widget, &ControlQuery::new(ControlType::Tab).direct_children())
}

/// Move a tab from the right tab widget to the left one and back
///
/// Tab counts, the tab's parent and the visibility of its content are
/// checked after each move.
pub fn move_tab(ctx: &mut FragmentContext<'_>, tab_title: &str, tab_name: &str) -> Result<()> {
    let tab_query = ControlQuery::named(ControlType::TabItem, tab_title);
    let content_query = ControlQuery::named(ControlType::Group, tab_name);

    let tab_item = ctx.find_control(&tab_query)?;
    let right_tab_bar = tab_bar(ctx, "RightTabWidget")?;
    let left_tab_bar = tab_bar(ctx, "MainTabWidget")?;

    let left_tab_count = left_tab_bar.control_count()?;
    let right_tab_count = right_tab_bar.control_count()?;

    ctx.expect_eq(
        tab_item.parent()?,
        Some(right_tab_bar.clone()),
        &format!("{tab_title} tab is initialized in the right pane"),
    )?;

    tracing::info!(
        "Moving tab to the left pane (current tab count: {})",
        right_tab_count
    );
    move_through_context_menu(ctx, &tab_item)?;
    ctx.expect_eq(
        right_tab_bar.control_count()?,
        right_tab_count.saturating_sub(1),
        "1 tab removed from right pane",
    )?;
    ctx.expect_eq(
        left_tab_bar.control_count()?,
        left_tab_count + 1,
        "1 tab added to the left pane",
    )?;

    let tab_item = ctx.find_control(&tab_query)?;
    ctx.expect_eq(
        tab_item.parent()?,
        Some(left_tab_bar.clone()),
        "Tab is parented under the left pane",
    )?;
    let visible = ctx.find_control(&content_query)?.is_visible()?;
    ctx.expect_true(visible, "Tab is visible")?;

    tracing::info!("Moving \"{}\" tab back to the right pane", tab_title);
    move_through_context_menu(ctx, &tab_item)?;
    ctx.expect_eq(
        right_tab_bar.control_count()?,
        right_tab_count,
        "1 tab added to the right pane",
    )?;
    ctx.expect_eq(
        left_tab_bar.control_count()?,
        left_tab_count,
        "1 tab removed from left pane",
    )?;

    let tab_item = ctx.find_control(&tab_query)?;
    ctx.expect_eq(
        tab_item.parent()?,
        Some(right_tab_bar),
        "Tab is parented under the right pane",
    )?;
    let visible = ctx.find_control(&content_query)?.is_visible()?;
    ctx.expect_true(visible, &format!("{tab_title} tab is visible"))
}
