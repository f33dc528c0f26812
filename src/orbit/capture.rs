//! Capture window fragments

use std::time::Duration;

use crate::common::{glob_to_regex, Result};
use crate::controls::{DataViewPanel, Track};
use crate::suite::FragmentContext;
use crate::uia::{Control, ControlQuery, ControlType, MouseButton, ENTER_KEY};

/// Key toggling a capture
const CAPTURE_KEY: &str = "X";

/// Automation id leaf of the memory sampling period edit
const SAMPLING_PERIOD_EDIT: &str = "MemorySamplingPeriodEdit";

fn capture_window(ctx: &mut FragmentContext<'_>) -> Result<Control> {
    ctx.find_control(&ControlQuery::named(ControlType::Custom, "CaptureWindow"))
}

fn show_capture_tab(ctx: &mut FragmentContext<'_>) -> Result<()> {
    ctx.find_control(&ControlQuery::named(ControlType::TabItem, "Capture"))?
        .click_input(MouseButton::Left)?;
    tracing::info!("Changed into capture view");
    Ok(())
}

/// Bring the system memory checkbox into the `collect` state
fn set_memory_collection(ctx: &mut FragmentContext<'_>, collect: bool) -> Result<()> {
    let checkbox =
        ctx.find_control(&ControlQuery::new(ControlType::CheckBox).name_contains("memory"))?;
    if checkbox.toggle_state()? != Some(collect) {
        checkbox.click_input(MouseButton::Left)?;
    }
    ctx.expect_eq(
        checkbox.toggle_state()?,
        Some(collect),
        "System memory usage collection is set",
    )
}

/// Take a capture of `duration` (the configured default when `None`)
///
/// With `collect_system_memory_usage` set, the memory checkbox is brought
/// into that state first.
pub fn capture(
    ctx: &mut FragmentContext<'_>,
    duration: Option<Duration>,
    collect_system_memory_usage: Option<bool>,
) -> Result<()> {
    let duration = duration.unwrap_or(ctx.config().timeouts.capture_duration);

    show_capture_tab(ctx)?;
    if let Some(collect) = collect_system_memory_usage {
        set_memory_collection(ctx, collect)?;
    }

    let window = capture_window(ctx)?;
    window.click_input(MouseButton::Left)?;
    window.type_keys(CAPTURE_KEY)?;
    ctx.sleep(duration);
    window.type_keys(CAPTURE_KEY)?;
    tracing::info!("Took a {} ms capture.", duration.as_millis());
    Ok(())
}

/// Text a sampling period edit keeps once `input` is committed
///
/// Only digits are accepted. Anything that does not make a period of at
/// least one millisecond leaves `previous` in place.
pub fn expected_sampling_period(input: &str, previous: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    match digits.parse::<u64>() {
        Ok(period) if period >= 1 => period.to_string(),
        _ => previous.to_string(),
    }
}

/// Enter a memory sampling period and check what the edit keeps
pub fn set_and_check_memory_sampling_period(
    ctx: &mut FragmentContext<'_>,
    memory_sampling_period: &str,
) -> Result<()> {
    show_capture_tab(ctx)?;
    set_memory_collection(ctx, true)?;

    let edit =
        ctx.find_control(&ControlQuery::new(ControlType::Edit).auto_id_leaf(SAMPLING_PERIOD_EDIT))?;
    let previous = edit.value()?;
    edit.set_focus()?;
    edit.set_edit_text("")?;
    if !memory_sampling_period.is_empty() {
        edit.type_keys(memory_sampling_period)?;
    }
    edit.type_keys(ENTER_KEY)?;

    let expected = expected_sampling_period(memory_sampling_period, &previous);
    ctx.expect_eq(
        edit.value()?,
        expected.clone(),
        &format!("Memory sampling period is \"{expected}\" after entering \"{memory_sampling_period}\""),
    )?;
    tracing::info!("Memory sampling period set to {} ms", expected);
    Ok(())
}

/// Number of calls recorded for `function` lies within `min..=max`
pub fn verify_function_call_count(
    ctx: &mut FragmentContext<'_>,
    function: &str,
    min: u64,
    max: u64,
) -> Result<()> {
    let panel = DataViewPanel::new(ctx.find_control(&ControlQuery::named(
        ControlType::Group,
        "LiveFunctionsDataView",
    ))?)?;
    let Some(row) = panel.find_first_item_row(function, 0, true)? else {
        return Err(ctx.failure(&format!("Function {function} was found")));
    };

    let text = panel.item_at(row, 1)?.text()?;
    let Ok(count) = text.trim().replace(',', "").parse::<u64>() else {
        return Err(ctx.failure(&format!(
            "Call count of {function} is a number (got \"{text}\")"
        )));
    };
    tracing::debug!(function, count, "call count");

    ctx.expect_true(
        (min..=max).contains(&count),
        &format!("Number of calls to \"{function}\" is between {min} and {max}"),
    )?;
    tracing::info!("Verified number of calls to \"{}\".", function);
    Ok(())
}

/// Visible tracks of the capture window
pub fn visible_tracks(capture_window: &Control) -> Result<Vec<Track>> {
    let mut tracks = Vec::new();
    for container in capture_window.children_of_type(ControlType::Group)? {
        if container.is_visible()? {
            tracks.push(Track::new(container)?);
        }
    }
    Ok(tracks)
}

fn matching_tracks(ctx: &mut FragmentContext<'_>, track_names: &str) -> Result<Vec<String>> {
    let pattern = glob_to_regex(track_names)?;
    let window = capture_window(ctx)?;

    let mut titles = Vec::new();
    for track in visible_tracks(&window)? {
        let title = track.title().text()?;
        if pattern.is_match(&title) {
            titles.push(title);
        }
    }
    Ok(titles)
}

/// At least one visible track title matches the `*` glob
pub fn verify_tracks_exist(ctx: &mut FragmentContext<'_>, track_names: &str) -> Result<()> {
    let found = matching_tracks(ctx, track_names)?;
    tracing::info!("Found {} tracks matching \"{}\"", found.len(), track_names);
    ctx.expect_true(
        !found.is_empty(),
        &format!("Found tracks matching \"{track_names}\""),
    )
}

/// No visible track title matches the `*` glob
pub fn verify_tracks_do_not_exist(ctx: &mut FragmentContext<'_>, track_names: &str) -> Result<()> {
    let found = matching_tracks(ctx, track_names)?;
    if !found.is_empty() {
        tracing::debug!(?found, "unexpected tracks");
    }
    ctx.expect_true(
        found.is_empty(),
        &format!("No tracks match \"{track_names}\""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_sampling_period() {
        assert_eq!(expected_sampling_period("030", "10"), "30");
        assert_eq!(expected_sampling_period("", "30"), "30");
        assert_eq!(expected_sampling_period("ab", "30"), "30");
        assert_eq!(expected_sampling_period("0", "30"), "30");
        assert_eq!(expected_sampling_period("1a5", "30"), "15");
    }
}
