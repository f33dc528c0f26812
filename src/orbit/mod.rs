//! Orbit profiler fragments and built-in scenarios

pub mod capture;
pub mod connection;
pub mod live;
pub mod main_window;
pub mod presets;
mod scenarios;
pub mod symbols;

pub use connection::connect_to_gamelet;
pub use scenarios::{all_scenarios, get_scenario, Scenario};

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::suite::{Fragment, FragmentContext};
use crate::uia::{ControlQuery, ControlType, MouseButton};

/// Context menu window of the data views
const DATA_VIEW_MENU: &str = "DataViewContextMenu";

/// Click `item` in the open context menu window `menu`
fn choose_menu_item(ctx: &mut FragmentContext<'_>, menu: &str, item: &str) -> Result<()> {
    let menu = ctx.application().window(menu)?;
    ctx.find_control_in(&menu, &ControlQuery::named(ControlType::MenuItem, item))?
        .click_input(MouseButton::Left)
}

fn default_tab_name() -> String {
    "FunctionsTab".to_string()
}

fn default_min_calls() -> u64 {
    30
}

fn default_max_calls() -> u64 {
    3000
}

/// A built-in Orbit fragment and its parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fragment", rename_all = "snake_case")]
pub enum FragmentSpec {
    /// Connect to the first (or first matching) instance
    ConnectToInstance,

    FilterAndSelectFirstProcess {
        #[serde(default)]
        process_filter: String,
    },

    /// Move a tab to the left pane and back; without a title the functions
    /// tab of the active UI is used
    MoveTab {
        #[serde(default)]
        tab_title: Option<String>,
        #[serde(default = "default_tab_name")]
        tab_name: String,
    },

    LoadPreset {
        preset: String,
    },

    /// Load the symbols of the one module matching the search string
    LoadSymbols {
        module_search_string: String,
    },

    /// Hook the first function matching the search string
    FilterAndHookFunction {
        function_search_string: String,
    },

    VerifyFunctionHooked {
        function: String,
    },

    Capture {
        #[serde(default)]
        duration_ms: Option<u64>,
        #[serde(default)]
        collect_system_memory_usage: Option<bool>,
    },

    VerifyFunctionCallCount {
        function: String,
        #[serde(default = "default_min_calls")]
        min: u64,
        #[serde(default = "default_max_calls")]
        max: u64,
    },

    VerifyTracksExist {
        track_names: String,
    },

    VerifyTracksDoNotExist {
        track_names: String,
    },

    /// Type a period into the memory sampling edit and check the value it keeps
    SetAndCheckMemorySamplingPeriod {
        memory_sampling_period: String,
    },

    AddIterator {
        function_name: String,
    },
}

impl FragmentSpec {
    /// Name used in logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            FragmentSpec::ConnectToInstance => "ConnectToInstance",
            FragmentSpec::FilterAndSelectFirstProcess { .. } => "FilterAndSelectFirstProcess",
            FragmentSpec::MoveTab { .. } => "MoveTab",
            FragmentSpec::LoadPreset { .. } => "LoadPreset",
            FragmentSpec::LoadSymbols { .. } => "LoadSymbols",
            FragmentSpec::FilterAndHookFunction { .. } => "FilterAndHookFunction",
            FragmentSpec::VerifyFunctionHooked { .. } => "VerifyFunctionHooked",
            FragmentSpec::Capture { .. } => "Capture",
            FragmentSpec::VerifyFunctionCallCount { .. } => "VerifyFunctionCallCount",
            FragmentSpec::VerifyTracksExist { .. } => "VerifyTracksExist",
            FragmentSpec::VerifyTracksDoNotExist { .. } => "VerifyTracksDoNotExist",
            FragmentSpec::SetAndCheckMemorySamplingPeriod { .. } => {
                "SetAndCheckMemorySamplingPeriod"
            }
            FragmentSpec::AddIterator { .. } => "AddIterator",
        }
    }

    /// Whether the fragment performs the instance connection itself
    pub fn connects(&self) -> bool {
        matches!(self, FragmentSpec::ConnectToInstance)
    }

    /// Run the fragment logic in `ctx`
    pub fn run(&self, ctx: &mut FragmentContext<'_>) -> Result<()> {
        match self {
            FragmentSpec::ConnectToInstance => connection::connect_to_instance(ctx),
            FragmentSpec::FilterAndSelectFirstProcess { process_filter } => {
                connection::filter_and_select_first_process(ctx, process_filter)
            }
            FragmentSpec::MoveTab {
                tab_title,
                tab_name,
            } => {
                let title = match tab_title {
                    Some(title) => title.as_str(),
                    None => main_window::functions_tab_title(ctx.config()),
                };
                main_window::move_tab(ctx, title, tab_name)
            }
            FragmentSpec::LoadPreset { preset } => presets::load_preset(ctx, preset),
            FragmentSpec::LoadSymbols {
                module_search_string,
            } => symbols::load_symbols(ctx, module_search_string),
            FragmentSpec::FilterAndHookFunction {
                function_search_string,
            } => symbols::filter_and_hook_function(ctx, function_search_string),
            FragmentSpec::VerifyFunctionHooked { function } => {
                presets::verify_function_hooked(ctx, function)
            }
            FragmentSpec::Capture {
                duration_ms,
                collect_system_memory_usage,
            } => capture::capture(
                ctx,
                duration_ms.map(Duration::from_millis),
                *collect_system_memory_usage,
            ),
            FragmentSpec::VerifyFunctionCallCount { function, min, max } => {
                capture::verify_function_call_count(ctx, function, *min, *max)
            }
            FragmentSpec::VerifyTracksExist { track_names } => {
                capture::verify_tracks_exist(ctx, track_names)
            }
            FragmentSpec::VerifyTracksDoNotExist { track_names } => {
                capture::verify_tracks_do_not_exist(ctx, track_names)
            }
            FragmentSpec::SetAndCheckMemorySamplingPeriod {
                memory_sampling_period,
            } => capture::set_and_check_memory_sampling_period(ctx, memory_sampling_period),
            FragmentSpec::AddIterator { function_name } => live::add_iterator(ctx, function_name),
        }
    }

    pub fn into_fragment(self) -> Fragment {
        Fragment::new(self.name(), move |ctx| self.run(ctx))
    }
}

impl fmt::Display for FragmentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentSpec::ConnectToInstance => write!(f, "{}", self.name()),
            FragmentSpec::FilterAndSelectFirstProcess { process_filter } => {
                write!(f, "{}(process_filter=\"{}\")", self.name(), process_filter)
            }
            FragmentSpec::MoveTab {
                tab_title,
                tab_name,
            } => match tab_title {
                Some(title) => write!(f, "{}(tab_title=\"{}\", tab_name=\"{}\")", self.name(), title, tab_name),
                None => write!(f, "{}(tab_name=\"{}\")", self.name(), tab_name),
            },
            FragmentSpec::LoadPreset { preset } => write!(f, "{}(preset=\"{}\")", self.name(), preset),
            FragmentSpec::LoadSymbols {
                module_search_string,
            } => write!(
                f,
                "{}(module_search_string=\"{}\")",
                self.name(),
                module_search_string
            ),
            FragmentSpec::FilterAndHookFunction {
                function_search_string,
            } => write!(
                f,
                "{}(function_search_string=\"{}\")",
                self.name(),
                function_search_string
            ),
            FragmentSpec::VerifyFunctionHooked { function } => {
                write!(f, "{}(function=\"{}\")", self.name(), function)
            }
            FragmentSpec::Capture {
                duration_ms,
                collect_system_memory_usage,
            } => {
                write!(f, "{}(", self.name())?;
                let mut sep = "";
                if let Some(ms) = duration_ms {
                    write!(f, "duration_ms={}", ms)?;
                    sep = ", ";
                }
                if let Some(collect) = collect_system_memory_usage {
                    write!(f, "{}collect_system_memory_usage={}", sep, collect)?;
                }
                write!(f, ")")
            }
            FragmentSpec::VerifyFunctionCallCount { function, min, max } => write!(
                f,
                "{}(function=\"{}\", min={}, max={})",
                self.name(),
                function,
                min,
                max
            ),
            FragmentSpec::VerifyTracksExist { track_names }
            | FragmentSpec::VerifyTracksDoNotExist { track_names } => {
                write!(f, "{}(track_names=\"{}\")", self.name(), track_names)
            }
            FragmentSpec::SetAndCheckMemorySamplingPeriod {
                memory_sampling_period,
            } => write!(
                f,
                "{}(memory_sampling_period=\"{}\")",
                self.name(),
                memory_sampling_period
            ),
            FragmentSpec::AddIterator { function_name } => {
                write!(f, "{}(function_name=\"{}\")", self.name(), function_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_with_defaults() {
        let spec: FragmentSpec =
            serde_yaml::from_str("fragment: verify_function_call_count\nfunction: DrawFrame\n")
                .unwrap();
        assert_eq!(
            spec,
            FragmentSpec::VerifyFunctionCallCount {
                function: "DrawFrame".to_string(),
                min: 30,
                max: 3000,
            }
        );

        let spec: FragmentSpec = serde_yaml::from_str("fragment: move_tab\n").unwrap();
        assert_eq!(
            spec,
            FragmentSpec::MoveTab {
                tab_title: None,
                tab_name: "FunctionsTab".to_string(),
            }
        );
    }

    #[test]
    fn test_unit_fragment_parses() {
        let spec: FragmentSpec = serde_yaml::from_str("fragment: connect_to_instance\n").unwrap();
        assert!(spec.connects());
        assert_eq!(spec.into_fragment().name(), "ConnectToInstance");
    }

    #[test]
    fn test_unknown_fragment_is_rejected() {
        let result: std::result::Result<FragmentSpec, _> =
            serde_yaml::from_str("fragment: add_breakpoint\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_symbol_and_live_fragments() {
        let specs: Vec<FragmentSpec> = serde_yaml::from_str(
            r#"
- fragment: load_symbols
  module_search_string: hello_ggp
- fragment: filter_and_hook_function
  function_search_string: DrawFrame
- fragment: set_and_check_memory_sampling_period
  memory_sampling_period: "030"
- fragment: add_iterator
  function_name: DrawFrame
"#,
        )
        .unwrap();
        let names: Vec<_> = specs.iter().map(FragmentSpec::name).collect();
        assert_eq!(
            names,
            vec![
                "LoadSymbols",
                "FilterAndHookFunction",
                "SetAndCheckMemorySamplingPeriod",
                "AddIterator",
            ]
        );
        assert_eq!(
            specs[2].to_string(),
            "SetAndCheckMemorySamplingPeriod(memory_sampling_period=\"030\")"
        );
        assert!(specs.iter().all(|spec| !spec.connects()));
    }

    #[test]
    fn test_display_lists_parameters() {
        let spec = FragmentSpec::Capture {
            duration_ms: Some(5000),
            collect_system_memory_usage: Some(true),
        };
        assert_eq!(
            spec.to_string(),
            "Capture(duration_ms=5000, collect_system_memory_usage=true)"
        );
        assert_eq!(
            FragmentSpec::ConnectToInstance.to_string(),
            "ConnectToInstance"
        );
    }
}
