//! Built-in scenarios
//!
//! Each scenario is a fixed fragment list. They all start with their own
//! `ConnectToInstance`, so the suite must not auto-connect during set-up.

use super::FragmentSpec;

/// A named, ready-made fragment list
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Identifier used on the command line (e.g., "move-tabs")
    pub id: &'static str,
    /// Suite name shown in logs and reports
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> Vec<FragmentSpec>,
}

impl Scenario {
    pub fn fragments(&self) -> Vec<FragmentSpec> {
        (self.build)()
    }

    /// Whether set-up should still connect to an instance
    pub fn auto_connect(&self) -> bool {
        !self.fragments().iter().any(FragmentSpec::connects)
    }
}

fn select_process(filter: &str) -> FragmentSpec {
    FragmentSpec::FilterAndSelectFirstProcess {
        process_filter: filter.to_string(),
    }
}

fn connect() -> Vec<FragmentSpec> {
    vec![FragmentSpec::ConnectToInstance, select_process("hello_ggp")]
}

fn move_tabs() -> Vec<FragmentSpec> {
    vec![
        FragmentSpec::ConnectToInstance,
        select_process("hello_ggp"),
        FragmentSpec::MoveTab {
            tab_title: None,
            tab_name: "FunctionsTab".to_string(),
        },
    ]
}

fn load_presets() -> Vec<FragmentSpec> {
    let functions = ["DrawFrame", "GgpIssueFrameToken"];
    let mut fragments = vec![FragmentSpec::ConnectToInstance, select_process("hello_")];
    fragments.extend(
        [
            "draw_frame_in_hello_ggp_1_52",
            "ggp_issue_frame_token_in_hello_ggp_1_52",
        ]
        .into_iter()
        .map(|preset| FragmentSpec::LoadPreset {
            preset: preset.to_string(),
        }),
    );
    fragments.extend(functions.iter().map(|f| FragmentSpec::VerifyFunctionHooked {
        function: f.to_string(),
    }));
    fragments.push(FragmentSpec::Capture {
        duration_ms: None,
        collect_system_memory_usage: None,
    });
    // ~300 calls expected at 60 Hz over five seconds
    fragments.extend(functions.iter().map(|f| FragmentSpec::VerifyFunctionCallCount {
        function: f.to_string(),
        min: 30,
        max: 3000,
    }));
    fragments
}

fn memory_tracing() -> Vec<FragmentSpec> {
    let mut fragments = vec![FragmentSpec::ConnectToInstance, select_process("hello_ggp")];
    // Only the first period is valid, the others must leave it in place
    fragments.extend(["030", "", "ab", "0"].into_iter().map(|period| {
        FragmentSpec::SetAndCheckMemorySamplingPeriod {
            memory_sampling_period: period.to_string(),
        }
    }));
    fragments.extend([
        FragmentSpec::Capture {
            duration_ms: None,
            collect_system_memory_usage: Some(true),
        },
        FragmentSpec::VerifyTracksExist {
            track_names: "*Memory*".to_string(),
        },
        FragmentSpec::Capture {
            duration_ms: None,
            collect_system_memory_usage: Some(false),
        },
        FragmentSpec::VerifyTracksDoNotExist {
            track_names: "*Memory*".to_string(),
        },
    ]);
    fragments
}

fn add_iterator() -> Vec<FragmentSpec> {
    vec![
        FragmentSpec::ConnectToInstance,
        select_process("hello_ggp"),
        FragmentSpec::LoadSymbols {
            module_search_string: "hello_ggp".to_string(),
        },
        FragmentSpec::FilterAndHookFunction {
            function_search_string: "DrawFrame".to_string(),
        },
        FragmentSpec::Capture {
            duration_ms: None,
            collect_system_memory_usage: None,
        },
        FragmentSpec::AddIterator {
            function_name: "DrawFrame".to_string(),
        },
    ]
}

static SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "connect",
        name: "Connect",
        description: "Connect to an instance and select a process",
        build: connect,
    },
    Scenario {
        id: "move-tabs",
        name: "Move tabs",
        description: "Move the functions tab to the left pane and back",
        build: move_tabs,
    },
    Scenario {
        id: "load-presets",
        name: "Load presets",
        description: "Apply two presets, capture and check the call counts",
        build: load_presets,
    },
    Scenario {
        id: "memory-tracing",
        name: "Collect System Memory Usage",
        description: "Check the memory sampling period, capture with and without memory tracing",
        build: memory_tracing,
    },
    Scenario {
        id: "add-iterator",
        name: "Add Iterator",
        description: "Load symbols, hook DrawFrame, capture and add an iterator over its calls",
        build: add_iterator,
    },
];

/// All built-in scenarios
pub fn all_scenarios() -> &'static [Scenario] {
    SCENARIOS
}

/// Look a scenario up by id
pub fn get_scenario(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_scenario() {
        assert_eq!(get_scenario("move-tabs").unwrap().name, "Move tabs");
        assert_eq!(get_scenario("add-iterator").unwrap().name, "Add Iterator");
        assert!(get_scenario("frame-tracks").is_none());
    }

    #[test]
    fn test_builtin_scenarios_connect_themselves() {
        for scenario in all_scenarios() {
            let fragments = scenario.fragments();
            assert_eq!(fragments[0], FragmentSpec::ConnectToInstance, "{}", scenario.id);
            assert!(!scenario.auto_connect());
        }
    }

    #[test]
    fn test_load_presets_order() {
        let names: Vec<_> = get_scenario("load-presets")
            .unwrap()
            .fragments()
            .iter()
            .map(FragmentSpec::name)
            .collect();
        assert_eq!(
            names,
            vec![
                "ConnectToInstance",
                "FilterAndSelectFirstProcess",
                "LoadPreset",
                "LoadPreset",
                "VerifyFunctionHooked",
                "VerifyFunctionHooked",
                "Capture",
                "VerifyFunctionCallCount",
                "VerifyFunctionCallCount",
            ]
        );
    }

    #[test]
    fn test_memory_tracing_checks_sampling_periods_first() {
        let fragments = get_scenario("memory-tracing").unwrap().fragments();
        let periods: Vec<_> = fragments
            .iter()
            .filter_map(|spec| match spec {
                FragmentSpec::SetAndCheckMemorySamplingPeriod {
                    memory_sampling_period,
                } => Some(memory_sampling_period.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(periods, vec!["030", "", "ab", "0"]);
        assert_eq!(fragments[2].name(), "SetAndCheckMemorySamplingPeriod");
        assert_eq!(fragments[6].name(), "Capture");
    }
}
