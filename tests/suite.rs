//! Built-in scenarios run against the scripted Orbit desktops

use std::path::PathBuf;

use orbit_e2e::controls::DataViewPanel;
use orbit_e2e::mock::{Action, MockDesktop};
use orbit_e2e::orbit::{self, FragmentSpec};
use orbit_e2e::suite::{FragmentStatus, SuiteState};
use orbit_e2e::uia::{Application, ControlQuery, ControlType, MouseButton, ENTER_KEY};
use orbit_e2e::{E2eSuite, Error, Fragment, SuiteConfig, SuiteReport};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn desktop(name: &str) -> MockDesktop {
    MockDesktop::from_file(&fixture(name)).expect("fixture should load")
}

fn run_builtin(id: &str, desktop: &MockDesktop, config: SuiteConfig) -> SuiteReport {
    let scenario = orbit::get_scenario(id).expect("scenario should exist");
    let fragments = scenario
        .fragments()
        .into_iter()
        .map(FragmentSpec::into_fragment)
        .collect();
    let config = config.with_auto_connect(scenario.auto_connect());
    let mut suite = E2eSuite::connect(scenario.name, fragments, config, &desktop.backend())
        .expect("suite should attach");
    suite.execute().expect("suite should run")
}

fn assert_passed(report: &SuiteReport) {
    assert!(
        report.passed(),
        "suite '{}' failed: {:?}",
        report.name,
        report.failure()
    );
}

#[test]
fn test_builtin_scenarios_pass_on_classic_ui() {
    for scenario in orbit::all_scenarios() {
        let desktop = desktop("orbit_desktop.yaml");
        let report = run_builtin(scenario.id, &desktop, SuiteConfig::fast());

        assert_passed(&report);
        assert_eq!(report.fragments.len(), scenario.fragments().len());
        assert_eq!(report.state, SuiteState::TornDown);
        assert!(!desktop.is_running(), "{} left Orbit open", scenario.id);
    }
}

#[test]
fn test_connect_and_move_tabs_on_beta_ui() {
    for id in ["connect", "move-tabs"] {
        let desktop = desktop("orbit_desktop_beta.yaml");
        let report = run_builtin(id, &desktop, SuiteConfig::fast().with_ui_beta(true));
        assert_passed(&report);

        let actions = desktop.actions();
        assert!(actions.contains(&Action::Click {
            target: "RadioButton 'ConnectToStadia'".to_string(),
            button: MouseButton::Left,
            double: false,
        }));
    }
}

#[test]
fn test_classic_ui_lacks_beta_controls() {
    let desktop = desktop("orbit_desktop.yaml");
    let report = run_builtin("connect", &desktop, SuiteConfig::fast().with_ui_beta(true));

    let (name, reason) = report.failure().expect("connect should fail");
    assert_eq!(name, "ConnectToInstance");
    assert!(reason.contains("RadioButton"), "{reason}");
    assert_eq!(report.fragments[1].status, FragmentStatus::Skipped);
    assert!(desktop.is_running());
}

#[test]
fn test_instance_filter_selects_matching_instance() {
    let desktop = desktop("orbit_desktop.yaml");
    let config = SuiteConfig::fast().with_instance_filter(Some("us-2".to_string()));
    let report = run_builtin("connect", &desktop, config);
    assert_passed(&report);

    assert!(desktop.actions().contains(&Action::Click {
        target: "DataItem 'gamelet-us-2'".to_string(),
        button: MouseButton::Left,
        double: true,
    }));
}

#[test]
fn test_unmatched_instance_filter_aborts() {
    let desktop = desktop("orbit_desktop.yaml");
    let config = SuiteConfig::fast().with_instance_filter(Some("asia".to_string()));
    let report = run_builtin("move-tabs", &desktop, config);

    assert!(!report.passed());
    assert_eq!(report.fragments_run(), 1);
    assert_eq!(
        report.failure().map(|(_, reason)| reason.to_string()),
        Some(
            "Error executing test case Move tabs, fragment ConnectToInstance. \
             Condition did not hold: \"Found an instance matching \"asia\"\""
                .to_string()
        )
    );
    assert_eq!(report.state, SuiteState::Aborted);
    assert!(!report.torn_down);
}

#[test]
fn test_auto_connect_during_set_up() {
    let desktop = desktop("orbit_desktop.yaml");
    let fragments = vec![
        FragmentSpec::FilterAndSelectFirstProcess {
            process_filter: "sshd".to_string(),
        }
        .into_fragment(),
        Fragment::new("CheckMainWindow", |ctx| {
            let top = ctx.top_window(false)?;
            ctx.expect_eq(top.class_name()?, "OrbitMainWindow".to_string(), "Main window is cached")
        }),
    ];

    let mut suite =
        E2eSuite::connect("Auto connect", fragments, SuiteConfig::fast(), &desktop.backend())
            .unwrap();
    let report = suite.execute().unwrap();
    assert_passed(&report);
    assert!(desktop.actions().contains(&Action::Click {
        target: "TreeItem 'sshd'".to_string(),
        button: MouseButton::Left,
        double: false,
    }));
}

#[test]
fn test_dev_mode_skips_connection_and_close() {
    let desktop = desktop("orbit_desktop.yaml");
    let fragments = vec![Fragment::new("SessionSetupIsOpen", |ctx| {
        let top = ctx.top_window(false)?;
        ctx.expect_eq(top.class_name()?, "SessionSetupDialog".to_string(), "Dialog is on top")
    })];

    let config = SuiteConfig::fast().with_dev_mode(true);
    let mut suite = E2eSuite::connect("Dev", fragments, config, &desktop.backend()).unwrap();
    let report = suite.execute().unwrap();

    assert_passed(&report);
    assert!(report.dev_mode);
    assert!(desktop.is_running());
    assert!(!desktop
        .actions()
        .iter()
        .any(|a| matches!(a, Action::Click { .. })));
}

#[test]
fn test_attach_requires_matching_window() {
    let desktop = desktop("orbit_desktop.yaml");
    let config = SuiteConfig {
        title_pattern: "^renderdoc".to_string(),
        ..SuiteConfig::fast()
    };
    let result = E2eSuite::connect("Nothing", Vec::new(), config, &desktop.backend());
    assert!(matches!(result, Err(Error::ApplicationNotFound { .. })));
}

#[test]
fn test_missing_preset_fails_with_lookup_error() {
    let desktop = desktop("orbit_desktop.yaml");
    let mut fragments: Vec<Fragment> = orbit::get_scenario("connect")
        .unwrap()
        .fragments()
        .into_iter()
        .map(FragmentSpec::into_fragment)
        .collect();
    fragments.push(
        FragmentSpec::LoadPreset {
            preset: "missing_preset".to_string(),
        }
        .into_fragment(),
    );
    fragments.push(
        FragmentSpec::VerifyFunctionHooked {
            function: "DrawFrame".to_string(),
        }
        .into_fragment(),
    );

    let config = SuiteConfig::fast().with_auto_connect(false);
    let mut suite = E2eSuite::connect("Presets", fragments, config, &desktop.backend()).unwrap();
    let report = suite.execute().unwrap();

    let (name, reason) = report.failure().unwrap();
    assert_eq!(name, "LoadPreset");
    assert!(reason.starts_with("Could not find element of type TreeItem"), "{reason}");
    assert_eq!(report.fragments[3].status, FragmentStatus::Skipped);
}

#[test]
fn test_unhooked_function_is_reported() {
    let desktop = desktop("orbit_desktop.yaml");
    let fragments = vec![FragmentSpec::VerifyFunctionHooked {
        function: "main".to_string(),
    }
    .into_fragment()];

    let mut suite =
        E2eSuite::connect("Hooks", fragments, SuiteConfig::fast(), &desktop.backend()).unwrap();
    let report = suite.execute().unwrap();
    assert_eq!(
        report.failure().map(|(_, reason)| reason.to_string()),
        Some(
            "Error executing test case Hooks, fragment VerifyFunctionHooked. \
             Condition did not hold: \"Function main is hooked\""
                .to_string()
        )
    );
}

#[test]
fn test_call_count_out_of_bounds() {
    let desktop = desktop("orbit_desktop.yaml");
    // Without a capture the counts are still zero
    let fragments = vec![FragmentSpec::VerifyFunctionCallCount {
        function: "DrawFrame".to_string(),
        min: 30,
        max: 3000,
    }
    .into_fragment()];

    let mut suite =
        E2eSuite::connect("Counts", fragments, SuiteConfig::fast(), &desktop.backend()).unwrap();
    let report = suite.execute().unwrap();
    let (_, reason) = report.failure().unwrap();
    assert!(
        reason.ends_with("\"Number of calls to \"DrawFrame\" is between 30 and 3000\""),
        "{reason}"
    );
}

#[test]
fn test_memory_tracing_commits_each_sampling_period() {
    let desktop = desktop("orbit_desktop.yaml");
    let report = run_builtin("memory-tracing", &desktop, SuiteConfig::fast());
    assert_passed(&report);

    let edit = "Edit 'Memory sampling period (ms)'".to_string();
    let actions = desktop.actions();
    assert!(actions.contains(&Action::TypeKeys {
        target: edit.clone(),
        keys: "030".to_string(),
    }));
    let commits = actions
        .iter()
        .filter(|a| {
            **a == Action::TypeKeys {
                target: edit.clone(),
                keys: ENTER_KEY.to_string(),
            }
        })
        .count();
    assert_eq!(commits, 4);
}

#[test]
fn test_invalid_sampling_period_keeps_previous_value() {
    let desktop = desktop("orbit_desktop.yaml");
    let fragments = ["ab", "0", "", "25"]
        .into_iter()
        .map(|period| {
            FragmentSpec::SetAndCheckMemorySamplingPeriod {
                memory_sampling_period: period.to_string(),
            }
            .into_fragment()
        })
        .chain(std::iter::once(Fragment::new("SamplingPeriodIs25", |ctx| {
            let edit = ctx.find_control(
                &ControlQuery::new(ControlType::Edit).auto_id_leaf("MemorySamplingPeriodEdit"),
            )?;
            ctx.expect_eq(edit.value()?, "25".to_string(), "Sampling period is 25")
        })))
        .collect();

    let mut suite =
        E2eSuite::connect("Sampling", fragments, SuiteConfig::fast(), &desktop.backend()).unwrap();
    let report = suite.execute().unwrap();
    assert_passed(&report);
}

#[test]
fn test_add_iterator_hooks_and_adds_iterator() {
    let desktop = desktop("orbit_desktop.yaml");
    let report = run_builtin("add-iterator", &desktop, SuiteConfig::fast());
    assert_passed(&report);
    assert_eq!(report.name, "Add Iterator");

    let actions = desktop.actions();
    for item in ["Load Symbols", "Hook", "Add iterator(s)"] {
        assert!(
            actions.contains(&Action::Click {
                target: format!("MenuItem '{item}'"),
                button: MouseButton::Left,
                double: false,
            }),
            "{item} was not chosen"
        );
    }
    assert!(actions.contains(&Action::TypeKeys {
        target: "Edit 'Filter'".to_string(),
        keys: "hello_ggp".to_string(),
    }));
}

#[test]
fn test_iterator_requires_live_function() {
    let desktop = desktop("orbit_desktop.yaml");
    let fragments = vec![FragmentSpec::AddIterator {
        function_name: "main".to_string(),
    }
    .into_fragment()];

    let mut suite =
        E2eSuite::connect("Iterators", fragments, SuiteConfig::fast(), &desktop.backend()).unwrap();
    let report = suite.execute().unwrap();
    let (name, reason) = report.failure().unwrap();
    assert_eq!(name, "AddIterator");
    assert!(reason.ends_with("\"Function main is in the live view\""), "{reason}");
}

#[test]
fn test_hooking_unknown_function_times_out() {
    let desktop = desktop("orbit_desktop.yaml");
    let fragments = vec![FragmentSpec::FilterAndHookFunction {
        function_search_string: "NoSuchFunction".to_string(),
    }
    .into_fragment()];

    let mut suite =
        E2eSuite::connect("Hooking", fragments, SuiteConfig::fast(), &desktop.backend()).unwrap();
    let report = suite.execute().unwrap();
    let (_, reason) = report.failure().unwrap();
    assert!(
        reason.starts_with("Timed out after 200 ms waiting for a function to match \"NoSuchFunction\""),
        "{reason}"
    );
}

#[test]
fn test_loading_symbols_marks_module_loaded() {
    let desktop = desktop("orbit_desktop.yaml");
    let fragments = vec![
        FragmentSpec::LoadSymbols {
            module_search_string: "hello_ggp".to_string(),
        }
        .into_fragment(),
        Fragment::new("ModuleIsLoaded", |ctx| {
            let modules = DataViewPanel::new(
                ctx.find_control(&ControlQuery::named(ControlType::Group, "ModulesDataView"))?,
            )?;
            ctx.expect_eq(modules.row_count()?, 1, "One module is listed")?;
            ctx.expect_eq(modules.item_at(0, 0)?.text()?, "*".to_string(), "Module is loaded")
        }),
    ];

    let mut suite =
        E2eSuite::connect("Symbols", fragments, SuiteConfig::fast(), &desktop.backend()).unwrap();
    let report = suite.execute().unwrap();
    assert_passed(&report);
}
