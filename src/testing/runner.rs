//! Test runner implementation
//!
//! Compiles the steps of a scenario into fragments and runs them as a
//! suite against the scenario's desktop fixture, or the running profiler
//! when the scenario names none.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use colored::Colorize;
use serde::Serialize;
use tokio::process::Command as TokioCommand;

use crate::common::{Error, Result};
use crate::controls::DataViewPanel;
use crate::mock::MockDesktop;
use crate::suite::{
    E2eSuite, Fragment, FragmentContext, FragmentStatus, SuiteConfig, SuiteReport,
};
use crate::uia::{self, find_control, try_find_control, Backend, Control, MouseButton};

use super::config::{ControlExpectation, ControlSpec, TestScenario, TestStep};

/// Result of a test run
#[derive(Debug, Serialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SuiteReport>,
}

/// How a scenario file is run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Show setup command output and every fragment outcome
    pub verbose: bool,
    /// Base configuration; the scenario's target overrides apply on top
    pub config: SuiteConfig,
    /// Force dev mode regardless of the scenario
    pub dev_mode: bool,
    /// Suppress the colored progress output
    pub quiet: bool,
}

impl RunOptions {
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            verbose: false,
            config,
            dev_mode: false,
            quiet: false,
        }
    }
}

/// Load and parse a scenario file
pub fn load_scenario(path: &Path) -> Result<TestScenario> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    serde_yaml::from_str(&content).map_err(|e| {
        Error::ConfigParse(format!(
            "Failed to parse test scenario '{}': {}",
            path.display(),
            e
        ))
    })
}

fn resolve_relative(scenario_path: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        scenario_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(path)
    } else {
        path.to_path_buf()
    }
}

/// Run a test scenario from a YAML file
pub async fn run_scenario(path: &Path, options: &RunOptions) -> Result<TestResult> {
    let scenario = load_scenario(path)?;
    let steps_total = scenario.steps.len();
    let say = |line: String| {
        if !options.quiet {
            println!("{line}");
        }
    };

    say(format!(
        "\n{} {}",
        "Running Test:".blue().bold(),
        scenario.name.white().bold()
    ));
    if let Some(desc) = &scenario.description {
        say(format!("  {}", desc.dimmed()));
    }

    // Run setup steps
    if let Some(setup_steps) = &scenario.setup {
        say(format!("\n{}", "Setup:".cyan()));
        for step in setup_steps {
            if options.verbose {
                say(format!("  $ {}", step.shell.dimmed()));
            }
            let output = if options.verbose && !options.quiet {
                Stdio::inherit
            } else {
                Stdio::null
            };

            let status = TokioCommand::new("sh")
                .arg("-c")
                .arg(&step.shell)
                .current_dir(path.parent().unwrap_or(Path::new(".")))
                .stdin(Stdio::null())
                .stdout(output())
                .stderr(output())
                .status()
                .await
                .map_err(|e| Error::Config(format!("Setup command failed to execute: {}", e)))?;

            if !status.success() {
                return Ok(TestResult {
                    name: scenario.name.clone(),
                    passed: false,
                    steps_run: 0,
                    steps_total,
                    error: Some(format!(
                        "Setup command '{}' failed with exit code {:?}",
                        step.shell,
                        status.code()
                    )),
                    report: None,
                });
            }
            say(format!("  {} {}", "✓".green(), step.shell.dimmed()));
        }
    }

    let backend: Box<dyn Backend> = match &scenario.target.desktop {
        Some(desktop) => {
            let desktop_path = resolve_relative(path, desktop);
            tracing::debug!(desktop = %desktop_path.display(), "using desktop fixture");
            Box::new(MockDesktop::from_file(&desktop_path)?.backend())
        }
        None => uia::native_backend()?,
    };
    let mut config = scenario.target.apply(options.config.clone());
    if options.dev_mode {
        config.dev_mode = true;
    }
    tracing::debug!(backend = backend.name(), ?config, "running scenario");

    let labels: Vec<String> = scenario.steps.iter().map(TestStep::describe).collect();
    let fragments = compile_steps(scenario.steps);
    let name = scenario.name.clone();

    say(format!("\n{}", "Steps:".cyan()));
    let report = tokio::task::spawn_blocking(move || -> Result<SuiteReport> {
        let mut suite = E2eSuite::connect(name, fragments, config, backend.as_ref())?;
        suite.execute()
    })
    .await
    .map_err(|e| Error::Internal(format!("scenario thread failed: {}", e)))??;

    for (i, (outcome, label)) in report.fragments.iter().zip(&labels).enumerate() {
        let step_num = i + 1;
        match &outcome.status {
            FragmentStatus::Passed => say(format!(
                "  {} Step {}: {}",
                "✓".green(),
                step_num,
                label.dimmed()
            )),
            FragmentStatus::Failed { reason } => {
                say(format!("  {} Step {}: {}", "✗".red(), step_num, label));
                say(format!("      {}", reason.red()));
            }
            FragmentStatus::Skipped => {
                if options.verbose {
                    say(format!(
                        "  {} Step {}: {}",
                        "-".yellow(),
                        step_num,
                        label.dimmed()
                    ));
                }
            }
        }
    }

    let passed = report.passed();
    if passed {
        say(format!(
            "\n{} {}\n",
            "✓".green().bold(),
            "Test Passed".green().bold()
        ));
    } else {
        say(format!(
            "\n{} {}\n",
            "✗".red().bold(),
            "Test Failed".red().bold()
        ));
    }

    Ok(TestResult {
        name: scenario.name,
        passed,
        steps_run: report.fragments_run(),
        steps_total,
        error: report.failure().map(|(_, reason)| reason.to_string()),
        report: Some(report),
    })
}

/// Turn scenario steps into suite fragments
///
/// Built-in fragments keep their own name; other steps are named by their
/// position.
pub fn compile_steps(steps: Vec<TestStep>) -> Vec<Fragment> {
    steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| {
            let name = match &step {
                TestStep::Fragment(spec) => spec.name().to_string(),
                _ => format!("Step{}", i + 1),
            };
            Fragment::new(name, move |ctx| execute_step(ctx, &step))
        })
        .collect()
}

/// Execute a single test step
fn execute_step(ctx: &mut FragmentContext<'_>, step: &TestStep) -> Result<()> {
    match step {
        TestStep::Fragment(spec) => spec.run(ctx),
        TestStep::Click {
            control,
            button,
            double,
        } => {
            let control = resolve(ctx, control)?;
            match (button, double) {
                (MouseButton::Left, true) => control.double_click_input(),
                (button, _) => control.click_input(*button),
            }
        }
        TestStep::SetText { control, text } => resolve(ctx, control)?.set_edit_text(text),
        TestStep::TypeKeys { control, keys } => {
            let target = match control {
                Some(control) => resolve(ctx, control)?,
                None => ctx.application().top_window()?,
            };
            target.type_keys(keys)
        }
        TestStep::ExpectControl { control, expect } => {
            let Some(found) = try_resolve(ctx, control)? else {
                return Err(ctx.failure(&format!("{control} exists")));
            };
            if let Some(expect) = expect {
                let mismatches = check_expectation(&found, expect)?;
                ctx.expect_true(
                    mismatches.is_empty(),
                    &format!("{control}: {}", mismatches.join("; ")),
                )?;
            }
            Ok(())
        }
        TestStep::ExpectMissing { control } => {
            let found = try_resolve(ctx, control)?;
            ctx.expect_true(found.is_none(), &format!("{control} does not exist"))
        }
        TestStep::WaitFor {
            control,
            timeout_ms,
            expect,
        } => {
            let timeout = timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(ctx.config().timeouts.main_window);
            ctx.wait_for(&format!("{control}"), timeout, |ctx| {
                let Some(found) = try_resolve(ctx, control)? else {
                    return Ok(false);
                };
                match expect {
                    Some(expect) => Ok(check_expectation(&found, expect)?.is_empty()),
                    None => Ok(true),
                }
            })
        }
        TestStep::ExpectTopWindow { class_name, title } => {
            let top = ctx.top_window(true)?;
            if let Some(class_name) = class_name {
                ctx.expect_eq(
                    top.class_name()?,
                    class_name.clone(),
                    &format!("Top window has class {class_name}"),
                )?;
            }
            if let Some(title) = title {
                ctx.expect_eq(
                    top.text()?,
                    title.clone(),
                    &format!("Top window is titled \"{title}\""),
                )?;
            }
            Ok(())
        }
        TestStep::FindRow {
            panel,
            text,
            column,
            partial,
            expect_row,
        } => {
            let panel = DataViewPanel::new(resolve(ctx, panel)?)?;
            let row = panel.find_first_item_row(text, *column, *partial)?;
            let description = match expect_row {
                Some(expected) => format!("\"{text}\" is in row {expected}"),
                None => format!("No row contains \"{text}\""),
            };
            ctx.expect_eq(row, *expect_row, &description)
        }
        TestStep::Sleep { millis } => {
            ctx.sleep(Duration::from_millis(*millis));
            Ok(())
        }
    }
}

/// Root below which a control spec is searched
fn root(ctx: &mut FragmentContext<'_>, spec: &ControlSpec) -> Result<Control> {
    if let Some(parent) = &spec.parent {
        return resolve(ctx, parent);
    }
    match &spec.window {
        Some(window) => ctx.application().window(window),
        None => ctx.top_window(false),
    }
}

fn resolve(ctx: &mut FragmentContext<'_>, spec: &ControlSpec) -> Result<Control> {
    let root = root(ctx, spec)?;
    find_control(&root, &spec.query)
}

fn try_resolve(ctx: &mut FragmentContext<'_>, spec: &ControlSpec) -> Result<Option<Control>> {
    match root(ctx, spec) {
        Ok(root) => try_find_control(&root, &spec.query),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Descriptions of the expectations that do not hold
fn check_expectation(control: &Control, expect: &ControlExpectation) -> Result<Vec<String>> {
    let mut mismatches = Vec::new();

    if expect.text.is_some() || expect.text_contains.is_some() {
        let text = control.text()?;
        if let Some(expected) = &expect.text {
            if &text != expected {
                mismatches.push(format!("text is \"{expected}\" (got \"{text}\")"));
            }
        }
        if let Some(needle) = &expect.text_contains {
            if !text.contains(needle.as_str()) {
                mismatches.push(format!("text contains \"{needle}\" (got \"{text}\")"));
            }
        }
    }

    let flags = [
        ("visible", expect.visible, Control::is_visible as fn(&Control) -> Result<bool>),
        ("enabled", expect.enabled, Control::is_enabled),
        ("active", expect.active, Control::is_active),
    ];
    for (label, expected, get) in flags {
        if let Some(expected) = expected {
            let actual = get(control)?;
            if actual != expected {
                mismatches.push(format!("{label} is {expected} (got {actual})"));
            }
        }
    }

    if let Some(expected) = expect.checked {
        let actual = control.toggle_state()?;
        if actual != Some(expected) {
            mismatches.push(format!("checked is {expected} (got {actual:?})"));
        }
    }
    if let Some(expected) = expect.item_count {
        let actual = control.item_count()?;
        if actual != expected {
            mismatches.push(format!("item count is {expected} (got {actual})"));
        }
    }
    if let Some(expected) = expect.control_count {
        let actual = control.control_count()?;
        if actual != expected {
            mismatches.push(format!("control count is {expected} (got {actual})"));
        }
    }

    Ok(mismatches)
}
