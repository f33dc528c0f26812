//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;

use crate::commands::{Commands, RunFlags};
use crate::common::config::Config;
use crate::common::{logging, Error, Result};
use crate::mock::MockDesktop;
use crate::orbit::{self, FragmentSpec};
use crate::suite::{E2eSuite, FragmentStatus, SuiteConfig, SuiteReport};
use crate::testing::{self, RunOptions};
use crate::uia::{self, find_control, Application, Backend, Control, ControlQuery};

/// Dispatch a CLI command
///
/// Returns whether the command succeeded; a suite or scenario that ran but
/// failed is not an error.
pub async fn dispatch(command: Commands, config: Config) -> Result<bool> {
    match command {
        Commands::Run {
            scenario,
            desktop,
            flags,
        } => {
            let scenario = orbit::get_scenario(&scenario)
                .ok_or_else(|| Error::UnknownScenario(scenario.clone()))?;
            let suite_config = suite_config(&config, &flags).with_auto_connect(scenario.auto_connect());
            let backend = backend(desktop.as_deref())?;
            let fragments = scenario
                .fragments()
                .into_iter()
                .map(FragmentSpec::into_fragment)
                .collect();

            if !flags.json {
                println!(
                    "\n{} {}",
                    "Running Scenario:".blue().bold(),
                    scenario.name.white().bold()
                );
                println!("  {}", scenario.description.dimmed());
            }

            let name = scenario.name;
            let report = tokio::task::spawn_blocking(move || -> Result<SuiteReport> {
                let mut suite = E2eSuite::connect(name, fragments, suite_config, backend.as_ref())?;
                suite.execute()
            })
            .await
            .map_err(|e| Error::Internal(format!("suite thread failed: {}", e)))??;

            if flags.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(report.passed())
        }

        Commands::Test {
            path,
            verbose,
            flags,
        } => {
            let options = RunOptions {
                verbose,
                config: suite_config(&config, &flags),
                dev_mode: flags.dev_mode,
                quiet: flags.json,
            };
            let result = testing::run_scenario(&path, &options).await?;

            if flags.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if let Some(error) = &result.error {
                if result.report.is_none() {
                    println!("{} {}", "✗".red(), error);
                }
            }
            Ok(result.passed)
        }

        Commands::List { json } => {
            let scenarios = orbit::all_scenarios();
            if json {
                let listing: Vec<_> = scenarios
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "id": s.id,
                            "name": s.name,
                            "description": s.description,
                            "fragments": s.fragments(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&listing)?);
                return Ok(true);
            }

            for scenario in scenarios {
                println!(
                    "{:<16} {}",
                    scenario.id.green().bold(),
                    scenario.description
                );
                for fragment in scenario.fragments() {
                    println!("{:<16} - {}", "", fragment.to_string().dimmed());
                }
            }
            Ok(true)
        }

        Commands::Inspect {
            desktop,
            depth,
            window,
        } => {
            let application = attach(&config, desktop.as_deref())?;
            let root = match window {
                Some(window) => application.window(&window)?,
                None => application.top_window()?,
            };
            print_tree(&root, 0, depth)?;
            Ok(true)
        }

        Commands::Find {
            desktop,
            control_type,
            name,
            name_contains,
            auto_id_leaf,
            class_name,
            no_recurse,
        } => {
            let application = attach(&config, desktop.as_deref())?;
            let query = ControlQuery {
                control_type,
                name,
                name_contains,
                auto_id_leaf,
                class_name,
                recurse: !no_recurse,
            };
            let top = application.top_window()?;
            let control = find_control(&top, &query)?;

            println!("{}", describe_line(&control)?);
            let mut ancestors = Vec::new();
            let mut current = control.parent()?;
            while let Some(parent) = current {
                ancestors.push(parent.describe());
                current = parent.parent()?;
            }
            if !ancestors.is_empty() {
                ancestors.reverse();
                println!("  {} {}", "in".dimmed(), ancestors.join(" > ").dimmed());
            }
            Ok(true)
        }

        Commands::Logs { lines, clear } => {
            if clear {
                logging::truncate_log()?;
                println!("Log file cleared");
                return Ok(true);
            }

            let entries = logging::tail_log(lines)?;
            if entries.is_empty() {
                println!("Log file is empty");
            }
            for line in entries {
                println!("{}", line);
            }
            Ok(true)
        }
    }
}

/// The scripted desktop when a fixture is given, the platform backend otherwise
fn backend(desktop: Option<&Path>) -> Result<Box<dyn Backend>> {
    match desktop {
        Some(path) => Ok(Box::new(MockDesktop::from_file(path)?.backend())),
        None => uia::native_backend(),
    }
}

/// Attach to the configured application for a one-off look at its tree
fn attach(config: &Config, desktop: Option<&Path>) -> Result<Arc<dyn Application>> {
    let pattern = uia::title_regex(&config.application.title_pattern)?;
    backend(desktop)?.connect(&pattern)
}

/// The configured suite settings with command-line overrides applied
fn suite_config(config: &Config, flags: &RunFlags) -> SuiteConfig {
    let mut suite_config = SuiteConfig::from_config(config);
    if flags.dev_mode {
        suite_config.dev_mode = true;
    }
    if flags.enable_ui_beta {
        suite_config.enable_ui_beta = true;
    }
    if flags.instance_filter.is_some() {
        suite_config.instance_filter = flags.instance_filter.clone();
    }
    suite_config
}

fn print_report(report: &SuiteReport) {
    println!();
    for outcome in &report.fragments {
        match &outcome.status {
            FragmentStatus::Passed => println!(
                "  {} {} {}",
                "✓".green(),
                outcome.name,
                format!("({} ms)", outcome.duration_ms).dimmed()
            ),
            FragmentStatus::Failed { reason } => {
                println!("  {} {}", "✗".red(), outcome.name);
                println!("      {}", reason.red());
            }
            FragmentStatus::Skipped => {
                println!("  {} {} {}", "-".yellow(), outcome.name, "(skipped)".dimmed())
            }
        }
    }

    if report.passed() {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            "Scenario Passed".green().bold()
        );
    } else {
        println!(
            "\n{} {} ({} of {} fragments run, application left open)\n",
            "✗".red().bold(),
            "Scenario Failed".red().bold(),
            report.fragments_run(),
            report.fragments.len()
        );
    }
}

fn describe_line(control: &Control) -> Result<String> {
    let mut line = control.describe();
    let automation_id = control.automation_id()?;
    if !automation_id.is_empty() {
        line.push_str(&format!(" #{}", automation_id));
    }
    let class_name = control.class_name()?;
    if !class_name.is_empty() {
        line.push_str(&format!(" .{}", class_name));
    }
    if let Ok((rows, columns)) = control.grid_dimensions() {
        line.push_str(&format!(" [{}x{}]", rows, columns));
    }
    if !control.is_visible()? {
        line.push_str(" (hidden)");
    }
    if !control.is_enabled()? {
        line.push_str(" (disabled)");
    }
    Ok(line)
}

fn print_tree(control: &Control, level: usize, max_depth: usize) -> Result<()> {
    println!("{}{}", "  ".repeat(level), describe_line(control)?);
    if level >= max_depth {
        return Ok(());
    }
    for child in control.children()? {
        print_tree(&child, level + 1, max_depth)?;
    }
    Ok(())
}
