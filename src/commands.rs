//! CLI command definitions
//!
//! Defines the clap commands for the orbit-e2e CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::uia::ControlType;

/// Overrides of the configured run flags
#[derive(Args, Debug, Clone, Default)]
pub struct RunFlags {
    /// Expect the main window to be open already and leave the application running
    #[arg(long)]
    pub dev_mode: bool,

    /// Expect the application to be started with the new UI
    #[arg(long)]
    pub enable_ui_beta: bool,

    /// Only connect to instances whose name contains this text
    #[arg(long)]
    pub instance_filter: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a built-in scenario
    Run {
        /// Scenario id (see 'list')
        scenario: String,

        /// Desktop fixture to run against instead of the running profiler
        #[arg(long)]
        desktop: Option<PathBuf>,

        #[command(flatten)]
        flags: RunFlags,
    },

    /// Execute a test scenario defined in a YAML file
    Test {
        /// Path to the YAML test scenario file
        path: PathBuf,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,

        #[command(flatten)]
        flags: RunFlags,
    },

    /// List the built-in scenarios
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the element tree of the profiler or a desktop fixture
    Inspect {
        /// Desktop fixture to inspect instead of the running profiler
        #[arg(long)]
        desktop: Option<PathBuf>,

        /// Maximum depth below the top window
        #[arg(long, default_value = "8")]
        depth: usize,

        /// Window to inspect instead of the top window
        #[arg(long)]
        window: Option<String>,
    },

    /// Look a control up the way fragments do
    Find {
        /// Desktop fixture to search instead of the running profiler
        #[arg(long)]
        desktop: Option<PathBuf>,

        /// Control type (e.g., Button, TabItem)
        control_type: ControlType,

        /// Exact name
        #[arg(long)]
        name: Option<String>,

        /// Name substring
        #[arg(long)]
        name_contains: Option<String>,

        /// Automation id leaf (part after the last '.')
        #[arg(long)]
        auto_id_leaf: Option<String>,

        /// Class name
        #[arg(long)]
        class_name: Option<String>,

        /// Only search the direct children of the window
        #[arg(long)]
        no_recurse: bool,
    },

    /// View the log file
    Logs {
        /// Number of lines to show (default: 50)
        #[arg(long, short = 'n', default_value = "50")]
        lines: usize,

        /// Clear the log file
        #[arg(long)]
        clear: bool,
    },
}
