//! Declarative test scenarios
//!
//! Reads YAML scenarios whose steps are either built-in Orbit fragments or
//! generic control interactions and assertions, and runs them as a suite
//! against a desktop fixture.

mod config;
mod runner;

pub use config::*;
pub use runner::{compile_steps, load_scenario, run_scenario, RunOptions, TestResult};
