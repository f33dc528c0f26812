//! orbit-e2e - end-to-end UI scenarios for the Orbit profiler
//!
//! Attaches to a running application through an accessibility-tree
//! backend, runs ordered fragments against its widgets and reports the
//! outcome of each. On Windows the backend is the system's UI Automation
//! client; a scripted in-memory desktop stands in for the real application
//! in tests and wherever `--desktop` is given.

pub mod cli;
pub mod commands;
pub mod common;
pub mod controls;
pub mod mock;
pub mod orbit;
pub mod suite;
pub mod testing;
pub mod uia;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use suite::{E2eSuite, Fragment, SuiteConfig, SuiteReport};
