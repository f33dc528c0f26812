//! Suite execution
//!
//! A suite attaches to a running application, prepares it, runs its
//! fragments in order and closes the application again. The first failing
//! fragment aborts the run and leaves the application open.

mod config;
mod context;
mod fragment;
mod runner;

pub use config::{SuiteConfig, SuiteTimeouts};
pub use context::{FragmentContext, Session};
pub use fragment::Fragment;
pub use runner::{E2eSuite, FragmentOutcome, FragmentStatus, SuiteReport, SuiteState};
