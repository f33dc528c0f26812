use std::fmt;
use std::time::Instant;

use serde::Serialize;

use super::context::Session;
use super::{Fragment, SuiteConfig};
use crate::common::{Error, Result};
use crate::orbit;
use crate::uia::{self, Backend, ControlQuery, ControlType, MouseButton};

/// Lifecycle of a suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteState {
    NotStarted,
    Connected,
    Running,
    TornDown,
    /// A fragment failed; the remaining ones were skipped and no teardown ran
    Aborted,
}

impl fmt::Display for SuiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SuiteState::NotStarted => "not started",
            SuiteState::Connected => "connected",
            SuiteState::Running => "running",
            SuiteState::TornDown => "torn down",
            SuiteState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Result of one fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FragmentStatus {
    Passed,
    Failed { reason: String },
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct FragmentOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: FragmentStatus,
    pub duration_ms: u64,
}

/// Aggregated result of a suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub dev_mode: bool,
    pub fragments: Vec<FragmentOutcome>,
    pub torn_down: bool,
    pub state: SuiteState,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.fragments
            .iter()
            .all(|f| f.status == FragmentStatus::Passed)
    }

    /// Number of fragments that actually ran
    pub fn fragments_run(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| f.status != FragmentStatus::Skipped)
            .count()
    }

    /// The failure that aborted the run, if any
    pub fn failure(&self) -> Option<(&str, &str)> {
        self.fragments.iter().find_map(|f| match &f.status {
            FragmentStatus::Failed { reason } => Some((f.name.as_str(), reason.as_str())),
            _ => None,
        })
    }
}

/// An ordered list of fragments run against one application
pub struct E2eSuite {
    name: String,
    fragments: Vec<Fragment>,
    config: SuiteConfig,
    state: SuiteState,
    session: Option<Session>,
}

impl E2eSuite {
    pub fn new(name: impl Into<String>, fragments: Vec<Fragment>, config: SuiteConfig) -> Self {
        Self {
            name: name.into(),
            fragments,
            config,
            state: SuiteState::NotStarted,
            session: None,
        }
    }

    /// Build a suite and attach it right away
    pub fn connect(
        name: impl Into<String>,
        fragments: Vec<Fragment>,
        config: SuiteConfig,
        backend: &dyn Backend,
    ) -> Result<Self> {
        let mut suite = Self::new(name, fragments, config);
        suite.attach(backend)?;
        Ok(suite)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SuiteState {
        self.state
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn fragment_names(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.name()).collect()
    }

    /// Attach to the application whose window title matches the configured pattern
    pub fn attach(&mut self, backend: &dyn Backend) -> Result<()> {
        if self.state != SuiteState::NotStarted {
            return Err(Error::invalid_state("attach", self.state));
        }

        let pattern = uia::title_regex(&self.config.title_pattern)?;

        let application = backend.connect(&pattern).inspect_err(|_| {
            tracing::error!(
                "Could not find the application. Make sure to start it before running E2E tests."
            );
        })?;

        tracing::info!(
            backend = backend.name(),
            pid = application.process_id(),
            "Attached to application"
        );
        self.session = Some(Session::new(
            self.name.clone(),
            application,
            self.config.clone(),
        ));
        self.state = SuiteState::Connected;
        Ok(())
    }

    fn session(&mut self) -> Result<&mut Session> {
        let state = self.state;
        self.session
            .as_mut()
            .ok_or_else(|| Error::invalid_state("run", state))
    }

    /// Prepare the application: timings, readiness, optional connection, focus
    pub fn set_up(&mut self) -> Result<()> {
        if self.state != SuiteState::Connected {
            return Err(Error::invalid_state("set up", self.state));
        }
        let config = self.config.clone();
        let session = self.session()?;
        let application = session.application().clone();

        application.apply_timings(&config.timings);
        crate::uia::wait_for_condition(
            "the application to show a window",
            config.timeouts.attach,
            config.timings.poll_interval,
            || Ok(application.top_window().is_ok()),
        )?;

        tracing::info!("Setting up with dev_mode = {}", config.dev_mode);
        if !config.dev_mode {
            if config.auto_connect {
                let mut ctx = session.context("ConnectToGamelet");
                orbit::connection::connect_to_gamelet(&mut ctx)?;
            }
        } else {
            tracing::info!("DEV MODE: Skipped gamelet connection, assuming Main Window is active");
        }

        session.top_window(true)?.set_focus()?;
        self.state = SuiteState::Running;
        Ok(())
    }

    /// Close the application unless in dev mode
    pub fn tear_down(&mut self) -> Result<()> {
        if self.state != SuiteState::Running {
            return Err(Error::invalid_state("tear down", self.state));
        }
        let dev_mode = self.config.dev_mode;
        let name = self.name.clone();
        let session = self.session()?;

        if !dev_mode {
            let top = session.top_window(false)?;
            crate::uia::find_control(&top, &ControlQuery::named(ControlType::Button, "Close"))?
                .click_input(MouseButton::Left)?;
            tracing::info!("Closed application.");
        } else {
            tracing::info!("DEV MODE: Skipped closing the application");
        }
        tracing::info!("Test \"{}\" executed without errors", name);

        self.state = SuiteState::TornDown;
        Ok(())
    }

    /// Run every fragment in order, stopping at the first failure
    ///
    /// Set-up and teardown failures are returned as errors; fragment
    /// failures end up in the report.
    pub fn execute(&mut self) -> Result<SuiteReport> {
        self.set_up()?;

        let mut outcomes = Vec::with_capacity(self.fragments.len());
        let mut failed = false;
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::Internal("suite is running without a session".to_string()))?;

        for fragment in &mut self.fragments {
            if failed {
                outcomes.push(FragmentOutcome {
                    name: fragment.name().to_string(),
                    status: FragmentStatus::Skipped,
                    duration_ms: 0,
                });
                continue;
            }

            tracing::info!("Executing fragment \"{}\"", fragment.name());
            let started = Instant::now();
            let status = match fragment.execute(session) {
                Ok(()) => FragmentStatus::Passed,
                Err(e) => {
                    tracing::error!("Fragment \"{}\" failed: {}", fragment.name(), e);
                    failed = true;
                    FragmentStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(FragmentOutcome {
                name: fragment.name().to_string(),
                status,
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }

        if failed {
            tracing::warn!("Skipping teardown, the application is left open for inspection");
            self.state = SuiteState::Aborted;
        } else {
            self.tear_down()?;
        }

        Ok(SuiteReport {
            name: self.name.clone(),
            dev_mode: self.config.dev_mode,
            fragments: outcomes,
            torn_down: self.state == SuiteState::TornDown,
            state: self.state,
        })
    }
}
