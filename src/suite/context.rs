use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use super::SuiteConfig;
use crate::common::{Error, Result};
use crate::uia::{self, Application, Control, ControlQuery};

/// State shared by all fragments of one attached suite
pub struct Session {
    suite_name: String,
    application: Arc<dyn Application>,
    config: SuiteConfig,
    top_window: Option<Control>,
}

impl Session {
    pub(super) fn new(
        suite_name: String,
        application: Arc<dyn Application>,
        config: SuiteConfig,
    ) -> Self {
        Self {
            suite_name,
            application,
            config,
            top_window: None,
        }
    }

    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    pub fn application(&self) -> &Arc<dyn Application> {
        &self.application
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// The cached top window, refreshed from the application on request
    /// or when nothing is cached yet
    pub fn top_window(&mut self, force_update: bool) -> Result<Control> {
        match &self.top_window {
            Some(window) if !force_update => Ok(window.clone()),
            _ => {
                let window = self.application.top_window()?;
                self.top_window = Some(window.clone());
                Ok(window)
            }
        }
    }

    /// Context for running the fragment named `fragment`
    pub fn context<'a>(&'a mut self, fragment: &'a str) -> FragmentContext<'a> {
        FragmentContext {
            session: self,
            fragment,
        }
    }
}

/// What a fragment sees while it runs
pub struct FragmentContext<'a> {
    session: &'a mut Session,
    fragment: &'a str,
}

impl FragmentContext<'_> {
    pub fn suite_name(&self) -> &str {
        &self.session.suite_name
    }

    pub fn fragment_name(&self) -> &str {
        self.fragment
    }

    pub fn application(&self) -> Arc<dyn Application> {
        Arc::clone(&self.session.application)
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.session.config
    }

    pub fn top_window(&mut self, force_update: bool) -> Result<Control> {
        self.session.top_window(force_update)
    }

    /// Find a control below the cached top window
    pub fn find_control(&mut self, query: &ControlQuery) -> Result<Control> {
        let top = self.top_window(false)?;
        uia::find_control(&top, query)
    }

    /// Find a control below an explicit parent
    pub fn find_control_in(&self, parent: &Control, query: &ControlQuery) -> Result<Control> {
        uia::find_control(parent, query)
    }

    /// Like `find_control`, but `Ok(None)` when nothing matches
    pub fn try_find_control(&mut self, query: &ControlQuery) -> Result<Option<Control>> {
        let top = self.top_window(false)?;
        uia::try_find_control(&top, query)
    }

    /// The assertion error for this fragment
    pub fn failure(&self, description: &str) -> Error {
        Error::assertion_failed(self.suite_name(), self.fragment, description)
    }

    /// Fail the fragment with `description` unless `condition` holds
    pub fn expect_true(&self, condition: bool, description: &str) -> Result<()> {
        if condition {
            Ok(())
        } else {
            Err(self.failure(description))
        }
    }

    /// Fail the fragment with `description` unless `left == right`
    pub fn expect_eq<T>(&self, left: T, right: T, description: &str) -> Result<()>
    where
        T: PartialEq + Debug,
    {
        if left != right {
            tracing::debug!(?left, ?right, "{}", description);
        }
        self.expect_true(left == right, description)
    }

    /// Poll `condition` with the suite's poll interval until it holds
    pub fn wait_for<F>(&mut self, description: &str, timeout: Duration, mut condition: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<bool>,
    {
        let poll_interval = self.config().timings.poll_interval;
        uia::wait_for_condition(description, timeout, poll_interval, || condition(&mut *self))
    }

    /// Block for a fixed amount of time
    pub fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
