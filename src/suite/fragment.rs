use std::fmt;

use super::context::{FragmentContext, Session};
use crate::common::Result;

type Step = Box<dyn FnMut(&mut FragmentContext<'_>) -> Result<()> + Send>;

/// One named step of a scenario
///
/// The step logic is an explicit callback; parameterised fragments capture
/// their inputs.
pub struct Fragment {
    name: String,
    step: Step,
}

impl Fragment {
    pub fn new<F>(name: impl Into<String>, step: F) -> Self
    where
        F: FnMut(&mut FragmentContext<'_>) -> Result<()> + Send + 'static,
    {
        Self {
            name: name.into(),
            step: Box::new(step),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the step against an attached session
    pub fn execute(&mut self, session: &mut Session) -> Result<()> {
        let mut ctx = session.context(&self.name);
        (self.step)(&mut ctx)
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment").field("name", &self.name).finish()
    }
}
