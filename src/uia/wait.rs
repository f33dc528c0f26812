//! Polling waits and input timings

use std::time::{Duration, Instant};

use crate::common::{Error, Result};

/// Input timings applied to an application for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Pause after every click so the application can react
    pub after_click_wait: Duration,
    /// Interval between two checks of a polled condition
    pub poll_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            after_click_wait: Duration::from_millis(500),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl Timings {
    /// No pauses at all, for in-memory desktops
    pub fn instant() -> Self {
        Self {
            after_click_wait: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
        }
    }
}

/// Poll `condition` until it returns `Ok(true)` or `timeout` elapses
///
/// A condition that fails counts as "not yet"; its last error is carried in
/// the `WaitTimeout` error. The condition is always checked at least once,
/// and once more after the deadline passes.
pub fn wait_for_condition<F>(
    description: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut condition: F,
) -> Result<()>
where
    F: FnMut() -> Result<bool>,
{
    let deadline = Instant::now() + timeout;
    let mut last_error = None;

    loop {
        let timed_out = Instant::now() >= deadline;

        match condition() {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => {
                tracing::trace!(error = %e, "condition not met yet");
                last_error = Some(e.to_string());
            }
        }

        if timed_out {
            return Err(Error::WaitTimeout {
                timeout_ms: timeout.as_millis() as u64,
                description: description.to_string(),
                last_error,
            });
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        std::thread::sleep(poll_interval.min(remaining).max(Duration::from_millis(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_once_condition_holds() {
        let mut calls = 0;
        wait_for_condition("third call", Duration::from_secs(5), Duration::from_millis(1), || {
            calls += 1;
            Ok(calls >= 3)
        })
        .unwrap();
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_times_out_with_last_error() {
        let err = wait_for_condition(
            "never",
            Duration::from_millis(20),
            Duration::from_millis(5),
            || Err(Error::WindowNotFound("main".to_string())),
        )
        .unwrap_err();

        match err {
            Error::WaitTimeout {
                timeout_ms,
                last_error,
                ..
            } => {
                assert_eq!(timeout_ms, 20);
                assert_eq!(last_error.as_deref(), Some("Could not find window 'main'"));
            }
            other => panic!("expected WaitTimeout, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_timeout_checks_once() {
        let mut calls = 0;
        let result = wait_for_condition("zero", Duration::ZERO, Duration::from_millis(1), || {
            calls += 1;
            Ok(false)
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
