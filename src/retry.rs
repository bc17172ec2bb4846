use crate::error::{CommandError, UploadError};
use crate::warning;
use std::time::Duration;

/// how often, and how patiently, a failing git command is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one attempt
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// run once, never retry
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// run `op` until it succeeds or `policy.max_attempts` is exhausted
///
/// `sleep` is called with `policy.delay` between attempts, never after the
/// last one. the final failure is wrapped with the command description.
pub fn run_with_retry<T>(
    policy: RetryPolicy,
    command: &str,
    sleep: &dyn Fn(Duration),
    mut op: impl FnMut() -> Result<T, CommandError>,
) -> Result<T, UploadError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(source) if attempt >= max_attempts => {
                return Err(UploadError::CommandExecution {
                    command: command.to_string(),
                    attempts: attempt,
                    source,
                });
            }
            Err(e) => {
                warning!(
                    "{} failed (attempt {}/{}): {}",
                    command,
                    attempt,
                    max_attempts,
                    e
                );
                warning!("retrying in {}s...", policy.delay.as_secs());
                sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}
