//! Retry state machine
//!
//! Drives the attempt × candidate loop without doing any I/O itself:
//!
//! ```text
//! attempt 1: Send(url 0) ─> Send(url 1) ─> ... ─> Backoff(delay(1))
//! attempt 2: Send(url 0) ─> Send(url 1) ─> ... ─> Backoff(delay(2))
//! ...
//! attempt N: Send(url 0) ─> Send(url 1) ─> ... ─> Exhausted
//! ```
//!
//! The caller performs each step, reporting failures back with
//! [`RetrySchedule::record_failure`]. Success simply stops the loop.

use super::backoff::BackoffPolicy;
use std::time::Duration;

/// Next thing the transport should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryStep {
    /// Send to candidate `url_index` as part of 1-based `attempt`.
    Send { attempt: u32, url_index: usize },
    /// Every candidate failed in `after_attempt`; wait before the next one.
    Backoff { after_attempt: u32, delay: Duration },
    /// No attempts left.
    Exhausted {
        attempts: u32,
        sends: u32,
        last_error: String,
    },
}

/// Attempt/URL cursor plus the most recent failure.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    max_attempts: u32,
    candidates: usize,
    policy: BackoffPolicy,
    attempt: u32,
    url_index: usize,
    sends: u32,
    last_error: Option<String>,
}

impl RetrySchedule {
    pub fn new(max_attempts: u32, candidates: usize, policy: BackoffPolicy) -> Self {
        Self {
            max_attempts,
            candidates,
            policy,
            attempt: 1,
            url_index: 0,
            sends: 0,
            last_error: None,
        }
    }

    /// Advance the cursor and return the step to perform.
    pub fn next_step(&mut self) -> RetryStep {
        if self.candidates == 0 || self.attempt > self.max_attempts {
            return self.exhausted();
        }

        if self.url_index < self.candidates {
            let step = RetryStep::Send {
                attempt: self.attempt,
                url_index: self.url_index,
            };
            self.url_index += 1;
            self.sends += 1;
            return step;
        }

        let finished = self.attempt;
        self.attempt += 1;
        self.url_index = 0;

        if finished < self.max_attempts {
            RetryStep::Backoff {
                after_attempt: finished,
                delay: self.policy.delay(finished),
            }
        } else {
            self.exhausted()
        }
    }

    /// Remember why the last send failed.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    pub fn sends(&self) -> u32 {
        self.sends
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn exhausted(&self) -> RetryStep {
        let last_error = match (&self.last_error, self.candidates) {
            (Some(error), _) => error.clone(),
            (None, 0) => "no candidate URLs to send to".to_string(),
            (None, _) => "no attempts were made".to_string(),
        };
        RetryStep::Exhausted {
            attempts: self.max_attempts,
            sends: self.sends,
            last_error,
        }
    }
}
