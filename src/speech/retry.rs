//! Bounded retry with exponential backoff for network synthesizers

use super::{Synthesizer, Utterance};
use crate::{Result, TalkboardError};
use log::{error, warn};
use std::time::Duration;

/// Retry policy for synthesis calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt (doubles each attempt)
    pub base_delay: Duration,
    /// Maximum delay cap
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Delay after the failed attempt number `attempt` (0-based)
#[must_use]
pub fn delay_for_attempt(policy: &RetryPolicy, attempt: u32) -> Duration {
    policy
        .base_delay
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(policy.max_delay)
}

/// Synthesizer wrapper retrying failed calls
pub struct Retry<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: Synthesizer> Retry<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<S: Synthesizer> Synthesizer for Retry<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn synthesize(&mut self, text: &str) -> Result<Utterance> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            match self.inner.synthesize(text) {
                Ok(utterance) => return Ok(utterance),
                Err(e) => {
                    warn!(
                        "{} failed for '{}' (attempt {}/{}): {}",
                        self.inner.name(),
                        text,
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                    if attempt + 1 < attempts {
                        std::thread::sleep(delay_for_attempt(&self.policy, attempt));
                    }
                }
            }
        }

        error!(
            "Failed to synthesize '{}' after {} attempts",
            text, attempts
        );
        Err(TalkboardError::Synthesis(format!(
            "gave up after {} attempts: {}",
            attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}
