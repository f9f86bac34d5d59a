use serde::{Deserialize, Serialize};

/// Capped exponential backoff for socket reconnection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub base_delay_ms: u32,
    pub max_delay_ms: u32,
    /// Zero disables reconnection
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the zero-based `attempt`, or `None` once attempts are used up
    pub fn delay_for(&self, attempt: u32) -> Option<u32> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        Some(self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms))
    }
}

/// Attempt counter for one socket owner
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self { policy, attempts: 0 }
    }

    /// Consume one attempt and return its delay
    pub fn next_delay(&mut self) -> Option<u32> {
        let delay = self.policy.delay_for(self.attempts)?;
        self.attempts += 1;
        Some(delay)
    }

    /// Called after a successful open
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delays_double_and_cap() {
        let mut backoff = Backoff::new(ReconnectPolicy::default());
        let delays: Vec<u32> = std::iter::from_fn(|| backoff.next_delay()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10_000]);
        assert_eq!(backoff.attempts(), 5);
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut backoff = Backoff::new(ReconnectPolicy::default());
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay(), Some(1000));
    }

    #[test]
    fn test_disabled_policy_never_retries() {
        let mut backoff = Backoff::new(ReconnectPolicy {
            max_attempts: 0,
            ..ReconnectPolicy::default()
        });
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = ReconnectPolicy {
            base_delay_ms: 1000,
            max_delay_ms: 60_000,
            max_attempts: 100,
        };
        assert_eq!(policy.delay_for(40), Some(60_000));
    }
}
