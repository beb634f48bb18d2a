use std::time::Duration;

/// Bounded retry with a fixed backoff between attempts.
///
/// Used by the scraper when the aggregator answers with its rate-limit
/// sentinel: wait `backoff`, ask again, at most `max_retries` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Start tracking retries for one operation.
    pub fn budget(&self) -> RetryBudget {
        RetryBudget {
            policy: *self,
            used: 0,
        }
    }
}

/// Retries consumed so far by one operation under a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryBudget {
    policy: RetryPolicy,
    used: u32,
}

impl RetryBudget {
    pub fn remaining(&self) -> u32 {
        self.policy.max_retries.saturating_sub(self.used)
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    /// Consume one retry, sleeping for the backoff first.
    ///
    /// Returns `false` without sleeping once the budget is exhausted.
    pub async fn wait(&mut self) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.used += 1;
        if !self.policy.backoff.is_zero() {
            tokio::time::sleep(self.policy.backoff).await;
        }
        true
    }
}
