//! Bounded retry with exponential backoff for request construction and transport.
//!
//! This module provides the [`RetryPolicy`] and [`FailureType`] types used by
//! the retriever to decide whether a failed attempt is worth repeating.
//!
//! # Overview
//!
//! Only two stages of a retrieval are retried: building the request and
//! sending it. Their failures classify as [`FailureType::Transient`]. Body
//! read and parse failures are [`FailureType::Permanent`]; a non-success HTTP
//! status never reaches the policy at all.
//!
//! The policy is bounded twice: by a maximum number of attempts and by a
//! wall-clock budget measured from the first attempt. Whichever runs out
//! first ends the retry loop, and the retriever reports `E_REQ`.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use handlefetch::fetch::{FailureType, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! match policy.should_retry(FailureType::Transient, 1, Duration::ZERO) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use super::FetchError;

/// Default maximum attempts (including the initial attempt).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default wall-clock retry budget (15 minutes).
pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(15 * 60);

/// Default base delay for exponential backoff (500 milliseconds).
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Default maximum delay cap (60 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default backoff multiplier.
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;

/// Fraction of the computed delay added as random jitter.
const JITTER_FACTOR: f64 = 0.5;

/// Classification of retrieval failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: connection refused, timeout, protocol error, builder failure.
    Transient,

    /// Failure that is reported as-is without retry.
    ///
    /// Examples: truncated body, malformed JSON.
    Permanent,
}

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for bounded retry with exponential backoff.
///
/// # Default Values
///
/// - `max_attempts`: 10
/// - `max_elapsed`: 15 minutes
/// - `base_delay`: 500 milliseconds
/// - `max_delay`: 60 seconds
/// - `backoff_multiplier`: 1.5
///
/// # Delay Calculation
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt - 1), max_delay)
/// delay = delay + random(0..=delay * 0.5)
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Wall-clock budget across all attempts and sleeps.
    max_elapsed: Duration,

    /// Base delay for the first retry.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied each attempt.
    backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_elapsed: DEFAULT_MAX_ELAPSED,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom backoff settings and the default
    /// wall-clock budget.
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum attempts including initial (clamped to >= 1)
    /// * `base_delay` - Base delay for first retry
    /// * `max_delay` - Maximum delay cap
    /// * `backoff_multiplier` - Multiplier for exponential increase
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            max_elapsed: DEFAULT_MAX_ELAPSED,
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Replaces the wall-clock retry budget.
    #[must_use]
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the wall-clock retry budget.
    #[must_use]
    pub fn max_elapsed(&self) -> Duration {
        self.max_elapsed
    }

    /// Determines whether to retry a failed attempt.
    ///
    /// # Arguments
    ///
    /// * `failure_type` - Classification of the failure
    /// * `attempt` - The attempt number that just failed (1-indexed)
    /// * `elapsed` - Time spent since the first attempt started
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(
        &self,
        failure_type: FailureType,
        attempt: u32,
        elapsed: Duration,
    ) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);

        // Sleeping past the budget would only delay the inevitable E_REQ.
        if elapsed.saturating_add(delay) > self.max_elapsed {
            debug!(
                attempt,
                elapsed_ms = elapsed.as_millis(),
                budget_ms = self.max_elapsed.as_millis(),
                "retry budget reached"
            );
            return RetryDecision::DoNotRetry {
                reason: format!("retry budget ({:?}) exhausted", self.max_elapsed),
            };
        }

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Calculates the delay for a retry attempt with exponential backoff and jitter.
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base = self.backoff_delay(attempt);
        base + Self::calculate_jitter(base)
    }

    /// Exponential part of the delay, capped at `max_delay`.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_secs = self.base_delay.as_secs_f64();
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_secs = base_secs * self.backoff_multiplier.powf(exponent);

        if delay_secs.is_finite() && delay_secs < self.max_delay.as_secs_f64() {
            Duration::from_secs_f64(delay_secs)
        } else {
            self.max_delay
        }
    }

    /// Generates random jitter between 0 and `JITTER_FACTOR * base`.
    ///
    /// Spreads out retries from workers that failed against the same
    /// endpoint at the same moment.
    fn calculate_jitter(base: Duration) -> Duration {
        let span = base.mul_f64(JITTER_FACTOR);
        let span_ms = u64::try_from(span.as_millis()).unwrap_or(u64::MAX);
        if span_ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::thread_rng();
        Duration::from_millis(rng.gen_range(0..=span_ms))
    }
}

/// Classifies a fetch error into a failure type for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Build | Transient |
/// | Unclonable | Permanent |
/// | Network | Transient |
/// | Timeout | Transient |
/// | Body | Permanent |
/// | Json | Permanent |
#[must_use]
pub fn classify_error(error: &FetchError) -> FailureType {
    match error {
        FetchError::Build { .. } | FetchError::Network { .. } | FetchError::Timeout { .. } => {
            FailureType::Transient
        }
        FetchError::Unclonable { .. } | FetchError::Body { .. } | FetchError::Json { .. } => {
            FailureType::Permanent
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== RetryPolicy Tests ====================

    #[test]
    fn test_retry_policy_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.max_elapsed, Duration::from_secs(900));
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(60));
        assert!((policy.backoff_multiplier - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_retry_policy_max_attempts_minimum_is_one() {
        let policy = RetryPolicy::with_max_attempts(0);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_retry_policy_with_max_elapsed() {
        let policy = RetryPolicy::with_max_attempts(4).with_max_elapsed(Duration::from_secs(3));
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.max_elapsed(), Duration::from_secs(3));
    }

    // ==================== Delay Calculation Tests ====================

    #[test]
    fn test_delay_first_attempt_is_base_plus_jitter() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(60), 2.0);
        let delay = policy.calculate_delay(1);
        assert!(delay >= Duration::from_secs(1));
        assert!(delay <= Duration::from_millis(1500));
    }

    #[test]
    fn test_delay_grows_exponentially() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(60), 2.0);
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_respects_max_delay() {
        let policy = RetryPolicy::new(50, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        assert_eq!(policy.backoff_delay(6), Duration::from_secs(5));
        assert_eq!(policy.backoff_delay(40), Duration::from_secs(5));
        let delay = policy.calculate_delay(6);
        assert!(delay <= Duration::from_millis(7500));
    }

    #[test]
    fn test_jitter_within_bounds() {
        for _ in 0..100 {
            let jitter = RetryPolicy::calculate_jitter(Duration::from_millis(200));
            assert!(jitter <= Duration::from_millis(100));
        }
    }

    #[test]
    fn test_jitter_zero_for_zero_delay() {
        assert_eq!(RetryPolicy::calculate_jitter(Duration::ZERO), Duration::ZERO);
    }

    // ==================== Should Retry Decision Tests ====================

    #[test]
    fn test_should_retry_permanent_does_not_retry() {
        let policy = RetryPolicy::default();
        let decision = policy.should_retry(FailureType::Permanent, 1, Duration::ZERO);
        match decision {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("permanent")),
            RetryDecision::Retry { .. } => panic!("permanent failures must not retry"),
        }
    }

    #[test]
    fn test_should_retry_transient_retries() {
        let policy = RetryPolicy::default();
        let decision = policy.should_retry(FailureType::Transient, 1, Duration::ZERO);
        assert!(matches!(decision, RetryDecision::Retry { attempt: 2, .. }));
    }

    #[test]
    fn test_should_retry_respects_max_attempts() {
        let policy = RetryPolicy::with_max_attempts(3);

        let decision = policy.should_retry(FailureType::Transient, 2, Duration::ZERO);
        assert!(matches!(decision, RetryDecision::Retry { .. }));

        let decision = policy.should_retry(FailureType::Transient, 3, Duration::ZERO);
        match decision {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("exhausted")),
            RetryDecision::Retry { .. } => panic!("expected exhaustion at max attempts"),
        }
    }

    #[test]
    fn test_should_retry_respects_elapsed_budget() {
        let policy = RetryPolicy::new(100, Duration::from_millis(100), Duration::from_secs(1), 2.0)
            .with_max_elapsed(Duration::from_secs(2));

        let decision = policy.should_retry(FailureType::Transient, 1, Duration::from_millis(500));
        assert!(matches!(decision, RetryDecision::Retry { .. }));

        let decision = policy.should_retry(FailureType::Transient, 1, Duration::from_secs(2));
        match decision {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("budget")),
            RetryDecision::Retry { .. } => panic!("expected budget exhaustion"),
        }
    }

    #[test]
    fn test_should_retry_single_attempt_policy_never_retries() {
        let policy = RetryPolicy::with_max_attempts(1);
        let decision = policy.should_retry(FailureType::Transient, 1, Duration::ZERO);
        assert!(matches!(decision, RetryDecision::DoNotRetry { .. }));
    }

    // ==================== Error Classification Tests ====================

    #[test]
    fn test_classify_timeout_transient() {
        let error = FetchError::Timeout {
            url: "http://example.com".to_string(),
        };
        assert_eq!(classify_error(&error), FailureType::Transient);
    }

    #[test]
    fn test_classify_json_permanent() {
        let source = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let error = FetchError::json("http://example.com", source);
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }

    #[test]
    fn test_classify_unclonable_permanent() {
        let error = FetchError::unclonable("http://example.com");
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }
}
