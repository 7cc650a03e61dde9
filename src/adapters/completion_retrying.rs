//! Retry wrapper for completion client operations.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::domain::AppError;
use crate::domain::settings::ApiConfig;
use crate::ports::{CompletionClient, CompletionRequest};

const MAX_DELAY_MS: u64 = 30_000;
const RETRY_AFTER_TOKEN: &str = "retry_after_ms=";

/// Bounded exponential backoff with jitter, honoring server hints.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay_ms: config.retry_delay_ms.max(1),
        }
    }

    fn delay_for_retry(&self, failed_attempt: u32, error: &AppError) -> Duration {
        if let Some(hint_ms) = extract_retry_after_ms(error) {
            return Duration::from_millis(hint_ms.min(MAX_DELAY_MS));
        }

        // attempt=1 -> base, attempt=2 -> base*2, attempt=3 -> base*4, capped.
        let exponent = failed_attempt.saturating_sub(1).min(6);
        let multiplier = 1_u64 << exponent;
        let backoff_ms = self.base_delay_ms.saturating_mul(multiplier).min(MAX_DELAY_MS);
        Duration::from_millis(backoff_ms.saturating_add(jitter_ms(backoff_ms)).min(MAX_DELAY_MS))
    }
}

/// Wraps any completion client with the retry policy.
pub struct RetryingCompletionClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: CompletionClient> RetryingCompletionClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<C: CompletionClient> CompletionClient for RetryingCompletionClient<C> {
    fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        for attempt in 1..=self.policy.max_attempts {
            match self.inner.complete(request.clone()) {
                Ok(text) => return Ok(text),
                Err(error) => {
                    let last_attempt = attempt == self.policy.max_attempts;
                    if !is_retryable_error(&error) || last_attempt {
                        return Err(error);
                    }

                    let delay = self.policy.delay_for_retry(attempt, &error);
                    eprintln!(
                        "Completion request failed (attempt {}/{}): {}. Retrying in {} ms.",
                        attempt,
                        self.policy.max_attempts,
                        error,
                        delay.as_millis()
                    );
                    thread::sleep(delay);
                }
            }
        }

        Err(AppError::CompletionApi {
            message: "Completion request failed after retries".to_string(),
            status: None,
        })
    }
}

fn is_retryable_error(error: &AppError) -> bool {
    match error {
        AppError::CompletionApi { message, status } => {
            if status.is_some_and(|code| code == 429 || code == 408 || code >= 500) {
                return true;
            }

            let lower = message.to_ascii_lowercase();
            lower.contains("timeout")
                || lower.contains("timed out")
                || lower.contains("connect")
                || lower.contains("connection")
                || lower.contains("temporary")
        }
        _ => false,
    }
}

fn extract_retry_after_ms(error: &AppError) -> Option<u64> {
    let message = match error {
        AppError::CompletionApi { message, .. } => message,
        _ => return None,
    };

    let start = message.find(RETRY_AFTER_TOKEN)? + RETRY_AFTER_TOKEN.len();
    let digits: String =
        message[start..].chars().take_while(|ch| ch.is_ascii_digit()).collect();
    digits.parse::<u64>().ok()
}

fn jitter_ms(backoff_ms: u64) -> u64 {
    let jitter_cap = backoff_ms / 4;
    if jitter_cap == 0 {
        return 0;
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.subsec_nanos() as u64)
        .unwrap_or(0);

    nanos % jitter_cap
}
