// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared retry wrapper (spec.md §4.4, §9): the backoff formula is part of
//! the contract and must not be "improved" without updating every
//! consumer's deadline math.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// The i-th attempt (1-indexed) sleeps `min(i² + uniform[0,i), 300)`
/// seconds before the next attempt.
fn backoff_seconds(attempt: u32) -> u64 {
    let i = u64::from(attempt);
    let jitter = if i == 0 { 0 } else { rand::thread_rng().gen_range(0..i) };
    (i * i + jitter).min(300)
}

/// Retry `op` until it succeeds, `is_transient` says an error is permanent,
/// or cumulative sleep exceeds `deadline` (whichever comes first). The last
/// error is surfaced on give-up.
pub async fn retry<F, Fut, T, E>(deadline: Duration, description: &str, is_transient: impl Fn(&E) -> bool, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 0;
    let mut slept = Duration::ZERO;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_transient(&err) => {
                tracing::warn!(description, attempt, %err, "non-transient error, not retrying");
                return Err(err);
            }
            Err(err) => {
                let wait = Duration::from_secs(backoff_seconds(attempt));
                if slept + wait > deadline {
                    tracing::error!(description, attempt, %err, "retry deadline exceeded, giving up");
                    return Err(err);
                }
                tracing::warn!(description, attempt, wait_secs = wait.as_secs(), %err, "retrying after transient error");
                tokio::time::sleep(wait).await;
                slept += wait;
            }
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::backoff_seconds;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn backoff_never_exceeds_the_three_hundred_second_cap(attempt in 1u32..10_000) {
            prop_assert!(backoff_seconds(attempt) <= 300);
        }

        #[test]
        fn backoff_is_at_least_the_square_of_the_attempt_before_capping(attempt in 1u32..16) {
            let i = u64::from(attempt);
            prop_assert!(backoff_seconds(attempt) >= i * i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn succeeds_immediately_without_sleeping() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry(Duration::from_secs(10), "test", |_| true, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry(Duration::from_secs(60), "test", |_| true, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 { Err("transient") } else { Ok(7) }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry(Duration::from_secs(60), "test", |_| false, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("permanent")
        })
        .await;
        assert_eq!(result.unwrap_err(), "permanent");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_once_deadline_is_exceeded() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry(Duration::from_secs(1), "test", |_| true, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("still failing")
        })
        .await;
        assert_eq!(result.unwrap_err(), "still failing");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
