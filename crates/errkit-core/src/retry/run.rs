//! Retry loop: run an operation until it succeeds, fails fatally, runs out of
//! attempts, or is cancelled.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::chain::{BoxError, SharedError};

use super::classify::{classify, Failure};
use super::error::RetryError;
use super::policy::{Backoff, BackoffPolicy, RetryPolicy};

/// Loop states. `Succeeded`, `FatallyFailed`, `ExhaustedRetries` and
/// `Cancelled` are terminal.
#[derive(Debug)]
enum State<T> {
    Idle,
    Attempting,
    Retrying(Duration),
    Succeeded(T),
    FatallyFailed(SharedError),
    ExhaustedRetries(BoxError),
    Cancelled,
}

/// Runs `operation` with the default backoff and a token that never fires.
pub async fn retry<T, E, F, Fut>(max_retries: u64, operation: F) -> Result<T, RetryError>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    retry_context(&CancellationToken::new(), max_retries, operation).await
}

/// Runs `operation` up to `max_retries + 1` times with the default backoff
/// (Fibonacci from 1s, capped at 5s).
///
/// The operation receives a clone of `cancel` so it can observe cancellation
/// itself.
pub async fn retry_context<T, E, F, Fut>(
    cancel: &CancellationToken,
    max_retries: u64,
    operation: F,
) -> Result<T, RetryError>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    let policy = RetryPolicy {
        max_retries,
        backoff: BackoffPolicy::default(),
    };
    retry_with_policy(cancel, &policy, operation).await
}

/// Runs `operation` under `policy`.
///
/// - `Ok` ends the loop with the value.
/// - An error with a [`FatalError`](super::FatalError) in its chain ends the
///   loop with the marker's original error, skipping any remaining attempts.
/// - Any other error waits out the next backoff step and tries again, or ends
///   the loop with that error once the steps run out.
/// - `cancel` is checked before every attempt and raced against every wait.
pub async fn retry_with_policy<T, E, F, Fut>(
    cancel: &CancellationToken,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryError>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    let mut schedule = policy.backoff.schedule(policy.max_retries);
    let mut attempt: u64 = 0;
    let mut state = State::Idle;

    loop {
        state = match state {
            State::Idle => State::Attempting,
            State::Attempting if cancel.is_cancelled() => State::Cancelled,
            State::Attempting => {
                attempt += 1;
                match operation(cancel.clone()).await {
                    Ok(value) => State::Succeeded(value),
                    Err(err) => after_failure(classify(err.into()), &mut schedule),
                }
            }
            State::Retrying(delay) => {
                tracing::trace!(attempt, ?delay, "attempt failed, backing off");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => State::Cancelled,
                    _ = tokio::time::sleep(delay) => State::Attempting,
                }
            }
            State::Succeeded(value) => return Ok(value),
            State::FatallyFailed(original) => {
                tracing::trace!(attempt, "attempt failed fatally");
                return Err(RetryError::Fatal(original));
            }
            State::ExhaustedRetries(last) => {
                tracing::trace!(attempt, "retries exhausted");
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last,
                });
            }
            State::Cancelled => {
                tracing::trace!(attempt, "retry cancelled");
                return Err(RetryError::Cancelled);
            }
        };
    }
}

fn after_failure<T>(failure: Failure, schedule: &mut Backoff) -> State<T> {
    match failure {
        Failure::Fatal(original) => State::FatallyFailed(original),
        Failure::Retryable(err) => match schedule.next() {
            Some(delay) => State::Retrying(delay),
            None => State::ExhaustedRetries(err),
        },
    }
}
