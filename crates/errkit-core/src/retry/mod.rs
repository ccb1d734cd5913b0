//! Retry with capped Fibonacci backoff.
//!
//! An operation is re-run until it succeeds, returns an error marked with
//! [`FatalError`], runs out of attempts, or the caller cancels. Any other
//! error is considered transient. The engine does not log failures; callers
//! decide what to report.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, Failure};
pub use error::{FatalError, MarkExt, RetryError, RetryableError};
pub use policy::{
    Backoff, BackoffPolicy, RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY,
    DEFAULT_MAX_RETRIES,
};
pub use run::{retry, retry_context, retry_with_policy};
