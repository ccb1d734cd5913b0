//! `errkit retry` – run a command until it succeeds, with backoff between attempts.

use anyhow::{bail, Result};
use errkit_core::chain::{find_as, BoxError};
use errkit_core::retry::{retry_with_policy, FatalError, RetryError, RetryPolicy};
use errkit_core::shutdown::ShutdownFlag;
use std::fmt;
use std::process::ExitStatus;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Exit code used when the run was interrupted (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// The child ran and exited unsuccessfully.
#[derive(Debug)]
pub struct ChildFailed {
    program: String,
    status: ExitStatus,
}

impl ChildFailed {
    /// Exit code to report for this failure; signals count as 1.
    pub fn exit_code(&self) -> i32 {
        self.status.code().unwrap_or(1)
    }
}

impl fmt::Display for ChildFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` exited with {}", self.program, self.status)
    }
}

impl std::error::Error for ChildFailed {}

/// The attempt was cut short by shutdown.
#[derive(Debug)]
struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interrupted")
    }
}

impl std::error::Error for Interrupted {}

/// Runs `command` under `policy`. Ctrl-C stops the current child and any
/// further attempts. Returns the exit code the CLI should exit with.
pub async fn run_retry(
    policy: &RetryPolicy,
    fatal_exit_codes: &[i32],
    command: &[String],
) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        bail!("no command given");
    };

    let shutdown = ShutdownFlag::new();
    let on_signal = shutdown.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.trigger();
        }
    });

    tracing::info!(
        program = %program,
        max_retries = policy.max_retries,
        "running command with retries"
    );
    let outcome = retry_with_policy(&shutdown.token(), policy, |cancel| {
        attempt(program, args, fatal_exit_codes, cancel)
    })
    .await;
    signal_task.abort();

    let code = exit_code(&outcome, shutdown.is_shutting_down());
    match &outcome {
        Ok(()) => tracing::info!(program = %program, "command succeeded"),
        Err(err) => {
            tracing::warn!(program = %program, code, "command failed: {}", err);
            eprintln!("errkit: {}", err);
        }
    }
    Ok(code)
}

async fn attempt(
    program: &str,
    args: &[String],
    fatal_exit_codes: &[i32],
    cancel: CancellationToken,
) -> Result<(), BoxError> {
    let mut child = match Command::new(program).args(args).kill_on_drop(true).spawn() {
        Ok(child) => child,
        // Retrying will not make a missing binary appear.
        Err(err) => return Err(Box::new(FatalError::new(err))),
    };

    let status = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Box::new(Interrupted)),
        status = child.wait() => status?,
    };

    if status.success() {
        return Ok(());
    }

    let failed = ChildFailed {
        program: program.to_string(),
        status,
    };
    tracing::debug!("attempt failed: {}", failed);
    if fatal_exit_codes.contains(&failed.exit_code()) {
        return Err(Box::new(FatalError::new(failed)));
    }
    Err(Box::new(failed))
}

/// 0 on success, 130 after Ctrl-C, the child's exit code when it ran,
/// otherwise 1.
pub fn exit_code(outcome: &Result<(), RetryError>, interrupted: bool) -> i32 {
    match outcome {
        Ok(()) => 0,
        Err(_) if interrupted => INTERRUPTED_EXIT_CODE,
        Err(RetryError::Cancelled) => INTERRUPTED_EXIT_CODE,
        Err(err) => find_as::<ChildFailed>(std::error::Error::source(err))
            .map(ChildFailed::exit_code)
            .unwrap_or(1),
    }
}
