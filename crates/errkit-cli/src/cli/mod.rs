//! CLI for errkit.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use errkit_core::config::ErrkitConfig;

use commands::{run_classify, run_retry};

/// Top-level CLI for errkit.
#[derive(Debug, Parser)]
#[command(name = "errkit")]
#[command(about = "errkit: retry with backoff and error classification", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a command, retrying failures with capped Fibonacci backoff.
    Retry {
        /// Attempts after the first one (defaults to `[retry] max_retries` from config).
        #[arg(long, value_name = "N")]
        max_retries: Option<u64>,

        /// Exit code that marks a failure as permanent; may be repeated.
        #[arg(long = "fatal-exit-code", value_name = "CODE")]
        fatal_exit_codes: Vec<i32>,

        /// Program and arguments, after `--`.
        #[arg(last = true, required = true, value_name = "COMMAND")]
        command: Vec<String>,
    },

    /// Show how an RPC status would be turned into a client response.
    Classify {
        /// gRPC code name (e.g. `not_found`, `Unavailable`) or number.
        #[arg(long)]
        code: String,

        /// Status message.
        #[arg(long)]
        message: String,

        /// Context message to wrap the status in.
        #[arg(long)]
        wrap: Option<String>,
    },
}

impl CliCommand {
    /// Parses arguments and runs the command; returns the process exit code.
    pub async fn run_from_args(cfg: &ErrkitConfig) -> Result<i32> {
        let cli = Cli::parse();
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Retry {
                max_retries,
                fatal_exit_codes,
                command,
            } => {
                let mut policy = cfg.retry.to_policy()?;
                if let Some(max_retries) = max_retries {
                    policy.max_retries = max_retries;
                }
                run_retry(&policy, &fatal_exit_codes, &command).await
            }
            CliCommand::Classify {
                code,
                message,
                wrap,
            } => {
                run_classify(&code, &message, wrap.as_deref())?;
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
