//! CLI command handlers, one file per command.

mod classify;
mod retry;

pub use classify::run_classify;
pub use retry::run_retry;
