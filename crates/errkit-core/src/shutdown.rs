//! Process-wide shutdown flag.
//!
//! A signal handler (or anything else) triggers it once; request handlers ask
//! whether the service is going down, and retry loops observe the token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
    token: CancellationToken,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sets the flag and cancels the token. Returns true only for the call
    /// that actually flipped it.
    pub fn trigger(&self) -> bool {
        if self.flag.swap(true, Ordering::SeqCst) {
            return false;
        }
        tracing::info!("shutdown requested");
        self.token.cancel();
        true
    }

    /// Token cancelled on trigger; clones share the same state.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}
