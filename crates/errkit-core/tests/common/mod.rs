//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

/// Minimal downstream client that fails a fixed number of times before
/// answering.
pub struct FlakyBackend {
    failures_left: AtomicU32,
    calls: AtomicU32,
    pub code: tonic::Code,
}

impl FlakyBackend {
    pub fn new(failures: u32, code: tonic::Code) -> Self {
        Self {
            failures_left: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
            code,
        }
    }

    pub async fn fetch(&self, key: &str) -> Result<String, tonic::Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(tonic::Status::new(self.code, format!("{} unreachable", key)));
        }
        Ok(format!("value-of-{}", key))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}
