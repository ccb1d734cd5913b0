pub mod config;
pub mod logging;

pub mod chain;
pub mod context;
pub mod response;
pub mod retry;
pub mod shutdown;

pub use chain::{BoxError, DynError, SharedError};
