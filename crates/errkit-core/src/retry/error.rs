//! Retry markers and the engine's own error type.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::chain::{BoxError, SharedError};

/// Marks an error as permanent: the retry engine stops immediately and
/// returns the original error.
///
/// Renders exactly like the original.
#[derive(Debug, Clone)]
pub struct FatalError {
    original: SharedError,
}

impl FatalError {
    pub fn new(original: impl Into<BoxError>) -> Self {
        Self {
            original: Arc::from(original.into()),
        }
    }

    pub fn original(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.original
    }

    pub(crate) fn shared_original(&self) -> SharedError {
        Arc::clone(&self.original)
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl Error for FatalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.original)
    }
}

/// Marks an error as transient. Unmarked errors are already retried; the
/// marker makes the intent explicit at the call site.
#[derive(Debug, Clone)]
pub struct RetryableError {
    original: SharedError,
}

impl RetryableError {
    pub fn new(original: impl Into<BoxError>) -> Self {
        Self {
            original: Arc::from(original.into()),
        }
    }

    pub fn original(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.original
    }
}

impl fmt::Display for RetryableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (retryable)", self.original)
    }
}

impl Error for RetryableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.original)
    }
}

/// Marks the error side of a `Result` from inside a retried operation.
///
/// ```ignore
/// let meta = fetch(&url).await.fatal()?;
/// ```
pub trait MarkExt<T> {
    /// Never retry this error.
    fn fatal(self) -> Result<T, FatalError>;

    /// Retry this error.
    fn retryable(self) -> Result<T, RetryableError>;
}

impl<T, E> MarkExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn fatal(self) -> Result<T, FatalError> {
        self.map_err(FatalError::new)
    }

    fn retryable(self) -> Result<T, RetryableError> {
        self.map_err(RetryableError::new)
    }
}

/// Why a retried operation did not produce a value.
///
/// `Fatal` and `Exhausted` render as the error they carry, which is also
/// their [`Error::source`].
#[derive(Debug)]
pub enum RetryError {
    /// The cancellation token fired before an attempt or during a backoff wait.
    Cancelled,
    /// The operation returned a [`FatalError`]; this is its original error.
    Fatal(SharedError),
    /// Every attempt failed; `last` is the error of the final attempt.
    Exhausted { attempts: u64, last: BoxError },
}

impl RetryError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RetryError::Fatal(_))
    }

    /// The operation's error, if any attempt produced one that ended the loop.
    pub fn operation_error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            RetryError::Cancelled => None,
            RetryError::Fatal(original) => Some(&**original),
            RetryError::Exhausted { last, .. } => Some(&**last),
        }
    }
}

impl fmt::Display for RetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Cancelled => write!(f, "retry cancelled"),
            RetryError::Fatal(original) => write!(f, "{}", original),
            RetryError::Exhausted { last, .. } => write!(f, "{}", last),
        }
    }
}

impl Error for RetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.operation_error()
            .map(|err| err as &(dyn Error + 'static))
    }
}
