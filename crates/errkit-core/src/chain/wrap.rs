//! Context wrapping that keeps RPC status codes classifiable.

use std::error::Error;
use std::fmt;

use super::BoxError;

/// An error with a context message in front of its cause.
///
/// Renders as `message: cause`; [`Error::source`] is the cause.
#[derive(Debug)]
pub struct Wrapped {
    message: String,
    source: BoxError,
}

impl Wrapped {
    pub fn new(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.source)
    }
}

impl Error for Wrapped {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

/// Adds `message` as context in front of `err`.
///
/// A `tonic::Status` is not nested: the result is a new status with the same
/// code and details and the message prefixed, so the code is still visible at
/// the root of the chain.
pub fn wrap(err: impl Into<BoxError>, message: impl Into<String>) -> BoxError {
    let message = message.into();
    let err: BoxError = err.into();
    match err.downcast::<tonic::Status>() {
        Ok(status) => Box::new(tonic::Status::with_details(
            status.code(),
            format!("{}: {}", message, status.message()),
            bytes::Bytes::copy_from_slice(status.details()),
        )),
        Err(err) => Box::new(Wrapped::new(message, err)),
    }
}

/// Builds an RPC status error.
pub fn status(code: tonic::Code, message: impl Into<String>) -> BoxError {
    Box::new(tonic::Status::new(code, message))
}
