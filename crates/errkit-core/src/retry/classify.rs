//! Classify an operation error as fatal or retryable.

use crate::chain::{find_as, BoxError, SharedError};

use super::error::FatalError;

/// Outcome of inspecting a failed attempt.
#[derive(Debug)]
pub enum Failure {
    /// A [`FatalError`] sits somewhere in the chain; carries its original error.
    Fatal(SharedError),
    /// Anything else.
    Retryable(BoxError),
}

/// Looks for a [`FatalError`] anywhere in the chain of `err`; every other
/// error is retryable.
pub fn classify(err: BoxError) -> Failure {
    match find_as::<FatalError>(Some(&*err)) {
        Some(fatal) => Failure::Fatal(fatal.shared_original()),
        None => Failure::Retryable(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::wrap;
    use crate::retry::RetryableError;

    #[test]
    fn plain_error_is_retryable() {
        assert!(matches!(classify("timeout".into()), Failure::Retryable(_)));
    }

    #[test]
    fn retryable_marker_is_retryable() {
        let err: BoxError = Box::new(RetryableError::new("reset"));
        assert!(matches!(classify(err), Failure::Retryable(_)));
    }

    #[test]
    fn fatal_marker_yields_original() {
        let err: BoxError = Box::new(FatalError::new("denied"));
        match classify(err) {
            Failure::Fatal(original) => assert_eq!(original.to_string(), "denied"),
            other => panic!("expected fatal, got {:?}", other),
        }
    }

    #[test]
    fn wrapped_fatal_marker_is_found() {
        let err = wrap(FatalError::new("denied"), "calling auth");
        match classify(err) {
            Failure::Fatal(original) => assert_eq!(original.to_string(), "denied"),
            other => panic!("expected fatal, got {:?}", other),
        }
    }
}
