use bytes::Bytes;
use http::Response;

use crate::error::Error;

// ============================================================================
// Classify Trait
// ============================================================================

/// Per-attempt verdict on a transport outcome.
///
/// Exactly one of a response or an error is present, encoded as
/// `Result<&Response<Bytes>, &Error>`. Returning `Ok(())` accepts the
/// attempt and ends the call with that response. Returning a retryable
/// error asks the retry loop for another attempt, budget permitting.
/// Returning a non-retryable error, e.g. [`Error::fatal`], stops the loop
/// immediately.
///
/// The executor itself carries no status-code logic; swapping the
/// classifier fully re-defines what counts as success.
pub trait Classify: Send + Sync {
    fn classify(&self, outcome: Result<&Response<Bytes>, &Error>) -> Result<(), Error>;
}

// ============================================================================
// Default Classifier
// ============================================================================

/// Default classifier: accepts any status in `200..=299`.
///
/// Transport errors pass through unchanged and stay retryable; every other
/// status is rejected with [`Error::UnacceptableStatus`], also retryable.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptSuccess;

impl Classify for AcceptSuccess {
    fn classify(&self, outcome: Result<&Response<Bytes>, &Error>) -> Result<(), Error> {
        match outcome {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(Error::UnacceptableStatus(response.status())),
            Err(error) => Err(error.clone()),
        }
    }
}

// ============================================================================
// Closure Classifier
// ============================================================================

/// Wraps a closure as a [`Classify`] implementation.
///
/// # Example
///
/// ```
/// use retryable_http::{Classifier, Error};
///
/// // Retry server errors, treat any other rejection as terminal.
/// let classifier = Classifier::new(|outcome| match outcome {
///     Ok(response) if response.status().is_success() => Ok(()),
///     Ok(response) if response.status().is_server_error() => {
///         Err(Error::UnacceptableStatus(response.status()))
///     }
///     Ok(response) => Err(Error::fatal(format!("status {}", response.status()))),
///     Err(error) => Err(error.clone()),
/// });
/// # let _ = classifier;
/// ```
pub struct Classifier<F> {
    classify: F,
}

impl<F> Classifier<F>
where
    F: Fn(Result<&Response<Bytes>, &Error>) -> Result<(), Error> + Send + Sync,
{
    pub fn new(classify: F) -> Self {
        Self { classify }
    }
}

impl<F> Classify for Classifier<F>
where
    F: Fn(Result<&Response<Bytes>, &Error>) -> Result<(), Error> + Send + Sync,
{
    fn classify(&self, outcome: Result<&Response<Bytes>, &Error>) -> Result<(), Error> {
        (self.classify)(outcome)
    }
}

impl<F: Clone> Clone for Classifier<F> {
    fn clone(&self) -> Self {
        Self {
            classify: self.classify.clone(),
        }
    }
}

impl<F> std::fmt::Debug for Classifier<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn response(status: u16) -> Response<Bytes> {
        Response::builder()
            .status(status)
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_accept_success_accepts_2xx() {
        let classifier = AcceptSuccess;
        assert!(classifier.classify(Ok(&response(200))).is_ok());
        assert!(classifier.classify(Ok(&response(204))).is_ok());
        assert!(classifier.classify(Ok(&response(299))).is_ok());
    }

    #[test]
    fn test_accept_success_rejects_other_statuses() {
        let classifier = AcceptSuccess;
        for status in [301, 404, 500, 503] {
            let verdict = classifier.classify(Ok(&response(status))).unwrap_err();
            match verdict {
                Error::UnacceptableStatus(code) => {
                    assert_eq!(code.as_u16(), status);
                    assert!(verdict.is_retryable());
                }
                other => panic!("expected UnacceptableStatus, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_accept_success_passes_errors_through() {
        let classifier = AcceptSuccess;
        let error = Error::transport("connection reset");
        let verdict = classifier.classify(Err(&error)).unwrap_err();
        assert!(matches!(verdict, Error::Transport(_)));
        assert!(verdict.is_retryable());
    }

    #[test]
    fn test_closure_classifier_can_be_fatal() {
        let classifier = Classifier::new(|outcome| match outcome {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) if response.status().is_server_error() => {
                Err(Error::UnacceptableStatus(response.status()))
            }
            Ok(response) => Err(Error::fatal(format!("status {}", response.status()))),
            Err(error) => Err(error.clone()),
        });

        assert!(classifier.classify(Ok(&response(200))).is_ok());

        let transient = classifier.classify(Ok(&response(503))).unwrap_err();
        assert!(transient.is_retryable());
        assert!(matches!(
            transient,
            Error::UnacceptableStatus(StatusCode::SERVICE_UNAVAILABLE)
        ));

        let terminal = classifier.classify(Ok(&response(404))).unwrap_err();
        assert!(!terminal.is_retryable());
        assert!(matches!(terminal, Error::Fatal(_)));
    }

    #[test]
    fn test_closure_classifier_can_accept_any_status() {
        let classifier = Classifier::new(|_outcome| Ok(()));
        assert!(classifier.classify(Ok(&response(500))).is_ok());
        assert!(classifier.classify(Err(&Error::Cancelled)).is_ok());
    }
}
