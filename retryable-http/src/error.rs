use http::StatusCode;

/// Errors surfaced by the retrying HTTP client.
///
/// Only the final outcome of a call crosses the API boundary: intermediate
/// attempt failures are visible solely as the wrapped source of
/// [`Error::Exhausted`].
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// Invalid retry configuration, rejected before any attempt runs.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request URL is malformed or not an absolute http/https URL.
    ///
    /// Detected before the first attempt; consumes no retry budget.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The cancellation signal fired before or between attempts.
    #[error("operation cancelled")]
    Cancelled,

    /// Transport-level failure (connection, TLS, malformed response, etc.)
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but its status was rejected by the classifier.
    #[error("unacceptable response status: {0}")]
    UnacceptableStatus(StatusCode),

    /// A classifier ruled the outcome terminal; the retry loop stops
    /// immediately regardless of remaining budget.
    #[error("fatal error: {0}")]
    Fatal(String),

    /// Every attempt in the budget failed; wraps the last attempt's error.
    #[error("retry budget exhausted after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns true if a retry may succeed where this attempt failed.
    ///
    /// Transport failures and rejected statuses are transient; everything
    /// else terminates the retry loop.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::UnacceptableStatus(_))
    }

    /// Create an invalid-configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// Create an invalid-URL error
    pub fn invalid_url<S: Into<String>>(message: S) -> Self {
        Error::InvalidUrl(message.into())
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Error::Transport(message.into())
    }

    /// Create a fatal (never retried) error
    pub fn fatal<S: Into<String>>(message: S) -> Self {
        Error::Fatal(message.into())
    }

    /// Wrap the last attempt's error once the budget is spent
    pub fn exhausted(attempts: u32, source: Error) -> Self {
        Error::Exhausted {
            attempts,
            source: Box::new(source),
        }
    }
}
