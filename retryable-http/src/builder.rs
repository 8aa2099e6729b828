use std::time::Duration;

use crate::client::RetryClient;
use crate::config::{AcceptSuccess, BackoffPolicy, CancelSignal, Classify, Strategy};
use crate::error::Error;
use crate::transport::HyperTransport;

/// Fluent builder for [`RetryClient`].
///
/// Starts from [`BackoffPolicy::default`] (10 attempts, 1s linear backoff),
/// the 2xx-only [`AcceptSuccess`] classifier and no cancellation. When no
/// transport is supplied, [`build`](Self::build) constructs a fresh
/// [`HyperTransport`] with default pool settings.
///
/// # Example
///
/// ```ignore
/// use retryable_http::{RetryClient, Strategy};
/// use std::time::Duration;
///
/// let client = RetryClient::builder()
///     .attempts(3)
///     .base_delay(Duration::from_millis(100))
///     .strategy(Strategy::Exponential)
///     .build()?;
/// ```
#[derive(Debug)]
pub struct ClientBuilder<C = AcceptSuccess> {
    transport: Option<HyperTransport>,
    backoff: BackoffPolicy,
    classifier: C,
    cancel: CancelSignal,
}

impl ClientBuilder {
    /// New builder with the default policy, classifier and transport.
    pub fn new() -> Self {
        Self {
            transport: None,
            backoff: BackoffPolicy::default(),
            classifier: AcceptSuccess,
            cancel: CancelSignal::never(),
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ClientBuilder<C> {
    /// Maximum number of attempts, counting the first try.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.backoff = self.backoff.attempts(attempts);
        self
    }

    /// Base delay the strategy scales from.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.backoff = self.backoff.base_delay(delay);
        self
    }

    /// How the delay grows across attempts.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.backoff = self.backoff.strategy(strategy);
        self
    }

    /// Replace the whole backoff policy at once.
    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    /// Cancel signal consulted before every attempt and during delays.
    pub fn cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Use a preconfigured hyper transport instead of the default one.
    pub fn transport(mut self, transport: HyperTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Swap the success classifier, keeping everything else configured so
    /// far.
    pub fn classifier<C2>(self, classifier: C2) -> ClientBuilder<C2>
    where
        C2: Classify,
    {
        ClientBuilder {
            transport: self.transport,
            backoff: self.backoff,
            classifier,
            cancel: self.cancel,
        }
    }
}

impl<C> ClientBuilder<C>
where
    C: Classify,
{
    /// Build the client.
    ///
    /// The backoff policy is validated before the default transport is
    /// constructed, so an out-of-range attempt budget fails with
    /// [`Error::InvalidConfig`] without touching TLS setup.
    pub fn build(self) -> Result<RetryClient<HyperTransport, C>, Error> {
        self.backoff.validate().map_err(Error::invalid_config)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => HyperTransport::new()?,
        };
        RetryClient::new(transport, self.backoff, self.classifier, self.cancel)
    }
}
