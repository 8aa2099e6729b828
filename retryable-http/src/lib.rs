//! Retrying HTTP request executor over hyper.
//!
//! This crate wraps a connection-pooled HTTP transport in a configurable
//! retry loop: a bounded number of sequential attempts, linear or
//! exponential backoff between failures, a pluggable success/failure
//! classifier and cooperative cancellation.
//!
//! ## Features
//!
//! - Bounded sequential attempts, each rebuilt from the original request
//! - Linear and exponential backoff between failed attempts
//! - Pluggable response classification (accept, retry or fail fast)
//! - Cooperative cancellation via deadline, timeout or manual handle
//! - Pooled hyper transport with rustls TLS and HTTP/1 + HTTP/2 support
//!
//! ## Example
//!
//! ```ignore
//! use retryable_http::{RetryClient, Strategy};
//! use std::time::Duration;
//!
//! // Create a client
//! let client = RetryClient::builder()
//!     .attempts(5)
//!     .base_delay(Duration::from_millis(200))
//!     .strategy(Strategy::Exponential)
//!     .build()?;
//!
//! // GET with retries
//! let response = client.get("https://api.example.com/health").await?;
//! println!("status: {}", response.status());
//! println!("body: {} bytes", response.body().len());
//!
//! // POST replays the same body on every retry
//! let response = client.post("https://api.example.com/things", r#"{"name":"x"}"#).await?;
//! ```
//!
//! ## Retry Semantics
//!
//! A call makes up to `attempts` tries of the same request, numbered from
//! zero. The first try starts immediately; every later try is preceded by
//! a delay derived from the base delay and the strategy:
//!
//! | Attempt | Linear | Exponential |
//! |---------|--------|-------------|
//! | 0       | none   | none        |
//! | 1       | `base` | `base`      |
//! | 2       | `base` | `2 * base`  |
//! | 3       | `base` | `4 * base`  |
//!
//! The loop decides before it sleeps: once the attempt budget is spent, the
//! call returns [`Error::Exhausted`] wrapping the final attempt's error
//! without a trailing delay. A successful attempt returns immediately and
//! skips all remaining budget.
//!
//! Only transient failures are retried. Transport errors and rejected
//! statuses ([`Error::Transport`], [`Error::UnacceptableStatus`]) consume
//! an attempt and back off; everything else propagates at once.
//!
//! ## Classification
//!
//! The executor itself has no opinion about status codes. After every
//! attempt the outcome is handed to a [`Classify`] policy, which either
//! accepts it or converts it into the error the retry loop acts on:
//!
//! ```ignore
//! use retryable_http::{Classifier, Error, RetryClient};
//!
//! // Treat 4xx as fatal, 5xx as retryable, 2xx/3xx as success.
//! let classifier = Classifier::new(|outcome| match outcome {
//!     Ok(response) if response.status().is_client_error() => {
//!         Err(Error::fatal(format!("client error {}", response.status())))
//!     }
//!     Ok(response) if response.status().is_server_error() => {
//!         Err(Error::UnacceptableStatus(response.status()))
//!     }
//!     Ok(_) => Ok(()),
//!     Err(error) => Err(error.clone()),
//! });
//!
//! let client = RetryClient::builder()
//!     .classifier(classifier)
//!     .build()?;
//! ```
//!
//! The default [`AcceptSuccess`] classifier accepts 2xx and marks every
//! other status retryable.
//!
//! ## Cancellation
//!
//! Cancellation is cooperative. The signal is consulted before every
//! attempt and while sleeping between attempts; an attempt already on the
//! wire is never torn down mid-flight.
//!
//! ### Deadlines and Timeouts
//!
//! ```ignore
//! use retryable_http::{CancelSignal, RetryClient};
//! use std::time::Duration;
//!
//! // Give the whole call, retries included, ten seconds.
//! let client = RetryClient::builder()
//!     .cancel(CancelSignal::timeout(Duration::from_secs(10)))
//!     .build()?;
//! ```
//!
//! ### Manual Cancellation
//!
//! ```ignore
//! use retryable_http::{CancelHandle, RetryClient};
//!
//! let handle = CancelHandle::new();
//! let client = RetryClient::builder()
//!     .cancel(handle.signal())
//!     .build()?;
//!
//! // From anywhere, e.g. a shutdown path:
//! handle.cancel();
//! ```
//!
//! A cancelled call fails with [`Error::Cancelled`]. A malformed URL is
//! the one thing reported ahead of cancellation: the target is validated
//! before the first cancel check, so a bad URL always surfaces as
//! [`Error::InvalidUrl`].
//!
//! ## Feature Flags
//!
//! The default configuration enables TLS with the ring provider and the
//! platform certificate store.
//!
//! ### TLS
//!
//! | Feature | Description | Dependencies |
//! |---------|-------------|--------------|
//! | `tls` (default) | Ring provider + native roots | `rustls`, `rustls-native-certs` |
//! | `tls-ring` | Ring crypto provider | `rustls/ring` |
//! | `tls-aws-lc` | AWS-LC crypto provider | `rustls/aws-lc-rs` |
//! | `tls-native-roots` | System certificate store | `rustls-native-certs` |
//! | `tls-webpki-roots` | Bundled Mozilla roots | `webpki-roots` |
//!
//! **Recommendation**: keep the defaults unless your platform has no
//! usable certificate store, in which case swap `tls-native-roots` for
//! `tls-webpki-roots`.
//!
//! ### Observability
//!
//! | Feature | Description | Dependencies |
//! |---------|-------------|--------------|
//! | `tracing` | Spans and retry events | `tracing` |
//!
//! When enabled, each executed request creates a span with:
//! - `http.method`: Request method
//! - `url`: Target URL
//! - `otel.kind`: "client"
//!
//! and each backoff emits a debug event carrying the failed attempt index,
//! the error and the upcoming delay.
//!
//! ## Custom Transports
//!
//! The retry loop is generic over [`Transport`]. Anything that can turn an
//! `http::Request<TransportBody>` into a response body works, which keeps
//! tests free of real sockets:
//!
//! ```ignore
//! use retryable_http::{AcceptSuccess, BackoffPolicy, CancelSignal, RetryClient};
//!
//! let client = RetryClient::new(
//!     my_transport,
//!     BackoffPolicy::aggressive(),
//!     AcceptSuccess,
//!     CancelSignal::never(),
//! )?;
//! ```
//!
//! ## TLS Configuration
//!
//! For custom roots or client certificates, build a `rustls` config and
//! hand it to the transport builder:
//!
//! ```ignore
//! use retryable_http::{HyperTransport, RetryClient, TlsClientConfig};
//!
//! let tls: TlsClientConfig = build_my_tls_config()?;
//! let transport = HyperTransport::builder()
//!     .tls_config(tls)
//!     .build()?;
//!
//! let client = RetryClient::builder()
//!     .transport(transport)
//!     .build()?;
//! ```

mod builder;
mod client;
pub mod config;
mod error;
pub mod request;
pub mod transport;

pub use builder::ClientBuilder;
pub use client::RetryClient;
pub use error::Error;

// Re-export from config module
pub use config::{
    AcceptSuccess, BackoffPolicy, CancelHandle, CancelSignal, Classifier, Classify, MAX_ATTEMPTS,
    Strategy, defaults, run_with_backoff,
};

// Re-export from request module
pub use request::RequestSpec;

// Re-export transport types at the top level for convenience
pub use transport::{
    HyperTransport, HyperTransportBuilder, TlsClientConfig, Transport, TransportBody,
};

// Re-export types needed to build request bodies and read response bodies
pub use bytes::Bytes;
