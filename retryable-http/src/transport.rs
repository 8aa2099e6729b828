//! HTTP transport layer.
//!
//! [`Transport`] is the seam between the retry loop and the wire. The
//! default implementation, [`HyperTransport`], drives hyper_util's legacy
//! client with:
//!
//! - HTTP/1.1 and HTTP/2 with automatic protocol negotiation
//! - TLS with rustls (feature-gated)
//! - Connection pooling
//!
//! Custom implementations substitute anything that can execute one request
//! attempt, from an alternative client to a scripted test double.
//!
//! # Feature Flags
//!
//! - `tls` (default) - `tls-ring` + `tls-native-roots` for convenience
//! - `tls-ring` / `tls-aws-lc` - crypto providers
//! - `tls-native-roots` / `tls-webpki-roots` - root certificates

use std::future::Future;

use bytes::Bytes;

use crate::error::Error;

mod body;
mod connector;
mod hyper;

pub use body::TransportBody;
pub use connector::{build_http_connector, build_https_connector, has_tls_support};

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
pub use connector::default_tls_config;

pub use hyper::{HyperTransport, HyperTransportBuilder};

// Re-export the rustls config type used for custom TLS setups.
pub use rustls::ClientConfig as TlsClientConfig;

/// Executes a single HTTP request attempt.
///
/// The retry loop assembles a fresh [`http::Request`] for every attempt and
/// calls [`send`](Transport::send) strictly sequentially. Implementations
/// map their wire failures to [`Error::Transport`]; they never retry on
/// their own.
pub trait Transport: Send + Sync {
    /// Response body type produced by this transport.
    type Body: http_body::Body<Data = Bytes, Error: std::fmt::Display> + Send + 'static;

    /// Execute one attempt of `request`.
    fn send(
        &self,
        request: http::Request<TransportBody>,
    ) -> impl Future<Output = Result<http::Response<Self::Body>, Error>> + Send;
}
