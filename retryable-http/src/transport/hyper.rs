//! Hyper-based default transport.

use std::future::Future;
use std::time::Duration;

use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use rustls::ClientConfig;

use super::Transport;
use super::body::TransportBody;
use super::connector::build_https_connector;
use crate::error::Error;

/// The pooled hyper client behind [`HyperTransport`].
type HyperClient = Client<HttpsConnector<HttpConnector>, TransportBody>;

/// Default HTTP transport on hyper_util's legacy client.
///
/// HTTP/1.1 and HTTP/2 with ALPN negotiation, rustls TLS and connection
/// pooling. Cloning is cheap and clones share the pool.
///
/// # Example
///
/// ```ignore
/// use retryable_http::transport::HyperTransport;
///
/// let transport = HyperTransport::builder()
///     .pool_idle_timeout(std::time::Duration::from_secs(60))
///     .build()?;
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
    http2_only: bool,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("http2_only", &self.http2_only)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport builder.
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// Create a transport with default settings.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Whether the transport speaks HTTP/2 exclusively.
    pub fn is_http2_only(&self) -> bool {
        self.http2_only
    }
}

impl Transport for HyperTransport {
    type Body = Incoming;

    fn send(
        &self,
        request: http::Request<TransportBody>,
    ) -> impl Future<Output = Result<http::Response<Incoming>, Error>> + Send {
        let client = self.client.clone();
        async move {
            client
                .request(request)
                .await
                .map_err(|e| Error::transport(format!("request failed: {}", e)))
        }
    }
}

/// Builder for [`HyperTransport`].
///
/// # Example
///
/// ```ignore
/// use retryable_http::transport::HyperTransportBuilder;
/// use std::time::Duration;
///
/// let transport = HyperTransportBuilder::new()
///     .http2_only(true)
///     .pool_max_idle_per_host(8)
///     .build()?;
/// ```
pub struct HyperTransportBuilder {
    /// Custom TLS configuration; feature-selected default when `None`.
    tls_config: Option<ClientConfig>,
    /// Force HTTP/2 without the upgrade handshake (h2c or known-h2 peers).
    http2_only: bool,
    /// Connection pool idle timeout.
    pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections kept per host.
    pool_max_idle_per_host: usize,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransportBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            tls_config: None,
            http2_only: false,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }

    /// Set a custom TLS configuration (private CAs, mTLS, pinned roots).
    pub fn tls_config(mut self, config: ClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Speak HTTP/2 exclusively, skipping the HTTP/1.1 upgrade.
    ///
    /// HTTPS peers normally negotiate HTTP/2 via ALPN, so this is only
    /// needed for h2c or servers known to reject HTTP/1.1.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    /// Close pooled connections idle for longer than `timeout`.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Keep idle connections open indefinitely.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Maximum idle connections kept per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HyperTransport, Error> {
        let https_connector = build_https_connector(self.tls_config);

        let mut builder = Client::builder(TokioExecutor::new());

        // The pool timer is required for pool_idle_timeout to take effect.
        builder.pool_timer(TokioTimer::new());

        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);

        if self.http2_only {
            builder.http2_only(true);
        }

        let client = builder.build(https_connector);

        Ok(HyperTransport {
            client,
            http2_only: self.http2_only,
        })
    }
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("tls_config", &self.tls_config.is_some())
            .field("http2_only", &self.http2_only)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .finish()
    }
}
