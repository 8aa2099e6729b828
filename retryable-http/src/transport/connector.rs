//! Connector assembly for the hyper transport.
//!
//! TLS support needs both a crypto provider and a root certificate source:
//!
//! - **Crypto providers** (choose one): `tls-ring` or `tls-aws-lc`
//! - **Root certificates** (choose one): `tls-native-roots` (system store)
//!   or `tls-webpki-roots` (bundled Mozilla roots)
//!
//! The default `tls` feature enables `tls-ring` + `tls-native-roots`. For
//! anything beyond that (private CAs, mTLS), build a `rustls::ClientConfig`
//! yourself and hand it to
//! [`HyperTransportBuilder::tls_config`](super::HyperTransportBuilder::tls_config).

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::ClientConfig;

/// Returns true if both a crypto provider and root certificates are
/// compiled in.
#[inline]
pub const fn has_tls_support() -> bool {
    cfg!(any(feature = "tls-ring", feature = "tls-aws-lc"))
        && cfg!(any(
            feature = "tls-native-roots",
            feature = "tls-webpki-roots"
        ))
}

/// Resolve a crypto provider for the client config.
///
/// Feature-gated providers win; otherwise a user-installed global default
/// is honored. Returns `None` when no provider exists at all.
fn try_get_crypto_provider_builder()
-> Option<rustls::ConfigBuilder<ClientConfig, rustls::WantsVerifier>> {
    #[cfg(feature = "tls-ring")]
    return Some({
        let provider = std::sync::Arc::new(rustls::crypto::ring::default_provider());
        ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .expect("safe default protocol versions should be valid")
    });

    #[cfg(all(feature = "tls-aws-lc", not(feature = "tls-ring")))]
    return Some({
        let provider = std::sync::Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .expect("safe default protocol versions should be valid")
    });

    #[cfg(not(any(feature = "tls-ring", feature = "tls-aws-lc")))]
    {
        rustls::crypto::CryptoProvider::get_default().map(|provider| {
            ClientConfig::builder_with_provider(provider.clone())
                .with_safe_default_protocol_versions()
                .expect("safe default protocol versions should be valid")
        })
    }
}

/// Build the default TLS configuration from the enabled features.
///
/// Returns `None` when no crypto provider is available.
#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
pub fn default_tls_config() -> Option<ClientConfig> {
    let builder = try_get_crypto_provider_builder()?;
    let roots = build_root_store();

    Some(builder.with_root_certificates(roots).with_no_client_auth())
}

/// Root certificate store from the enabled features. Native roots win when
/// both sources are enabled.
#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
fn build_root_store() -> rustls::RootCertStore {
    let mut roots = rustls::RootCertStore::empty();

    #[cfg(feature = "tls-native-roots")]
    {
        let native_certs = rustls_native_certs::load_native_certs();
        if !native_certs.errors.is_empty() {
            // Some certs may still have loaded; keep going with those.
            #[cfg(feature = "tracing")]
            tracing::debug!("errors loading native certs: {:?}", native_certs.errors);
        }
        roots.add_parsable_certificates(native_certs.certs);
    }

    #[cfg(all(feature = "tls-webpki-roots", not(feature = "tls-native-roots")))]
    {
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    roots
}

/// Build the HTTPS connector used by [`HyperTransport`](super::HyperTransport).
///
/// `https_or_http` mode: plain `http://` URLs skip TLS entirely. With no
/// custom config, the feature-selected default is used.
///
/// # Panics
///
/// Panics when no TLS configuration can be assembled: no custom config was
/// given and either the root-certificate features or a crypto provider are
/// missing.
pub fn build_https_connector(tls_config: Option<ClientConfig>) -> HttpsConnector<HttpConnector> {
    let config = match tls_config {
        Some(config) => config,
        None => {
            #[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
            {
                default_tls_config().unwrap_or_else(|| {
                    panic!(
                        "HTTPS requires a crypto provider. Enable the `tls-ring` or \
                         `tls-aws-lc` feature, or install one via \
                         `CryptoProvider::install_default()`.\n\n\
                         retryable-http = {{ version = \"...\", features = [\"tls\"] }}"
                    );
                })
            }

            #[cfg(not(any(feature = "tls-native-roots", feature = "tls-webpki-roots")))]
            {
                panic!(
                    "HTTPS requires root certificates. Enable `tls-native-roots` or \
                     `tls-webpki-roots`, or the `tls` feature for the defaults:\n\n\
                     retryable-http = {{ version = \"...\", features = [\"tls\"] }}"
                );
            }
        }
    };

    HttpsConnectorBuilder::new()
        .with_tls_config(config)
        .https_or_http()
        .enable_all_versions()
        .wrap_connector(build_http_connector())
}

/// The TCP-level connector under the TLS layer.
///
/// Scheme enforcement is left to the HTTPS layer so `http://` URLs work.
pub fn build_http_connector() -> HttpConnector {
    let mut connector = HttpConnector::new();
    connector.enforce_http(false);
    connector
}
