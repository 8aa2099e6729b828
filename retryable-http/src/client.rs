use bytes::Bytes;
use http::{Response, Uri};
use http_body_util::BodyExt;

use crate::builder::ClientBuilder;
use crate::config::{AcceptSuccess, BackoffPolicy, CancelSignal, Classify, run_with_backoff};
use crate::error::Error;
use crate::request::RequestSpec;
use crate::transport::{HyperTransport, Transport, TransportBody};

/// Retrying HTTP request executor.
///
/// Pairs a [`Transport`] with a [`BackoffPolicy`], a [`Classify`] policy
/// and a [`CancelSignal`]. [`execute`](Self::execute) performs up to the
/// configured number of sequential attempts of one request, consulting the
/// classifier after each and backing off in between.
///
/// The client keeps no per-call state: one instance serves concurrent
/// calls, and cloning shares the underlying transport.
///
/// # Example
///
/// ```ignore
/// use retryable_http::{RetryClient, Strategy};
/// use std::time::Duration;
///
/// let client = RetryClient::builder()
///     .attempts(5)
///     .base_delay(Duration::from_millis(200))
///     .strategy(Strategy::Exponential)
///     .build()?;
///
/// let response = client.get("https://api.example.com/health").await?;
/// println!("status: {}", response.status());
/// ```
#[derive(Clone)]
pub struct RetryClient<T = HyperTransport, C = AcceptSuccess> {
    transport: T,
    backoff: BackoffPolicy,
    classifier: C,
    cancel: CancelSignal,
}

impl<T, C> std::fmt::Debug for RetryClient<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryClient")
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl RetryClient {
    /// Start building a client over the default hyper transport.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T, C> RetryClient<T, C>
where
    T: Transport,
    C: Classify,
{
    /// Create a client from parts, validating the backoff policy.
    ///
    /// [`builder`](RetryClient::builder) is the usual entry point; direct
    /// construction suits custom transports and test doubles.
    pub fn new(
        transport: T,
        backoff: BackoffPolicy,
        classifier: C,
        cancel: CancelSignal,
    ) -> Result<Self, Error> {
        backoff.validate().map_err(Error::invalid_config)?;
        Ok(Self {
            transport,
            backoff,
            classifier,
            cancel,
        })
    }

    /// Execute `spec` with retries.
    ///
    /// The URL is validated before anything else; a malformed URL reports
    /// [`Error::InvalidUrl`] without consuming any attempt, even when the
    /// cancel signal has already fired. On success the response is returned
    /// with its body fully collected; on failure only the final error
    /// crosses the boundary.
    pub async fn execute(&self, spec: RequestSpec) -> Result<Response<Bytes>, Error> {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "http.request",
            http.method = %spec.method,
            url = %spec.url,
            otel.kind = "client"
        );

        let fut = self.execute_inner(spec);
        #[cfg(feature = "tracing")]
        let fut = tracing::Instrument::instrument(fut, span);
        fut.await
    }

    /// GET `url` with an empty body. Sugar over [`execute`](Self::execute).
    pub async fn get(&self, url: impl Into<String>) -> Result<Response<Bytes>, Error> {
        self.execute(RequestSpec::get(url)).await
    }

    /// POST `body` to `url`. Sugar over [`execute`](Self::execute).
    pub async fn post(
        &self,
        url: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Result<Response<Bytes>, Error> {
        self.execute(RequestSpec::post(url, body)).await
    }

    async fn execute_inner(&self, spec: RequestSpec) -> Result<Response<Bytes>, Error> {
        // 1. Validate the URL first; bad targets never reach the loop.
        let uri = parse_target(&spec.url)?;

        // 2. Drive attempts under the backoff policy. Each attempt rebuilds
        //    the wire request from `spec`, so headers and body replay
        //    identically.
        run_with_backoff(&self.backoff, &self.cancel, |_attempt| {
            self.run_attempt(&spec, &uri)
        })
        .await
    }

    async fn run_attempt(
        &self,
        spec: &RequestSpec,
        uri: &Uri,
    ) -> Result<Response<Bytes>, Error> {
        // 1. Assemble the request for this attempt.
        let mut builder = http::Request::builder()
            .method(spec.method.clone())
            .uri(uri.clone());
        for (name, value) in spec.headers.iter() {
            builder = builder.header(name, value);
        }
        let body = if spec.body.is_empty() {
            TransportBody::empty()
        } else {
            TransportBody::full(spec.body.clone())
        };
        let request = builder
            .body(body)
            .map_err(|e| Error::transport(format!("failed to build request: {}", e)))?;

        // 2. Dispatch and materialize the outcome.
        let outcome = match self.transport.send(request).await {
            Ok(response) => collect_response(response).await,
            Err(error) => Err(error),
        };

        // 3. The classifier owns the verdict. Accepting a failed attempt
        //    hands the failure back unchanged.
        match self.classifier.classify(outcome.as_ref()) {
            Ok(()) => outcome,
            Err(verdict) => Err(verdict),
        }
    }
}

/// Validate `url` as an absolute http/https URL with a host.
fn parse_target(url: &str) -> Result<Uri, Error> {
    let uri: Uri = url
        .parse()
        .map_err(|e| Error::invalid_url(format!("{}: {}", url, e)))?;

    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(other) => {
            return Err(Error::invalid_url(format!(
                "unsupported scheme {:?} in {}",
                other, url
            )));
        }
        None => return Err(Error::invalid_url(format!("missing scheme in {}", url))),
    }
    if uri.host().is_none() {
        return Err(Error::invalid_url(format!("missing host in {}", url)));
    }

    Ok(uri)
}

/// Collect a wire response body into an owned [`Bytes`] response.
async fn collect_response<B>(response: Response<B>) -> Result<Response<Bytes>, Error>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let (parts, body) = response.into_parts();
    let collected = body
        .collect()
        .await
        .map_err(|e| Error::transport(format!("failed to read response body: {}", e)))?
        .to_bytes();
    Ok(Response::from_parts(parts, collected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CancelHandle, Classifier};
    use http::{HeaderMap, Method, StatusCode};
    use http_body_util::Full;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// One scripted attempt outcome.
    enum Script {
        Status(u16),
        StatusWithBody(u16, &'static [u8]),
        Fail(&'static str),
    }

    /// Everything the transport saw for one attempt.
    struct Seen {
        method: Method,
        uri: String,
        headers: HeaderMap,
        body: Bytes,
    }

    /// Transport double: plays a script, records every request.
    struct StubTransport {
        script: Mutex<VecDeque<Script>>,
        seen: Mutex<Vec<Seen>>,
    }

    impl StubTransport {
        fn new(script: impl IntoIterator<Item = Script>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().collect()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Transport for Arc<StubTransport> {
        type Body = Full<Bytes>;

        fn send(
            &self,
            request: http::Request<TransportBody>,
        ) -> impl Future<Output = Result<Response<Full<Bytes>>, Error>> + Send {
            let stub = self.clone();
            async move {
                let (parts, body) = request.into_parts();
                let bytes = body.collect().await.unwrap().to_bytes();
                stub.seen.lock().unwrap().push(Seen {
                    method: parts.method,
                    uri: parts.uri.to_string(),
                    headers: parts.headers,
                    body: bytes,
                });

                let step = stub
                    .script
                    .lock()
                    .unwrap()
                    .pop_front()
                    .expect("transport called more times than scripted");
                match step {
                    Script::Status(status) => Ok(response_with(status, b"")),
                    Script::StatusWithBody(status, body) => Ok(response_with(status, body)),
                    Script::Fail(message) => Err(Error::transport(message)),
                }
            }
        }
    }

    fn response_with(status: u16, body: &'static [u8]) -> Response<Full<Bytes>> {
        Response::builder()
            .status(status)
            .body(Full::new(Bytes::from_static(body)))
            .unwrap()
    }

    fn fast_backoff(attempts: u32) -> BackoffPolicy {
        BackoffPolicy::new()
            .attempts(attempts)
            .base_delay(Duration::from_millis(1))
    }

    fn client_with(
        stub: Arc<StubTransport>,
        backoff: BackoffPolicy,
    ) -> RetryClient<Arc<StubTransport>> {
        RetryClient::new(stub, backoff, AcceptSuccess, CancelSignal::never()).unwrap()
    }

    #[tokio::test]
    async fn test_returns_first_success() {
        let stub = StubTransport::new([Script::StatusWithBody(200, b"payload")]);
        let client = client_with(stub.clone(), fast_backoff(3));

        let response = client.get("http://example.com/ok").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"payload");
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_retries_through_server_errors() {
        let stub = StubTransport::new([
            Script::Status(500),
            Script::Status(500),
            Script::StatusWithBody(200, b"finally"),
        ]);
        let policy = BackoffPolicy::new()
            .attempts(5)
            .base_delay(Duration::from_millis(10));
        let client = client_with(stub.clone(), policy);

        let started = Instant::now();
        let response = client.get("http://example.com/flaky").await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"finally");
        assert_eq!(stub.calls(), 3);
        // Two 10ms backoffs between the three attempts.
        assert!(elapsed >= Duration::from_millis(20), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(200), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_exhausts_budget_and_wraps_last_error() {
        let stub = StubTransport::new([
            Script::Status(502),
            Script::Status(503),
            Script::Status(504),
        ]);
        let client = client_with(stub.clone(), fast_backoff(3));

        let err = client.get("http://example.com/down").await.unwrap_err();
        assert_eq!(stub.calls(), 3);
        match err {
            Error::Exhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(
                    *source,
                    Error::UnacceptableStatus(StatusCode::GATEWAY_TIMEOUT)
                ));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_invalid_urls_without_attempting() {
        let stub = StubTransport::new([]);
        let client = client_with(stub.clone(), fast_backoff(3));

        for url in [
            "not a url",
            "example.com/missing-scheme",
            "ftp://example.com",
            "http://",
        ] {
            let err = client.get(url).await.unwrap_err();
            assert!(
                matches!(err, Error::InvalidUrl(_)),
                "url {:?} gave {:?}",
                url,
                err
            );
        }
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_reported_even_when_cancelled() {
        let handle = CancelHandle::new();
        handle.cancel();
        let stub = StubTransport::new([]);
        let client =
            RetryClient::new(stub.clone(), fast_backoff(3), AcceptSuccess, handle.signal())
                .unwrap();

        let err = client.get("not a url").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_pre_cancelled_never_reaches_transport() {
        let handle = CancelHandle::new();
        handle.cancel();
        let stub = StubTransport::new([Script::Status(200)]);
        let client =
            RetryClient::new(stub.clone(), fast_backoff(3), AcceptSuccess, handle.signal())
                .unwrap();

        let err = client.get("http://example.com/ok").await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_backoff_delay() {
        let handle = CancelHandle::new();
        let signal = handle.signal();
        let stub = StubTransport::new([Script::Status(500), Script::Status(200)]);
        let policy = BackoffPolicy::new()
            .attempts(5)
            .base_delay(Duration::from_millis(500));
        let client = RetryClient::new(stub.clone(), policy, AcceptSuccess, signal).unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let started = Instant::now();
        let err = client.get("http://example.com/flaky").await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(stub.calls(), 1);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_body_replays_identically_on_retry() {
        let stub = StubTransport::new([Script::Fail("connection reset"), Script::Status(201)]);
        let client = client_with(stub.clone(), fast_backoff(3));

        let response = client
            .post("http://example.com/things", "exact payload")
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].body.as_ref(), b"exact payload");
        assert_eq!(seen[0].body, seen[1].body);
        assert_eq!(seen[0].method, Method::POST);
    }

    #[tokio::test]
    async fn test_headers_copied_into_every_attempt() {
        let stub = StubTransport::new([Script::Status(500), Script::Status(200)]);
        let client = client_with(stub.clone(), fast_backoff(3));

        let spec = RequestSpec::get("http://example.com/auth")
            .header("authorization", "Bearer token")
            .header("x-trace", "abc");
        client.execute(spec).await.unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        for request in seen.iter() {
            assert_eq!(request.headers.get("authorization").unwrap(), "Bearer token");
            assert_eq!(request.headers.get("x-trace").unwrap(), "abc");
        }
    }

    #[tokio::test]
    async fn test_fatal_classifier_stops_immediately() {
        let stub = StubTransport::new([Script::Status(404)]);
        let classifier = Classifier::new(|outcome| match outcome {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) if response.status().is_client_error() => {
                Err(Error::fatal(format!("client error {}", response.status())))
            }
            Ok(response) => Err(Error::UnacceptableStatus(response.status())),
            Err(error) => Err(error.clone()),
        });
        let client =
            RetryClient::new(stub.clone(), fast_backoff(5), classifier, CancelSignal::never())
                .unwrap();

        let err = client.get("http://example.com/missing").await.unwrap_err();
        assert!(matches!(err, Error::Fatal(_)));
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_classifier_fully_defines_success() {
        let stub = StubTransport::new([Script::Status(500)]);
        let classifier = Classifier::new(|_outcome| Ok(()));
        let client =
            RetryClient::new(stub.clone(), fast_backoff(3), classifier, CancelSignal::never())
                .unwrap();

        let response = client.get("http://example.com/whatever").await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_errors_are_retryable() {
        let stub = StubTransport::new([Script::Fail("reset"), Script::Fail("refused")]);
        let client = client_with(stub.clone(), fast_backoff(2));

        let err = client.get("http://example.com/gone").await.unwrap_err();
        assert_eq!(stub.calls(), 2);
        match err {
            Error::Exhausted { attempts, source } => {
                assert_eq!(attempts, 2);
                assert_eq!(source.to_string(), "transport error: refused");
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_and_post_sugar() {
        let stub = StubTransport::new([Script::Status(200), Script::Status(200)]);
        let client = client_with(stub.clone(), fast_backoff(1));

        client.get("http://example.com/a").await.unwrap();
        client.post("http://example.com/b", "data").await.unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::GET);
        assert!(seen[0].body.is_empty());
        assert_eq!(seen[1].method, Method::POST);
        assert_eq!(seen[1].body.as_ref(), b"data");
        assert_eq!(seen[1].uri, "http://example.com/b");
    }

    #[test]
    fn test_zero_attempts_rejected_at_construction() {
        let stub = StubTransport::new([]);
        let err = RetryClient::new(
            stub,
            BackoffPolicy::new().attempts(0),
            AcceptSuccess,
            CancelSignal::never(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_client() {
        let stub = StubTransport::new([Script::Status(200), Script::Status(200)]);
        let client = Arc::new(client_with(stub.clone(), fast_backoff(1)));

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.get("http://example.com/1").await }
        });
        let second = tokio::spawn({
            let client = client.clone();
            async move { client.get("http://example.com/2").await }
        });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_parse_target_accepts_http_and_https() {
        assert!(parse_target("http://example.com/x?q=1").is_ok());
        assert!(parse_target("https://example.com").is_ok());
    }
}

#[cfg(all(
    test,
    any(feature = "tls-ring", feature = "tls-aws-lc"),
    any(feature = "tls-native-roots", feature = "tls-webpki-roots")
))]
mod live_tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use hyper::service::service_fn;
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Serves 500 for the first `failures` requests, then 200.
    async fn spawn_flaky_server(failures: u32) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicU32::new(0));

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let hits = hits.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |_req: http::Request<hyper::body::Incoming>| {
                        let hits = hits.clone();
                        async move {
                            let n = hits.fetch_add(1, Ordering::SeqCst);
                            let status = if n < failures { 500 } else { 200 };
                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(status)
                                    .body(Full::new(Bytes::from_static(b"hello")))
                                    .unwrap(),
                            )
                        }
                    });
                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        format!("http://{}", addr)
    }

    /// Echoes the request body back.
    async fn spawn_echo_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                tokio::spawn(async move {
                    let service =
                        service_fn(|req: http::Request<hyper::body::Incoming>| async move {
                            let body = req.into_body().collect().await.unwrap().to_bytes();
                            Ok::<_, Infallible>(Response::new(Full::new(body)))
                        });
                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_live_retry_against_flaky_server() {
        let base = spawn_flaky_server(2).await;
        let transport = HyperTransport::new().unwrap();
        let policy = BackoffPolicy::new()
            .attempts(5)
            .base_delay(Duration::from_millis(10));
        let client =
            RetryClient::new(transport, policy, AcceptSuccess, CancelSignal::never()).unwrap();

        let response = client.get(format!("{}/health", base)).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"hello");
    }

    #[tokio::test]
    async fn test_live_post_round_trips_body() {
        let base = spawn_echo_server().await;
        let client = RetryClient::builder().attempts(2).build().unwrap();

        let response = client
            .post(format!("{}/echo", base), "ping payload")
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"ping payload");
    }
}
