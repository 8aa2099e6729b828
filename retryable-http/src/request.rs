use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Describes one HTTP request to execute under the retry loop.
///
/// A method, an absolute http/https URL, headers and a buffered body. The
/// body is held as [`Bytes`] so every attempt replays it from the start,
/// byte for byte; headers are copied into the wire request anew on each
/// attempt.
///
/// # Example
///
/// ```
/// use retryable_http::RequestSpec;
///
/// let spec = RequestSpec::post("https://api.example.com/jobs", r#"{"kind":"sync"}"#)
///     .header("content-type", "application/json")
///     .header("x-request-id", "abc123");
/// assert_eq!(spec.url(), "https://api.example.com/jobs");
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl RequestSpec {
    /// Create a request with an explicit method and an empty body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A GET request with an empty body.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// A POST request carrying `body`.
    pub fn post(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::new(Method::POST, url).body(body)
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a header, replacing any previous value under the same name.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid. Use
    /// [`try_header`](Self::try_header) for untrusted input.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Debug,
    {
        let name = key.try_into().expect("invalid header name");
        let value = value.try_into().expect("invalid header value");
        self.headers.insert(name, value);
        self
    }

    /// Add a header, returning `None` if the name or value is invalid.
    pub fn try_header<K, V>(mut self, key: K, value: V) -> Option<Self>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        let name = key.try_into().ok()?;
        let value = value.try_into().ok()?;
        self.headers.insert(name, value);
        Some(self)
    }

    /// Replace all headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URL as given.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The configured headers.
    pub fn get_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The buffered request body.
    pub fn get_body(&self) -> &Bytes {
        &self.body
    }
}
