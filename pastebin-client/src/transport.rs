//! HTTP transport abstraction
//!
//! Everything the client needs from the network is "send a request, get back a
//! status and a body". [`Transport`] captures exactly that so the session logic can
//! run against [`ReqwestTransport`] in production and against an in-memory double
//! in tests.

use crate::error::{PastebinError, TransportError};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Per-call timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound of idle keep-alive connections kept per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 50;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully-formed outgoing HTTP request
#[derive(Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute target URL, query included
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body, if any
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request without headers or body
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Shorthand for a `POST` request
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Set a header, replacing any previous value
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Encode `fields` as an `application/x-www-form-urlencoded` body
    pub fn form<K, V>(mut self, fields: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.body = Some(body);
        self.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
    }

    /// Decode the form body back into name/value pairs
    ///
    /// Returns an empty list when there is no body.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.body
            .as_deref()
            .map(|body| {
                url::form_urlencoded::parse(body.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a single form field by name
    pub fn form_field(&self, name: &str) -> Option<String> {
        self.form_fields()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

// Form bodies carry passwords and session tokens, so only their size is printed.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field(
                "body",
                &self.body.as_ref().map(|body| format!("<{} bytes>", body.len())),
            )
            .finish()
    }
}

/// The status and text body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: StatusCode,
    /// Body decoded as UTF-8
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A `200 OK` response with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

/// Capability to exchange one HTTP request for one response
///
/// Implementations must be safe to share between threads; the client never holds
/// per-call state inside a transport.
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the complete response
    ///
    /// Non-2xx statuses are not errors at this layer; only failures to obtain a
    /// response are.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Production transport backed by a pooled blocking reqwest client
///
/// Cloning is cheap and clones share the same connection pool.
///
/// # Example
///
/// ```no_run
/// use pastebin_client::ReqwestTransport;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = ReqwestTransport::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default timeout and pool size
    ///
    /// # Errors
    ///
    /// Returns `PastebinError::ClientInit` if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, PastebinError> {
        Self::builder().build()
    }

    /// Create a builder for configuring the transport
    pub fn builder() -> TransportBuilder {
        TransportBuilder::new()
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status();
        // `text()` would replace invalid bytes instead of failing.
        let bytes = response.bytes()?;
        let body = String::from_utf8(bytes.to_vec()).map_err(|_| TransportError::Encoding)?;

        Ok(HttpResponse { status, body })
    }
}

/// Builder for [`ReqwestTransport`]
///
/// Without a custom client builder the transport uses rustls, a
/// [`DEFAULT_TIMEOUT`] per call and at most [`DEFAULT_POOL_MAX_IDLE_PER_HOST`]
/// idle connections per host. Explicitly set values always win, including over a
/// custom client builder.
#[derive(Debug, Default)]
pub struct TransportBuilder {
    timeout: Option<Duration>,
    pool_max_idle_per_host: Option<usize>,
    client_builder: Option<reqwest::blocking::ClientBuilder>,
}

impl TransportBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Overall deadline for a single request, connect to last body byte
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Maximum idle keep-alive connections retained per host
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = Some(max);
        self
    }

    /// Start from a caller-configured reqwest client builder (proxies, headers, ...)
    pub fn client_builder(mut self, builder: reqwest::blocking::ClientBuilder) -> Self {
        self.client_builder = Some(builder);
        self
    }

    /// Build the transport
    ///
    /// # Errors
    ///
    /// Returns `PastebinError::ClientInit` if the HTTP client cannot be initialized.
    pub fn build(self) -> Result<ReqwestTransport, PastebinError> {
        let (mut builder, defaults) = match self.client_builder {
            Some(builder) => (builder, false),
            None => (reqwest::blocking::Client::builder().use_rustls_tls(), true),
        };

        let timeout = self.timeout.or(defaults.then_some(DEFAULT_TIMEOUT));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let pool_max = self
            .pool_max_idle_per_host
            .or(defaults.then_some(DEFAULT_POOL_MAX_IDLE_PER_HOST));
        if let Some(max) = pool_max {
            builder = builder.pool_max_idle_per_host(max);
        }

        let client = builder
            .build()
            .map_err(|e| PastebinError::ClientInit(e.to_string()))?;

        Ok(ReqwestTransport { client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn server_url(server: &mockito::Server, path: &str) -> Url {
        Url::parse(&format!("{}{}", server.url(), path)).unwrap()
    }

    #[test]
    fn test_form_encodes_fields_and_sets_content_type() {
        let request = HttpRequest::post(Url::parse("https://example.com/api").unwrap()).form(&[
            ("api_option", "paste"),
            ("api_paste_code", "fn main() { println!(\"&=\"); }"),
        ]);

        assert_eq!(
            request.headers.get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(request.form_field("api_option").as_deref(), Some("paste"));
        assert_eq!(
            request.form_field("api_paste_code").as_deref(),
            Some("fn main() { println!(\"&=\"); }")
        );
        assert!(request.form_field("missing").is_none());
    }

    #[test]
    fn test_debug_hides_body() {
        let request = HttpRequest::post(Url::parse("https://example.com/api").unwrap())
            .form(&[("api_user_password", "hunter2")]);

        let printed = format!("{:?}", request);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("bytes>"));
    }

    #[test]
    fn test_get_has_no_body() {
        let request = HttpRequest::get(Url::parse("https://example.com/raw/abc").unwrap());
        assert_eq!(request.method, Method::GET);
        assert!(request.body.is_none());
        assert!(request.form_fields().is_empty());
    }

    #[test]
    fn test_reqwest_transport_sends_form_post() {
        let mut server = mockito::Server::new();

        let mock = server
            .mock("POST", "/api/api_post.php")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("api_option".into(), "list".into()),
                mockito::Matcher::UrlEncoded("api_dev_key".into(), "dev".into()),
            ]))
            .with_status(200)
            .with_body("<paste></paste>")
            .expect(1)
            .create();

        let transport = ReqwestTransport::new().unwrap();
        let request = HttpRequest::post(server_url(&server, "/api/api_post.php"))
            .form(&[("api_option", "list"), ("api_dev_key", "dev")]);

        let response = transport.send(request).unwrap();

        assert_eq!(response, HttpResponse::ok("<paste></paste>"));
        mock.assert();
    }

    #[test]
    fn test_shared_transport_forwards_through_arc() {
        let mut server = mockito::Server::new();

        let mock = server
            .mock("GET", "/raw/abc")
            .with_status(200)
            .with_body("content")
            .expect(2)
            .create();

        let transport = Arc::new(ReqwestTransport::new().unwrap());
        let by_arc = Arc::clone(&transport);

        let url = server_url(&server, "/raw/abc");
        assert_eq!(by_arc.send(HttpRequest::get(url.clone())).unwrap().body, "content");
        assert_eq!((&*transport).send(HttpRequest::get(url)).unwrap().body, "content");

        mock.assert();
    }

    #[test]
    fn test_non_utf8_body_is_encoding_error() {
        let mut server = mockito::Server::new();

        let mock = server
            .mock("GET", "/raw/binary")
            .with_status(200)
            .with_body([0xff, 0xfe, b'A'])
            .expect(1)
            .create();

        let transport = ReqwestTransport::new().unwrap();
        let result = transport.send(HttpRequest::get(server_url(&server, "/raw/binary")));

        assert!(matches!(result, Err(TransportError::Encoding)));
        mock.assert();
    }

    #[test]
    fn test_connection_failure_is_transport_error() {
        // Nothing listens on the discard port of localhost in the test environment.
        let transport = ReqwestTransport::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let request = HttpRequest::get(Url::parse("http://127.0.0.1:9/raw/abc").unwrap());

        let result = transport.send(request);

        assert!(matches!(result, Err(TransportError::Request(_))));
    }

    // Non-2xx responses come back as responses; classification happens above this layer.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_error_status_is_not_transport_error(
            status_code in prop::sample::select(vec![400u16, 401, 403, 404, 422, 500, 502, 503]),
            body in "[a-zA-Z ]{0,40}",
        ) {
            let mut server = mockito::Server::new();

            let mock = server
                .mock("GET", "/raw/key")
                .with_status(status_code as usize)
                .with_body(&body)
                .expect(1)
                .create();

            let transport = ReqwestTransport::new().unwrap();
            let response = transport
                .send(HttpRequest::get(server_url(&server, "/raw/key")))
                .unwrap();

            prop_assert_eq!(response.status.as_u16(), status_code);
            prop_assert_eq!(response.body, body);
            mock.assert();
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn prop_custom_transport_configuration(
            timeout_secs in 1u64..120u64,
            pool_max in 0usize..200usize,
            custom_client in prop::bool::ANY,
        ) {
            let mut builder = ReqwestTransport::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .pool_max_idle_per_host(pool_max);
            if custom_client {
                builder = builder.client_builder(
                    reqwest::blocking::Client::builder().use_rustls_tls(),
                );
            }

            prop_assert!(builder.build().is_ok());
        }
    }
}
