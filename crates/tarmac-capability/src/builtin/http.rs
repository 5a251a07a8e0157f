//! Outbound HTTP client.
//!
//! Requests are validated locally (method allow-list, URL with a host)
//! before the body is read, and the body is read fully before anything is
//! sent. The host performs the exchange and reports two separate numbers:
//! the host status that drives dispatch, and the HTTP status code of the
//! exchange itself, which ends up in [`Response::status_code`].

use std::collections::HashMap;
use std::io::{self, Read};

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use tarmac_core::{ClientConfig, HostBinding, HostCallError, TransportPolicy};
use tarmac_proto::http::{Header, HttpClient as HttpClientRequest, HttpClientResponse};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::capability::{Capability, CapabilityId, standard_ids};
use crate::error::{HostErrorExt, PartialError, settle};

const POLICY: TransportPolicy = TransportPolicy::HonorStatus;

/// Methods the host accepts.
pub const ALLOWED_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "CONNECT", "OPTIONS", "TRACE",
];

/// Errors returned by the HTTP client. `T` is the value carried on partial
/// success.
#[derive(Debug, Error)]
pub enum HttpError<T = Response> {
    /// The URL could not be parsed or has no host.
    #[error("invalid URL provided: {0}")]
    InvalidUrl(String),

    /// The method is not in [`ALLOWED_METHODS`].
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// A header value is not valid.
    #[error("invalid header value for {0}")]
    InvalidHeader(String),

    /// Reading the request body failed.
    #[error("failed to read request body: {0}")]
    ReadBody(#[source] io::Error),

    /// The host call failed.
    #[error(transparent)]
    Host(#[from] HostCallError),

    /// The host returned a response but reported it as partial.
    #[error("{error}")]
    Partial {
        /// The partial response.
        value: T,
        /// Why the response is partial.
        #[source]
        error: HostCallError,
    },
}

impl<T> HttpError<T> {
    /// The partial response, if the host returned one.
    pub fn partial_value(&self) -> Option<&T> {
        match self {
            Self::Partial { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Take the partial response and its error.
    pub fn into_partial(self) -> Option<(T, HostCallError)> {
        match self {
            Self::Partial { value, error } => Some((value, error)),
            _ => None,
        }
    }
}

impl<T> HostErrorExt for HttpError<T> {
    fn host_error(&self) -> Option<&HostCallError> {
        match self {
            Self::Host(error) | Self::Partial { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl<T> PartialError<T> for HttpError<T> {
    fn partial(value: T, error: HostCallError) -> Self {
        Self::Partial { value, error }
    }
}

/// Result type for HTTP operations.
pub type HttpResult<T = Response> = Result<T, HttpError<T>>;

/// A validated outbound request.
///
/// The URL is parsed for validation only; the host receives it exactly as
/// the caller wrote it.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    parsed_url: Url,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Build a request, validating the method and URL before reading
    /// `body` to the end. Pass [`io::empty()`] for no body.
    pub fn new(method: &str, url: &str, mut body: impl Read) -> Result<Self, HttpError> {
        if !ALLOWED_METHODS.contains(&method) {
            return Err(HttpError::InvalidMethod(method.to_string()));
        }
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| HttpError::InvalidMethod(method.to_string()))?;
        let parsed_url = parse_url(url)?;

        let mut buf = Vec::new();
        body.read_to_end(&mut buf).map_err(HttpError::ReadBody)?;

        Ok(Self {
            method,
            url: url.to_string(),
            parsed_url,
            headers: HeaderMap::new(),
            body: Bytes::from(buf),
        })
    }

    /// Add a header value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URL as given to [`Request::new`].
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The parsed request URL.
    pub fn parsed_url(&self) -> &Url {
        &self.parsed_url
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the request headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

fn parse_url(raw: &str) -> Result<Url, HttpError> {
    let url = Url::parse(raw).map_err(|e| HttpError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(HttpError::InvalidUrl(format!("{raw}: missing host"))),
    }
}

/// The outcome of an HTTP exchange performed by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Canonical reason phrase for `status_code`; empty if unknown.
    pub status: String,
    /// HTTP status code of the exchange, as reported by the host.
    pub status_code: i32,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl Response {
    fn from_envelope(envelope: HttpClientResponse) -> Self {
        Self {
            status: reason_phrase(envelope.code),
            status_code: envelope.code,
            headers: to_header_map(envelope.headers),
            body: Bytes::from(envelope.body),
        }
    }
}

/// Canonical reason phrase for an HTTP status code; empty if unknown.
pub(crate) fn reason_phrase(code: i32) -> String {
    u16::try_from(code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

fn to_header_map(headers: HashMap<String, Header>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, header) in headers {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            warn!(header = %name, "Dropping response header with invalid name");
            continue;
        };
        for value in header.values {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    map.append(name.clone(), value);
                }
                Err(_) => warn!(header = %name, "Dropping invalid response header value"),
            }
        }
    }
    map
}

fn to_wire_headers(headers: &HeaderMap) -> HashMap<String, Header> {
    let mut wire: HashMap<String, Header> = HashMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            warn!(header = %name, "Dropping non-ASCII request header value");
            continue;
        };
        wire.entry(canonical_name(name.as_str()))
            .or_default()
            .values
            .push(value.to_string());
    }
    wire
}

// `content-type` goes out as `Content-Type`; host-side lookups are case
// sensitive.
fn canonical_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        canonical.push(if upper { c.to_ascii_uppercase() } else { c });
        upper = c == '-';
    }
    canonical
}

/// Configuration for [`HttpClient`].
#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    /// Namespace and host call settings.
    pub client: ClientConfig,
    /// Ask the host to skip TLS certificate verification.
    pub insecure_skip_verify: bool,
}

impl HttpConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client configuration.
    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Skip TLS certificate verification on the host side.
    pub fn with_insecure_skip_verify(mut self, insecure: bool) -> Self {
        self.insecure_skip_verify = insecure;
        self
    }
}

/// Operations offered by an HTTP client.
///
/// Implemented by [`HttpClient`] and by the
/// [`MockHttpClient`](crate::mock::MockHttpClient) double.
pub trait Http: Send + Sync {
    /// Send a GET request.
    fn get(&self, url: &str) -> HttpResult;

    /// Send a POST request with the given content type and body.
    fn post(&self, url: &str, content_type: &str, body: &mut dyn Read) -> HttpResult;

    /// Send a PUT request with the given content type and body.
    fn put(&self, url: &str, content_type: &str, body: &mut dyn Read) -> HttpResult;

    /// Send a DELETE request.
    fn delete(&self, url: &str) -> HttpResult;

    /// Send a prepared request.
    fn send(&self, request: Request) -> HttpResult;
}

/// Client for the host `httpclient` capability.
#[derive(Debug, Clone)]
pub struct HttpClient {
    binding: HostBinding,
    insecure: bool,
}

impl HttpClient {
    /// Create a client from the given configuration.
    pub fn new(config: &HttpConfig) -> Self {
        Self {
            binding: config.client.bind(),
            insecure: config.insecure_skip_verify,
        }
    }

    fn with_body(
        &self,
        method: &str,
        url: &str,
        content_type: &str,
        body: &mut dyn Read,
    ) -> HttpResult {
        let mut request = Request::new(method, url, body)?;
        if !content_type.is_empty() {
            let value = HeaderValue::from_str(content_type)
                .map_err(|_| HttpError::InvalidHeader(CONTENT_TYPE.to_string()))?;
            request.headers.insert(CONTENT_TYPE, value);
        }
        self.send(request)
    }
}

impl Capability for HttpClient {
    fn id(&self) -> CapabilityId {
        standard_ids::HTTPCLIENT
    }

    fn namespace(&self) -> &str {
        self.binding.namespace()
    }
}

impl Http for HttpClient {
    fn get(&self, url: &str) -> HttpResult {
        let request = Request::new("GET", url, io::empty())?;
        self.send(request)
    }

    fn post(&self, url: &str, content_type: &str, body: &mut dyn Read) -> HttpResult {
        self.with_body("POST", url, content_type, body)
    }

    fn put(&self, url: &str, content_type: &str, body: &mut dyn Read) -> HttpResult {
        self.with_body("PUT", url, content_type, body)
    }

    fn delete(&self, url: &str) -> HttpResult {
        let request = Request::new("DELETE", url, io::empty())?;
        self.send(request)
    }

    fn send(&self, request: Request) -> HttpResult {
        debug!(
            namespace = self.namespace(),
            method = %request.method,
            url = request.url.as_str(),
            len = request.body.len(),
            "httpclient call"
        );

        let wire = HttpClientRequest {
            method: request.method.as_str().to_string(),
            headers: to_wire_headers(&request.headers),
            url: request.url,
            body: request.body.to_vec(),
            insecure: self.insecure,
        };
        let outcome = self.binding.invoke::<_, HttpClientResponse>(
            self.id().as_str(),
            "call",
            &wire,
            POLICY,
        );
        settle(outcome, Response::from_envelope)
    }
}
