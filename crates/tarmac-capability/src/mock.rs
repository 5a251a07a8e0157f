//! In-memory client doubles.
//!
//! These stand in for whole clients rather than for the host call, for
//! code that takes a [`Kv`] or [`Http`] and does not care about the wire.

use std::io::{self, Read};

use bytes::Bytes;
use dashmap::DashMap;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use parking_lot::Mutex;
use tarmac_core::HostCallError;
use url::Url;

use crate::builtin::http::{Http, HttpError, HttpResult, Request, Response, reason_phrase};
use crate::builtin::kv::{Kv, KvError, KvResult};

/// Kind of KV operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KvOp {
    /// `get`
    Get,
    /// `set`
    Set,
    /// `delete`
    Delete,
    /// `keys`
    Keys,
}

/// A failure scripted into [`MemoryKv`].
#[derive(Debug, Clone)]
pub enum KvFault {
    /// Answer with [`KvError::InvalidKey`].
    InvalidKey,
    /// Answer with [`KvError::InvalidValue`].
    InvalidValue,
    /// Answer with [`KvError::KeyNotFound`].
    KeyNotFound,
    /// Answer with [`KvError::Host`].
    Host(HostCallError),
}

impl KvFault {
    fn into_error<T>(self, key: &str) -> KvError<T> {
        match self {
            KvFault::InvalidKey => KvError::InvalidKey,
            KvFault::InvalidValue => KvError::InvalidValue,
            KvFault::KeyNotFound => KvError::KeyNotFound(key.to_string()),
            KvFault::Host(error) => KvError::Host(error),
        }
    }
}

/// One operation recorded by [`MemoryKv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvCall {
    /// The operation.
    pub op: KvOp,
    /// The key, empty for `keys`.
    pub key: String,
    /// The value passed to `set`.
    pub value: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
struct Scripted {
    value: Option<Vec<u8>>,
    keys: Option<Vec<String>>,
    fault: Option<KvFault>,
    store_on_set: bool,
}

impl Default for Scripted {
    fn default() -> Self {
        Self {
            value: None,
            keys: None,
            fault: None,
            store_on_set: true,
        }
    }
}

/// An in-memory [`Kv`] with scriptable outcomes and call recording.
#[derive(Debug, Default)]
pub struct MemoryKv {
    store: DashMap<String, Vec<u8>>,
    scripted: DashMap<(KvOp, String), Scripted>,
    calls: Mutex<Vec<KvCall>>,
}

impl MemoryKv {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `seed`.
    pub fn with_seed<K, V>(seed: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let kv = Self::new();
        for (key, value) in seed {
            kv.store.insert(key.into(), value.into());
        }
        kv
    }

    /// Script the outcome of `get` for `key`.
    pub fn on_get(&self, key: &str) -> KvScript<'_> {
        self.on(KvOp::Get, key)
    }

    /// Script the outcome of `set` for `key`.
    pub fn on_set(&self, key: &str) -> KvScript<'_> {
        self.on(KvOp::Set, key)
    }

    /// Script the outcome of `delete` for `key`.
    pub fn on_delete(&self, key: &str) -> KvScript<'_> {
        self.on(KvOp::Delete, key)
    }

    /// Script the outcome of `keys`.
    pub fn on_keys(&self) -> KvScript<'_> {
        self.on(KvOp::Keys, "")
    }

    fn on(&self, op: KvOp, key: &str) -> KvScript<'_> {
        KvScript {
            kv: self,
            slot: (op, key.to_string()),
        }
    }

    /// Operations performed so far.
    pub fn calls(&self) -> Vec<KvCall> {
        self.calls.lock().clone()
    }

    fn record(&self, op: KvOp, key: &str, value: Option<&[u8]>) {
        self.calls.lock().push(KvCall {
            op,
            key: key.to_string(),
            value: value.map(<[u8]>::to_vec),
        });
    }

    fn scripted(&self, op: KvOp, key: &str) -> Option<Scripted> {
        self.scripted
            .get(&(op, key.to_string()))
            .map(|entry| entry.value().clone())
    }
}

/// Builder returned by the `on_*` methods of [`MemoryKv`].
#[derive(Debug)]
pub struct KvScript<'a> {
    kv: &'a MemoryKv,
    slot: (KvOp, String),
}

impl<'a> KvScript<'a> {
    fn update(self, f: impl FnOnce(&mut Scripted)) -> Self {
        {
            let mut entry = self.kv.scripted.entry(self.slot.clone()).or_default();
            f(entry.value_mut());
        }
        self
    }

    /// Value returned by `get`.
    pub fn return_value(self, value: impl Into<Vec<u8>>) -> Self {
        let value = value.into();
        self.update(|s| s.value = Some(value))
    }

    /// Keys returned by `keys`.
    pub fn return_keys<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        self.update(|s| s.keys = Some(keys))
    }

    /// Whether a scripted `set` still writes to the store. Defaults to true.
    pub fn store_on_set(self, store: bool) -> Self {
        self.update(|s| s.store_on_set = store)
    }

    /// Fail the operation.
    pub fn return_error(self, fault: KvFault) -> &'a MemoryKv {
        let kv = self.kv;
        self.update(|s| s.fault = Some(fault));
        kv
    }
}

impl Kv for MemoryKv {
    fn get(&self, key: &str) -> KvResult<Vec<u8>> {
        self.record(KvOp::Get, key, None);
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }
        if let Some(scripted) = self.scripted(KvOp::Get, key) {
            if let Some(fault) = scripted.fault {
                return Err(fault.into_error(key));
            }
            return Ok(scripted.value.unwrap_or_default());
        }
        self.store
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| KvError::KeyNotFound(key.to_string()))
    }

    fn set(&self, key: &str, value: Option<&[u8]>) -> KvResult<()> {
        self.record(KvOp::Set, key, value);
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }
        let Some(value) = value else {
            return Err(KvError::InvalidValue);
        };
        let store = match self.scripted(KvOp::Set, key) {
            Some(Scripted {
                fault: Some(fault), ..
            }) => return Err(fault.into_error(key)),
            Some(scripted) => scripted.store_on_set,
            None => true,
        };
        if store {
            self.store.insert(key.to_string(), value.to_vec());
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        self.record(KvOp::Delete, key, None);
        if key.is_empty() {
            return Err(KvError::InvalidKey);
        }
        if let Some(Scripted {
            fault: Some(fault), ..
        }) = self.scripted(KvOp::Delete, key)
        {
            return Err(fault.into_error(key));
        }
        self.store.remove(key);
        Ok(())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        self.record(KvOp::Keys, "", None);
        if let Some(scripted) = self.scripted(KvOp::Keys, "") {
            if let Some(fault) = scripted.fault {
                return Err(fault.into_error(""));
            }
            return Ok(scripted.keys.unwrap_or_default());
        }
        let mut keys: Vec<String> = self.store.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}

/// A scripted HTTP response for [`MockHttpClient`].
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status_code: i32,
    /// Status text.
    pub status: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status_code: 200,
            status: "OK".to_string(),
            headers: HeaderMap::new(),
            body: Bytes::from_static(br#"{"status":"success"}"#),
        }
    }
}

impl MockResponse {
    /// A response with the given code, its canonical text and `body`.
    pub fn new(status_code: i32, body: impl Into<Bytes>) -> Self {
        Self {
            status_code,
            status: reason_phrase(status_code),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    fn to_response(&self) -> Response {
        Response {
            status: self.status.clone(),
            status_code: self.status_code,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// One request recorded by [`MockHttpClient`].
#[derive(Debug, Clone)]
pub struct HttpCall {
    /// Request method.
    pub method: String,
    /// Request URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
}

#[derive(Debug, Clone)]
enum HttpScript {
    Respond(MockResponse),
    Fail(HostCallError),
}

/// An [`Http`] implementation that answers from scripted responses.
///
/// Requests are still validated like the real client; unmatched requests
/// get the default response.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    default_response: MockResponse,
    scripted: DashMap<(String, String), HttpScript>,
    calls: Mutex<Vec<HttpCall>>,
}

impl MockHttpClient {
    /// Create a mock answering `200 OK` by default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default response.
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = response;
        self
    }

    /// Answer `method url` with `response`.
    pub fn on(&self, method: &str, url: &str, response: MockResponse) -> &Self {
        self.scripted
            .insert(slot(method, url), HttpScript::Respond(response));
        self
    }

    /// Fail `method url` with a host error.
    pub fn fail(&self, method: &str, url: &str, error: HostCallError) -> &Self {
        self.scripted.insert(slot(method, url), HttpScript::Fail(error));
        self
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<HttpCall> {
        self.calls.lock().clone()
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
            request.headers_mut().insert(CONTENT_TYPE, value);
        }
        self.send(request)
    }
}

fn slot(method: &str, url: &str) -> (String, String) {
    let url = Url::parse(url)
        .map(String::from)
        .unwrap_or_else(|_| url.to_string());
    (method.to_string(), url)
}

impl Http for MockHttpClient {
    fn get(&self, url: &str) -> HttpResult {
        self.send(Request::new("GET", url, io::empty())?)
    }

    fn post(&self, url: &str, content_type: &str, body: &mut dyn Read) -> HttpResult {
        self.with_body("POST", url, content_type, body)
    }

    fn put(&self, url: &str, content_type: &str, body: &mut dyn Read) -> HttpResult {
        self.with_body("PUT", url, content_type, body)
    }

    fn delete(&self, url: &str) -> HttpResult {
        self.send(Request::new("DELETE", url, io::empty())?)
    }

    fn send(&self, request: Request) -> HttpResult {
        let key = (request.method().to_string(), request.parsed_url().to_string());
        self.calls.lock().push(HttpCall {
            method: key.0.clone(),
            url: request.url().to_string(),
            headers: request.headers().clone(),
            body: request.body().clone(),
        });

        let script = self.scripted.get(&key).map(|entry| entry.value().clone());
        match script {
            Some(HttpScript::Respond(response)) => Ok(response.to_response()),
            Some(HttpScript::Fail(error)) => Err(HttpError::Host(error)),
            None => Ok(self.default_response.to_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostErrorExt;
    use tarmac_core::TransportError;

    #[test]
    fn test_memory_kv_seed_and_round_trip() {
        let kv = MemoryKv::with_seed([("a", b"1".to_vec())]);
        assert_eq!(kv.get("a").unwrap(), b"1");

        kv.set("b", Some(b"2".as_slice())).unwrap();
        assert_eq!(kv.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        kv.delete("a").unwrap();
        kv.delete("a").unwrap();
        assert!(matches!(kv.get("a"), Err(KvError::KeyNotFound(_))));
    }

    #[test]
    fn test_memory_kv_validation() {
        let kv = MemoryKv::new();
        assert!(matches!(kv.get(""), Err(KvError::InvalidKey)));
        assert!(matches!(kv.set("k", None), Err(KvError::InvalidValue)));
        assert_eq!(kv.calls().len(), 2);
    }

    #[test]
    fn test_memory_kv_scripted_outcomes() {
        let kv = MemoryKv::new();
        kv.on_get("missing").return_error(KvFault::KeyNotFound);
        kv.on_set("bad")
            .return_error(KvFault::Host(HostCallError::from_transport(TransportError::new("reject"))));
        kv.on_keys().return_keys(["x", "y"]);
        kv.on_get("fixed").return_value(b"v".to_vec());
        kv.on_set("ghost").store_on_set(false);

        assert!(kv.get("missing").unwrap_err().is_not_found());
        assert!(kv.set("bad", Some(b"1".as_slice())).unwrap_err().is_transport());
        assert_eq!(kv.keys().unwrap(), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(kv.get("fixed").unwrap(), b"v");

        kv.set("ghost", Some(b"1".as_slice())).unwrap();
        kv.on_get("ghost").return_error(KvFault::KeyNotFound);
        assert!(kv.get("ghost").is_err());

        let calls = kv.calls();
        assert_eq!(calls[1].op, KvOp::Set);
        assert_eq!(calls[1].value.as_deref(), Some(b"1".as_slice()));
    }

    #[test]
    fn test_mock_http_default_and_scripted() {
        let http = MockHttpClient::new();
        http.on("GET", "https://example.com/api", MockResponse::new(201, "created"))
            .fail(
                "GET",
                "https://example.com/error",
                HostCallError::from_transport(TransportError::new("connection refused")),
            );

        let default = http.get("https://example.com/other").unwrap();
        assert_eq!(default.status_code, 200);
        assert_eq!(default.body, Bytes::from_static(br#"{"status":"success"}"#));

        let scripted = http.get("https://example.com/api").unwrap();
        assert_eq!(scripted.status_code, 201);
        assert_eq!(scripted.status, "Created");

        assert!(http.get("https://example.com/error").unwrap_err().is_transport());
        assert!(matches!(http.get("nope"), Err(HttpError::InvalidUrl(_))));
        assert_eq!(http.calls().len(), 3);
    }

    #[test]
    fn test_mock_http_records_body_and_content_type() {
        let http = MockHttpClient::new().with_default_response(MockResponse::new(202, ""));
        let resp = http
            .post("https://example.com/jobs", "application/json", &mut &b"{}"[..])
            .unwrap();
        assert_eq!(resp.status_code, 202);

        let call = &http.calls()[0];
        assert_eq!(call.method, "POST");
        assert_eq!(call.url, "https://example.com/jobs");
        assert_eq!(call.body, Bytes::from_static(b"{}"));
        assert_eq!(call.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_mock_http_matches_normalized_but_records_raw_url() {
        let http = MockHttpClient::new();
        http.on("GET", "https://example.com", MockResponse::new(204, ""));

        let resp = http.get("HTTPS://Example.COM/").unwrap();
        assert_eq!(resp.status_code, 204);
        assert_eq!(http.calls()[0].url, "HTTPS://Example.COM/");
    }
}
