//! Outbound HTTP messages (`httpclient/call`).

use std::collections::HashMap;

use crate::Status;

/// Values of a single header name.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    #[prost(string, repeated, tag = "1")]
    pub values: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

/// Request for `httpclient/call`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpClient {
    #[prost(string, tag = "1")]
    pub method: ::prost::alloc::string::String,
    #[prost(map = "string, message", tag = "2")]
    pub headers: HashMap<::prost::alloc::string::String, Header>,
    #[prost(string, tag = "3")]
    pub url: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "4")]
    pub body: ::prost::alloc::vec::Vec<u8>,
    /// Skip TLS certificate verification on the host side.
    #[prost(bool, tag = "5")]
    pub insecure: bool,
}

/// Response for `httpclient/call`.
///
/// `status` describes the host call itself; `code` is the status code of the
/// HTTP exchange the host performed.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpClientResponse {
    #[prost(message, optional, tag = "1")]
    pub status: ::core::option::Option<Status>,
    #[prost(int32, tag = "2")]
    pub code: i32,
    #[prost(map = "string, message", tag = "3")]
    pub headers: HashMap<::prost::alloc::string::String, Header>,
    #[prost(bytes = "vec", tag = "4")]
    pub body: ::prost::alloc::vec::Vec<u8>,
}
