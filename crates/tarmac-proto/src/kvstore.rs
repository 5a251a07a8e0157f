//! Key-value store messages (`kvstore/{get,set,delete,keys}`).

use crate::Status;

/// Request for `kvstore/get`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KvStoreGet {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
}

/// Response for `kvstore/get`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KvStoreGetResponse {
    #[prost(message, optional, tag = "1")]
    pub status: ::core::option::Option<Status>,
    #[prost(bytes = "vec", tag = "2")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

/// Request for `kvstore/set`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KvStoreSet {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

/// Response for `kvstore/set`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KvStoreSetResponse {
    #[prost(message, optional, tag = "1")]
    pub status: ::core::option::Option<Status>,
}

/// Request for `kvstore/delete`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KvStoreDelete {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
}

/// Response for `kvstore/delete`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KvStoreDeleteResponse {
    #[prost(message, optional, tag = "1")]
    pub status: ::core::option::Option<Status>,
}

/// Request for `kvstore/keys`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KvStoreKeys {
    /// Ask the host for a protobuf encoded key list instead of JSON.
    #[prost(bool, tag = "1")]
    pub return_proto: bool,
}

/// Response for `kvstore/keys`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KvStoreKeysResponse {
    #[prost(message, optional, tag = "1")]
    pub status: ::core::option::Option<Status>,
    #[prost(string, repeated, tag = "2")]
    pub keys: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
