//! SQL messages (`sql/{exec,query}`).

use crate::Status;

/// Request for `sql/exec`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SqlExec {
    #[prost(bytes = "vec", tag = "1")]
    pub query: ::prost::alloc::vec::Vec<u8>,
}

/// Response for `sql/exec`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SqlExecResponse {
    #[prost(message, optional, tag = "1")]
    pub status: ::core::option::Option<Status>,
    #[prost(int64, tag = "2")]
    pub last_insert_id: i64,
    #[prost(int64, tag = "3")]
    pub rows_affected: i64,
}

/// Request for `sql/query`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SqlQuery {
    #[prost(bytes = "vec", tag = "1")]
    pub query: ::prost::alloc::vec::Vec<u8>,
}

/// Response for `sql/query`.
///
/// `data` holds the rows as a JSON array of objects keyed by column name.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SqlQueryResponse {
    #[prost(message, optional, tag = "1")]
    pub status: ::core::option::Option<Status>,
    #[prost(string, repeated, tag = "2")]
    pub columns: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(bytes = "vec", tag = "3")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}
