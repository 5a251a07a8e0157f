//! SQL client.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tarmac_core::{ClientConfig, HostBinding, HostCallError, TransportPolicy};
use tarmac_proto::sql::{SqlExec, SqlExecResponse, SqlQuery, SqlQueryResponse};
use thiserror::Error;
use tracing::debug;

use crate::capability::{Capability, CapabilityId, standard_ids};
use crate::error::{HostErrorExt, PartialError, settle};

const POLICY: TransportPolicy = TransportPolicy::HonorStatus;

/// Errors returned by the SQL client. `T` is the value carried on partial
/// success.
#[derive(Debug, Error)]
pub enum SqlError<T = ()> {
    /// The query was blank.
    #[error("query is invalid: query must not be blank")]
    InvalidQuery,

    /// The host call failed.
    #[error(transparent)]
    Host(#[from] HostCallError),

    /// The host returned a result but reported it as partial.
    #[error("{error}")]
    Partial {
        /// The partial result.
        value: T,
        /// Why the result is partial.
        #[source]
        error: HostCallError,
    },
}

impl<T> SqlError<T> {
    /// The partial result, if the host returned one.
    pub fn partial_value(&self) -> Option<&T> {
        match self {
            Self::Partial { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Take the partial result and its error.
    pub fn into_partial(self) -> Option<(T, HostCallError)> {
        match self {
            Self::Partial { value, error } => Some((value, error)),
            _ => None,
        }
    }
}

impl<T> HostErrorExt for SqlError<T> {
    fn host_error(&self) -> Option<&HostCallError> {
        match self {
            Self::Host(error) | Self::Partial { error, .. } => Some(error),
            Self::InvalidQuery => None,
        }
    }
}

impl<T> PartialError<T> for SqlError<T> {
    fn partial(value: T, error: HostCallError) -> Self {
        Self::Partial { value, error }
    }
}

/// Result type for SQL operations.
pub type SqlResult<T> = Result<T, SqlError<T>>;

/// Outcome of a statement that modifies data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Id of the last inserted row, if the database reports one.
    pub last_insert_id: i64,
    /// Number of rows changed.
    pub rows_affected: i64,
}

/// Rows returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names in select order.
    pub columns: Vec<String>,
    /// Rows as a JSON array of objects keyed by column name.
    pub data: Vec<u8>,
}

impl QueryResult {
    /// Deserialize the rows into `T`.
    pub fn rows<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        if self.data.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&self.data)
    }

    /// The rows as JSON objects.
    pub fn records(&self) -> Result<Vec<Map<String, Value>>, serde_json::Error> {
        self.rows()
    }
}

/// Client for the host `sql` capability.
#[derive(Debug, Clone)]
pub struct SqlClient {
    binding: HostBinding,
}

impl SqlClient {
    /// Create a client from the given configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            binding: config.bind(),
        }
    }

    /// Run a statement that does not return rows.
    pub fn exec(&self, query: &str) -> SqlResult<ExecResult> {
        if query.trim().is_empty() {
            return Err(SqlError::InvalidQuery);
        }
        debug!(namespace = self.namespace(), len = query.len(), "sql exec");

        let request = SqlExec {
            query: query.as_bytes().to_vec(),
        };
        let outcome = self.binding.invoke::<_, SqlExecResponse>(
            self.id().as_str(),
            "exec",
            &request,
            POLICY,
        );
        settle(outcome, |response| ExecResult {
            last_insert_id: response.last_insert_id,
            rows_affected: response.rows_affected,
        })
    }

    /// Run a query that returns rows.
    pub fn query(&self, query: &str) -> SqlResult<QueryResult> {
        if query.trim().is_empty() {
            return Err(SqlError::InvalidQuery);
        }
        debug!(namespace = self.namespace(), len = query.len(), "sql query");

        let request = SqlQuery {
            query: query.as_bytes().to_vec(),
        };
        let outcome = self.binding.invoke::<_, SqlQueryResponse>(
            self.id().as_str(),
            "query",
            &request,
            POLICY,
        );
        settle(outcome, |response| QueryResult {
            columns: response.columns,
            data: response.data,
        })
    }
}

impl Capability for SqlClient {
    fn id(&self) -> CapabilityId {
        standard_ids::SQL
    }

    fn namespace(&self) -> &str {
        self.binding.namespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use serde::Deserialize;
    use tarmac_hostmock::MockHost;
    use tarmac_proto::Status;

    fn client(mock: &MockHost) -> SqlClient {
        SqlClient::new(&ClientConfig::new().with_host_call(mock.clone()))
    }

    fn exec_response(code: i32) -> Vec<u8> {
        SqlExecResponse {
            status: Some(Status::new(code, "status")),
            last_insert_id: 7,
            rows_affected: 3,
        }
        .encode_to_vec()
    }

    fn query_response(code: i32) -> Vec<u8> {
        SqlQueryResponse {
            status: Some(Status::new(code, "status")),
            columns: vec!["id".to_string(), "name".to_string()],
            data: br#"[{"id":1,"name":"ada"},{"id":2,"name":"grace"}]"#.to_vec(),
        }
        .encode_to_vec()
    }

    #[test]
    fn test_blank_query_never_calls_host() {
        let mock = MockHost::new("default", "sql", "exec");
        let sql = client(&mock);

        for query in ["", "   ", "\n\t"] {
            assert!(matches!(sql.exec(query), Err(SqlError::InvalidQuery)));
            assert!(matches!(sql.query(query), Err(SqlError::InvalidQuery)));
        }
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_exec_success() {
        let mock = MockHost::new("default", "sql", "exec")
            .with_payload_validator(|payload| {
                let request = SqlExec::decode(payload).map_err(|e| e.to_string())?;
                (request.query == b"DELETE FROM users")
                    .then_some(())
                    .ok_or_else(|| "unexpected query".to_string())
            })
            .with_response(exec_response(200));

        let result = client(&mock).exec("DELETE FROM users").unwrap();
        assert_eq!(
            result,
            ExecResult {
                last_insert_id: 7,
                rows_affected: 3
            }
        );
    }

    #[test]
    fn test_query_rows() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: i64,
            name: String,
        }

        let mock = MockHost::new("default", "sql", "query").with_response(query_response(200));
        let result = client(&mock).query("SELECT id, name FROM users").unwrap();
        assert_eq!(result.columns, vec!["id", "name"]);

        let users: Vec<User> = result.rows().unwrap();
        assert_eq!(
            users,
            vec![
                User { id: 1, name: "ada".into() },
                User { id: 2, name: "grace".into() },
            ]
        );
        assert_eq!(result.records().unwrap()[1]["name"], "grace");
    }

    #[test]
    fn test_empty_rows() {
        let result = QueryResult::default();
        assert!(result.records().unwrap().is_empty());
    }

    #[test]
    fn test_partial_exec_returns_result() {
        let mock = MockHost::new("default", "sql", "exec").with_response(exec_response(206));
        let error = client(&mock).exec("UPDATE t SET a = 1").unwrap_err();
        assert!(error.is_partial());
        assert!(!error.is_transport());
        let (value, cause) = error.into_partial().unwrap();
        assert_eq!(value.rows_affected, 3);
        assert_eq!(cause.status_code(), Some(206));
    }

    #[test]
    fn test_partial_query_with_transport_error() {
        let mock = MockHost::new("default", "sql", "query")
            .with_response(query_response(206))
            .with_transport_error("stream interrupted");
        let error = client(&mock).query("SELECT 1").unwrap_err();
        assert!(error.is_partial());
        assert!(error.is_transport());
        assert_eq!(error.partial_value().unwrap().columns.len(), 2);
    }

    // Unlike KV, a decodable success outlives a transport error here.
    #[test]
    fn test_transport_asymmetry_sql_honors_success_status() {
        let mock = MockHost::new("default", "sql", "exec")
            .with_response(exec_response(200))
            .with_transport_error("late");
        let result = client(&mock).exec("INSERT INTO t VALUES (1)").unwrap();
        assert_eq!(result.last_insert_id, 7);
    }

    #[test]
    fn test_transport_failure_without_payload() {
        let mock = MockHost::new("default", "sql", "query").failing("host unreachable");
        let error = client(&mock).query("SELECT 1").unwrap_err();
        assert!(matches!(error, SqlError::Host(_)));
        assert!(error.is_transport());
        assert!(!error.is_decode());
        assert!(!error.is_partial());
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_host_error_statuses() {
        struct Case {
            code: i32,
            not_found: bool,
        }

        let cases = [
            Case { code: 400, not_found: false },
            Case { code: 404, not_found: true },
            Case { code: 500, not_found: false },
        ];

        for case in cases {
            let mock = MockHost::new("default", "sql", "exec").with_response(exec_response(case.code));
            let error = client(&mock).exec("SELECT 1").unwrap_err();
            assert!(matches!(error, SqlError::Host(_)), "code {}", case.code);
            assert_eq!(error.is_not_found(), case.not_found, "code {}", case.code);
            assert_eq!(error.status_code(), Some(case.code));
        }
    }

    #[test]
    fn test_error_status_with_transport_error_keeps_both_causes() {
        let mock = MockHost::new("default", "sql", "exec")
            .with_response(exec_response(500))
            .with_transport_error("boom");
        let error = client(&mock).exec("SELECT 1").unwrap_err();
        assert!(error.is_transport());
        assert_eq!(error.status_code(), Some(500));
        let host = error.host_error().unwrap();
        assert_eq!(host.causes().len(), 2);
    }

    #[test]
    fn test_unknown_status_is_invalid_response() {
        let mock = MockHost::new("default", "sql", "query").with_response(query_response(999));
        let error = client(&mock).query("SELECT 1").unwrap_err();
        assert!(error.is_response_invalid());
    }

    #[test]
    fn test_undecodable_response() {
        let mock = MockHost::new("default", "sql", "query").with_response(vec![0x0a, 0xff]);
        let error = client(&mock).query("SELECT 1").unwrap_err();
        assert!(error.is_decode());
    }
}
