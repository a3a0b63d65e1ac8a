// LogDash - core/remote.rs
//
// Seams to the two remote collaborators. Implemented over HTTP by
// `platform::api::HttpApi`; tests substitute in-memory fakes.
//
// Calls are blocking. The dashboard runs them on background threads, so
// implementations must be shareable across threads.

use crate::core::model::{LogQuery, ResultPage, ScopeListing};
use crate::util::error::ApiError;

/// List-metadata lookup: clients, databases of a client, tables of a database.
pub trait ScopeDirectory: Send + Sync {
    /// Empty `client`/`database` ask for the top of the cascade.
    fn list_scope(&self, client: &str, database: &str) -> Result<ScopeListing, ApiError>;
}

/// Log query execution.
pub trait SearchGateway: Send + Sync {
    fn query_logs(&self, query: &LogQuery) -> Result<ResultPage, ApiError>;
}
