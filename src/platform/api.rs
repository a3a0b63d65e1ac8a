// LogDash - platform/api.rs
//
// Blocking HTTP client for the log query API. Implements both remote seams:
//   GET  {root}/listData?client=..&db=..   -> ScopeListing
//   POST {root}/logs  (LogQuery as JSON)   -> ResultPage
//
// Errors are classified at this boundary: send/read failures and non-2xx
// statuses are transport failures, malformed bodies are decode failures.
// No retries; a failed call is terminal for that one operation.

use crate::core::model::{LogQuery, LogQueryResponse, ResultPage, ScopeListing};
use crate::core::remote::{ScopeDirectory, SearchGateway};
use crate::util::constants::{LIST_DATA_PATH, LOGS_PATH, MAX_ERROR_BODY_PREVIEW};
use crate::util::error::ApiError;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use std::time::Duration;

/// HTTP implementation of [`ScopeDirectory`] and [`SearchGateway`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    root: String,
}

impl HttpApi {
    /// Build a client for the API rooted at `root` (e.g. `http://host:7160/api`).
    pub fn new(root: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(root).map_err(|e| ApiError::InvalidRoot {
            root: root.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidRoot {
                root: root.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                endpoint: "client setup",
                source: e,
            })?;

        tracing::debug!(root, timeout_secs = timeout.as_secs(), "API client created");

        Ok(Self {
            client,
            root: root.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    /// Send a request and return the body text of a 2xx response.
    fn execute(&self, endpoint: &'static str, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .send()
            .map_err(|e| ApiError::Transport { endpoint, source: e })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ApiError::Transport { endpoint, source: e })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_PREVIEW).collect(),
            });
        }

        Ok(body)
    }
}

impl ScopeDirectory for HttpApi {
    fn list_scope(&self, client: &str, database: &str) -> Result<ScopeListing, ApiError> {
        let request = self
            .client
            .get(self.url(LIST_DATA_PATH))
            .query(&[("client", client), ("db", database)]);

        let body = self.execute(LIST_DATA_PATH, request)?;
        let listing: ScopeListing =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode {
                endpoint: LIST_DATA_PATH,
                source: e,
            })?;

        tracing::debug!(
            client,
            database,
            clients = listing.clients.len(),
            databases = listing.databases.len(),
            tables = listing.tables.len(),
            "Scope listing received"
        );
        Ok(listing)
    }
}

impl SearchGateway for HttpApi {
    fn query_logs(&self, query: &LogQuery) -> Result<ResultPage, ApiError> {
        let request = self.client.post(self.url(LOGS_PATH)).json(query);

        let body = self.execute(LOGS_PATH, request)?;
        let response: LogQueryResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode {
                endpoint: LOGS_PATH,
                source: e,
            })?;

        if let Some(message) = response.message.as_deref().filter(|m| !m.is_empty()) {
            return Err(ApiError::Rejected {
                endpoint: LOGS_PATH,
                message: message.to_string(),
            });
        }

        let page = ResultPage::from(response);
        tracing::debug!(
            db = %query.db_name,
            table = %query.table_name,
            page = query.page_index,
            entries = page.entries.len(),
            total = page.total,
            "Log page received"
        );
        Ok(page)
    }
}
