//! Provider-agnostic contract for talking to the game server.
//!
//! This crate intentionally defines only the request/response shapes and the
//! [`GameBackend`] trait the orchestrator core consumes. It excludes transport
//! details (HTTP, cookies, retries) and all client-side state concerns.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Stable server-assigned identifier for one investigation.
pub type InvestigationId = i64;

/// Mapping of visible table name to its ordered column names.
///
/// An empty map is a valid response ("no visible tables").
pub type SchemaMap = BTreeMap<String, Vec<String>>;

/// Authoritative per-player state returned by `GET /api/state`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateSnapshot {
    pub name: String,
    pub remaining_time: f64,
    pub round: u32,
}

/// One investigation record from `GET /api/investigations`.
///
/// `solved` is server-authoritative; clients never flip it locally.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvestigationRecord {
    pub id: InvestigationId,
    pub prompt: String,
    pub solved: bool,
}

/// Request body for `POST /api/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyRequest {
    pub id: InvestigationId,
    pub answer: String,
}

/// Verify result. Additional response fields are ignored by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct VerifyOutcome {
    pub correct: bool,
}

/// Request body for `POST /api/query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub sql: String,
}

/// Outcome of one query execution.
///
/// The server reports SQL failures in-band as `{"error": ...}` with a 2xx
/// status, so a rejected query is a [`QueryOutcome::Failed`] value rather than
/// a [`BackendError`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows {
        columns: Vec<String>,
        rows: Vec<BTreeMap<String, Value>>,
    },
    Failed {
        message: String,
    },
}

impl QueryOutcome {
    /// Returns true when the query produced a (possibly empty) row set.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Rows { .. })
    }
}

/// Raw wire shape of the query response before in-band errors are split out.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub results: Option<Vec<BTreeMap<String, Value>>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<QueryResponse> for QueryOutcome {
    fn from(response: QueryResponse) -> Self {
        if let Some(message) = response.error {
            return Self::Failed { message };
        }

        Self::Rows {
            columns: response.columns.unwrap_or_default(),
            rows: response.results.unwrap_or_default(),
        }
    }
}

/// Failure talking to the server, classified by how the core must react.
///
/// `Status` is a well-formed non-2xx reply; on the state endpoint it means the
/// session is no longer recognized. `Transport` is a network-level failure and
/// never destroys client state on read paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("HTTP {code} from {endpoint}: {message}")]
    Status {
        endpoint: &'static str,
        code: u16,
        message: String,
    },

    #[error("transport failure reaching {endpoint}: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },

    #[error("failed to decode {endpoint} response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl BackendError {
    #[must_use]
    pub fn status(endpoint: &'static str, code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            endpoint,
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transport(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn decode(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint,
            message: message.into(),
        }
    }

    /// Returns true when this is a well-formed server rejection rather than a
    /// network-level failure.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// Server interface consumed by the orchestrator core.
///
/// Implementations are expected to be cheap to share behind an `Arc`; all
/// methods take `&self` and carry no client-visible state of their own.
#[async_trait]
pub trait GameBackend: Send + Sync {
    /// Fetches authoritative player state (name, remaining time, round).
    async fn fetch_state(&self) -> Result<StateSnapshot, BackendError>;

    /// Fetches the currently visible investigation set, in server order.
    async fn fetch_investigations(&self) -> Result<Vec<InvestigationRecord>, BackendError>;

    /// Fetches the visible table schema.
    async fn fetch_schema(&self) -> Result<SchemaMap, BackendError>;

    /// Submits one answer for verification.
    async fn verify(&self, request: VerifyRequest) -> Result<VerifyOutcome, BackendError>;

    /// Executes one SQL query against the game database.
    async fn run_query(&self, sql: &str) -> Result<QueryOutcome, BackendError>;

    /// Submits the final report. Terminal for the interaction; the core treats
    /// a successful submission as fire-and-forget.
    async fn submit_final_report(&self, answer: &str) -> Result<(), BackendError>;
}
