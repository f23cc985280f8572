use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use game_backend::{
    BackendError, GameBackend, InvestigationRecord, QueryOutcome, QueryRequest, QueryResponse,
    SchemaMap, StateSnapshot, VerifyOutcome, VerifyRequest,
};

use crate::config::GameApiConfig;
use crate::error::parse_error_message;
use crate::url::join_endpoint;

const STATE_ENDPOINT: &str = "/api/state";
const INVESTIGATIONS_ENDPOINT: &str = "/api/investigations";
const SCHEMA_ENDPOINT: &str = "/api/schema";
const VERIFY_ENDPOINT: &str = "/api/verify";
const QUERY_ENDPOINT: &str = "/api/query";
const SUBMIT_ENDPOINT: &str = "/submit";

/// HTTP client for the game server.
///
/// Keeps a cookie jar because the server identifies the player session via a
/// cookie set at login; every request after that is otherwise stateless.
#[derive(Debug)]
pub struct HttpGameBackend {
    http: Client,
    config: GameApiConfig,
}

impl HttpGameBackend {
    pub fn new(config: GameApiConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let http = builder
            .build()
            .map_err(|error| BackendError::transport("client", error.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GameApiConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &'static str) -> Result<T, BackendError> {
        let url = join_endpoint(&self.config.base_url, path)?;
        tracing::debug!(endpoint = path, "issuing GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| BackendError::transport(path, error.to_string()))?;
        decode_json(path, require_success(path, response).await?).await
    }

    async fn post_json<T, B>(&self, path: &'static str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = join_endpoint(&self.config.base_url, path)?;
        tracing::debug!(endpoint = path, "issuing POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|error| BackendError::transport(path, error.to_string()))?;
        decode_json(path, require_success(path, response).await?).await
    }
}

#[async_trait]
impl GameBackend for HttpGameBackend {
    async fn fetch_state(&self) -> Result<StateSnapshot, BackendError> {
        self.get_json(STATE_ENDPOINT).await
    }

    async fn fetch_investigations(&self) -> Result<Vec<InvestigationRecord>, BackendError> {
        self.get_json(INVESTIGATIONS_ENDPOINT).await
    }

    async fn fetch_schema(&self) -> Result<SchemaMap, BackendError> {
        self.get_json(SCHEMA_ENDPOINT).await
    }

    async fn verify(&self, request: VerifyRequest) -> Result<VerifyOutcome, BackendError> {
        self.post_json(VERIFY_ENDPOINT, &request).await
    }

    async fn run_query(&self, sql: &str) -> Result<QueryOutcome, BackendError> {
        let response: QueryResponse = self
            .post_json(
                QUERY_ENDPOINT,
                &QueryRequest {
                    sql: sql.to_string(),
                },
            )
            .await?;
        Ok(response.into())
    }

    async fn submit_final_report(&self, answer: &str) -> Result<(), BackendError> {
        // The final report is a form submission, not a JSON API call; the
        // response body is an HTML results page the core does not consume.
        let url = join_endpoint(&self.config.base_url, SUBMIT_ENDPOINT)?;
        tracing::debug!(endpoint = SUBMIT_ENDPOINT, "submitting final report");
        let response = self
            .http
            .post(url)
            .form(&[("final_answer", answer)])
            .send()
            .await
            .map_err(|error| BackendError::transport(SUBMIT_ENDPOINT, error.to_string()))?;
        require_success(SUBMIT_ENDPOINT, response).await?;
        Ok(())
    }
}

async fn require_success(
    path: &'static str,
    response: Response,
) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(status, &body);
    tracing::warn!(
        endpoint = path,
        code = status.as_u16(),
        %message,
        "game server rejected request"
    );
    Err(BackendError::status(path, status.as_u16(), message))
}

async fn decode_json<T: DeserializeOwned>(
    path: &'static str,
    response: Response,
) -> Result<T, BackendError> {
    let body = response
        .text()
        .await
        .map_err(|error| BackendError::transport(path, error.to_string()))?;
    serde_json::from_str(&body).map_err(|error| BackendError::decode(path, error.to_string()))
}
