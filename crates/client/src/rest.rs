//! REST implementation of the record store
//!
//! Speaks the PostgREST-style protocol the backend service exposes:
//! upserts are `POST /rest/v1/{table}?on_conflict=...` with a
//! merge-duplicates preference, lookups are filtered `GET`s asking for a
//! single object. A zero-row lookup comes back as the `PGRST116` status
//! and is mapped to absence here, never surfaced as an error.
//!
//! No per-request timeout is configured; a hung request stalls its
//! submission until the transport gives up. The retry policy only bounds
//! attempts, not the duration of one attempt.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use budgetease_types::StoreError;

use crate::config::StoreConfig;
use crate::store::RecordStore;

/// Table used for reachability probes.
const PROBE_TABLE: &str = "pricing_votes";

/// PostgREST media type that returns a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// REST record store client
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestStore {
    /// Create a client from store configuration
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.anon_key)
                .map_err(|e| StoreError::transport(format!("invalid api key: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
                .map_err(|e| StoreError::transport(format!("invalid api key: {e}")))?,
        );
        headers.insert(
            "x-application-name",
            HeaderValue::from_str(&config.application_name)
                .map_err(|e| StoreError::transport(format!("invalid application name: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .user_agent("budgetease-client/0.1")
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::transport(format!("failed to build HTTP client: {e}")))?;

        debug!(base_url = %config.url, "initialized REST record store");

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn upsert(
        &self,
        table: &str,
        conflict_target: &str,
        row: Value,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.endpoint(table))
            .query(&[("on_conflict", conflict_target)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(read_error(status, response).await)
        }
    }

    async fn select_one(
        &self,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<Option<Value>, StoreError> {
        let mut query: Vec<(String, String)> = filters
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{value}")))
            .collect();
        query.push(("limit".to_string(), "1".to_string()));

        let response = self
            .client
            .get(self.endpoint(table))
            .query(&query)
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.is_success() {
            let row = response
                .json::<Value>()
                .await
                .map_err(|e| StoreError::transport(format!("failed to decode row: {e}")))?;
            return Ok(Some(row));
        }

        let err = read_error(status, response).await;
        if err.is_not_found() {
            Ok(None)
        } else {
            Err(err)
        }
    }

    async fn probe(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(self.endpoint(PROBE_TABLE))
            .query(&[("select", "count"), ("limit", "0")])
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(read_error(status, response).await)
        }
    }
}

/// Map a transport failure to a message the retry classifier recognizes.
/// The browser runtime produced `Failed to fetch` for opaque failures;
/// this keeps that contract.
fn map_transport(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::transport(format!("request timeout: {err}"))
    } else if err.is_connect() {
        StoreError::transport(format!("network unreachable: {err}"))
    } else {
        StoreError::transport("Failed to fetch")
    }
}

async fn read_error(status: StatusCode, response: Response) -> StoreError {
    let body = response.text().await.unwrap_or_default();
    parse_error_body(status.as_u16(), &body)
}

/// Build a [`StoreError`] from an error response
///
/// A structured body keeps its own code/message/details; anything else
/// collapses to the bare status digits, which is what lets the retry
/// classifier see 5xx responses.
fn parse_error_body(status: u16, body: &str) -> StoreError {
    #[derive(Deserialize)]
    struct WireError {
        code: Option<String>,
        message: Option<String>,
        details: Option<String>,
    }

    if let Ok(wire) = serde_json::from_str::<WireError>(body) {
        if let Some(message) = wire.message {
            return StoreError::new(wire.code, message, wire.details);
        }
    }

    StoreError::new(None, status.to_string(), None)
}
