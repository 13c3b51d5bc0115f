//! Remote State Gateway
//!
//! One row per user in a PostgREST table (`user_id`, `payload`,
//! `updated_at`). Saves are full-row upserts; the last write wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::traits::RemoteStateGateway;
use crate::config::RemoteConfig;
use crate::domain::{DomainError, DomainResult, PersistedAppState, UserIdentity};

/// PostgREST code for "no rows" on a single-row request
pub const NO_ROW_ERROR_CODE: &str = "PGRST116";

/// Postgres `insufficient_privilege`, raised when row-level policy is missing
pub const ACCESS_DENIED_ERROR_CODE: &str = "42501";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The table or its access policy is missing; sync is unavailable
    #[error("remote state table unavailable: {0}")]
    SchemaAbsent(String),
    /// Network or server fault; local state stays authoritative
    #[error("remote sync failed: {0}")]
    Transient(String),
}

impl RemoteError {
    pub fn is_schema_absent(&self) -> bool {
        matches!(self, RemoteError::SchemaAbsent(_))
    }
}

/// True for errors meaning "the table or its policy does not exist"
pub fn is_table_or_policy_error(code: Option<&str>, message: &str) -> bool {
    if code == Some(ACCESS_DENIED_ERROR_CODE) {
        return true;
    }
    message.contains("relation")
        || message.contains("does not exist")
        || message.contains("permission denied")
}

pub fn classify_error(code: Option<&str>, message: impl Into<String>) -> RemoteError {
    let message = message.into();
    if is_table_or_policy_error(code, &message) {
        RemoteError::SchemaAbsent(message)
    } else {
        RemoteError::Transient(message)
    }
}

/// Error body returned by PostgREST
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PayloadRow {
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Serialize)]
struct StateRow<'a> {
    user_id: &'a str,
    payload: &'a PersistedAppState,
    updated_at: String,
}

/// Outcome of an unsuccessful response: either "no row" or a real error
enum Failure {
    NoRow,
    Error(RemoteError),
}

/// Supabase/PostgREST implementation of the gateway
pub struct SupabaseGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl SupabaseGateway {
    pub fn new(config: &RemoteConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorize(&self, request: reqwest::RequestBuilder, user: &UserIdentity) -> reqwest::RequestBuilder {
        let bearer = user.access_token.as_deref().unwrap_or(&self.api_key);
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    async fn failure(response: reqwest::Response) -> Failure {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: PostgrestError = serde_json::from_str(&text).unwrap_or_default();

        if body.code.as_deref() == Some(NO_ROW_ERROR_CODE) {
            return Failure::NoRow;
        }

        let message = body
            .message
            .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), text));
        Failure::Error(classify_error(body.code.as_deref(), message))
    }
}

fn network_error(e: reqwest::Error) -> RemoteError {
    RemoteError::Transient(e.to_string())
}

#[async_trait]
impl RemoteStateGateway for SupabaseGateway {
    async fn load(&self, user: &UserIdentity) -> Result<Option<Value>, RemoteError> {
        let request = self
            .client
            .get(self.endpoint())
            .query(&[
                ("user_id", format!("eq.{}", user.user_id)),
                ("select", "payload".to_string()),
            ]);

        let response = self
            .authorize(request, user)
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return match Self::failure(response).await {
                Failure::NoRow => Ok(None),
                Failure::Error(e) => Err(e),
            };
        }

        let rows: Vec<PayloadRow> = response
            .json()
            .await
            .map_err(|e| RemoteError::Transient(format!("unreadable response: {}", e)))?;

        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.payload)
            .filter(|payload| !payload.is_null()))
    }

    async fn save(&self, user: &UserIdentity, state: &PersistedAppState) -> Result<(), RemoteError> {
        let row = StateRow {
            user_id: &user.user_id,
            payload: state,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };

        let request = self
            .client
            .post(self.endpoint())
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row);

        let response = self
            .authorize(request, user)
            .send()
            .await
            .map_err(network_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        match Self::failure(response).await {
            Failure::NoRow => Ok(()),
            Failure::Error(e) => Err(e),
        }
    }
}

/// In-process gateway that keeps rows in a map and records every save
#[derive(Clone, Default)]
pub struct MemoryGateway {
    rows: Arc<Mutex<HashMap<String, Value>>>,
    saves: Arc<Mutex<Vec<(String, PersistedAppState)>>>,
    failure: Arc<Mutex<Option<RemoteError>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(self, user_id: &str, payload: Value) -> Self {
        if let Ok(mut rows) = self.rows.lock() {
            rows.insert(user_id.to_string(), payload);
        }
        self
    }

    /// Make every following call fail with `failure` (or succeed again with `None`)
    pub fn set_failure(&self, failure: Option<RemoteError>) {
        if let Ok(mut slot) = self.failure.lock() {
            *slot = failure;
        }
    }

    pub fn saves(&self) -> Vec<(String, PersistedAppState)> {
        self.saves.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn row(&self, user_id: &str) -> Option<Value> {
        self.rows.lock().ok().and_then(|rows| rows.get(user_id).cloned())
    }

    fn check(&self) -> Result<(), RemoteError> {
        match self.failure.lock() {
            Ok(slot) => slot.clone().map_or(Ok(()), Err),
            Err(_) => Err(RemoteError::Transient("gateway poisoned".to_string())),
        }
    }
}

#[async_trait]
impl RemoteStateGateway for MemoryGateway {
    async fn load(&self, user: &UserIdentity) -> Result<Option<Value>, RemoteError> {
        self.check()?;
        Ok(self.row(&user.user_id))
    }

    async fn save(&self, user: &UserIdentity, state: &PersistedAppState) -> Result<(), RemoteError> {
        self.check()?;
        let payload = serde_json::to_value(state)
            .map_err(|e| RemoteError::Transient(e.to_string()))?;
        if let Ok(mut rows) = self.rows.lock() {
            rows.insert(user.user_id.clone(), payload);
        }
        if let Ok(mut saves) = self.saves.lock() {
            saves.push((user.user_id.clone(), state.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_access_denied_code() {
        assert!(classify_error(Some("42501"), "new row violates policy").is_schema_absent());
    }

    #[test]
    fn test_classify_missing_relation_message() {
        let err = classify_error(None, "relation \"public.fridge_app_state\" does not exist");
        assert!(err.is_schema_absent());
    }

    #[test]
    fn test_classify_other_errors_as_transient() {
        let err = classify_error(Some("500"), "upstream timeout");
        assert_eq!(err, RemoteError::Transient("upstream timeout".to_string()));
    }
}
