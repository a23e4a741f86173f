use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope;
use crate::application::ports::{RemoteService, WriteOutcome};
use crate::domain::entities::QueueEntry;
use crate::domain::value_objects::{BearerToken, Operation, ResourcePath};
use crate::shared::config::ApiConfig;
use crate::shared::error::{AppError, Result};

/// Content type for partial updates.
const MERGE_PATCH: &str = "application/merge-patch+json";

/// HTTP client for the field-service API.
///
/// Holds the bearer token behind a lock so a login can swap it in while
/// the sync engine is already wired up. Every request fails with
/// `AppError::Auth` before touching the network when no token is set.
pub struct HttpRemoteService {
    client: Client,
    base_url: String,
    token: RwLock<Option<BearerToken>>,
}

impl HttpRemoteService {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn set_token(&self, token: Option<BearerToken>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    fn auth_header(&self) -> Result<String> {
        let slot = self
            .token
            .read()
            .map_err(|_| AppError::Internal("token lock poisoned".to_string()))?;
        match slot.as_ref() {
            Some(token) => Ok(token.header_value()),
            None => Err(AppError::Auth("no bearer token set".to_string())),
        }
    }

    fn url(&self, resource: &ResourcePath) -> String {
        format!("{}/{}", self.base_url, resource.as_str())
    }
}

fn method_for(operation: &Operation) -> Result<Method> {
    let verb = operation
        .http_method()
        .ok_or_else(|| AppError::Validation(format!("operation '{operation}' has no HTTP verb")))?;
    Ok(match verb {
        "POST" => Method::POST,
        "PATCH" => Method::PATCH,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        _ => Method::GET,
    })
}

/// Failure classification for reads. A read has no queue entry to keep or
/// discard, so a definitive 4xx maps to `Validation` (the request is
/// wrong) rather than `Transport` (the server is unreachable); only 408,
/// 429 and 5xx warrant a retry.
fn classify_fetch(status: StatusCode, resource: &str) -> Option<AppError> {
    if status.is_success() {
        return None;
    }
    if status == StatusCode::UNAUTHORIZED {
        return Some(AppError::Auth("server rejected credentials".to_string()));
    }
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        return Some(AppError::Transport(format!(
            "fetch of {resource} returned {status}"
        )));
    }
    Some(AppError::Validation(format!(
        "fetch of {resource} returned {status}"
    )))
}

/// Turn a write response into an outcome or an error.
///
/// - 2xx: applied; the canonical id is read from the response body.
/// - 401: auth error, the caller must halt and keep the entry.
/// - 408, 429, 5xx: transient, retryable later.
/// - any other 4xx: definitive rejection, surfaced with the server's message.
fn classify_write(status: StatusCode, body: &str) -> Result<WriteOutcome> {
    if status.is_success() {
        let canonical_id = serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(envelope::canonical_id);
        return Ok(WriteOutcome::Applied { canonical_id });
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::Auth("server rejected credentials".to_string()));
    }
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        return Err(AppError::Transport(format!("server returned {status}")));
    }
    Ok(WriteOutcome::Rejected {
        status: status.as_u16(),
        message: rejection_message(status, body),
    })
}

fn rejection_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "detail"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        format!("request rejected with {status}")
    } else {
        body.trim().to_string()
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn fetch_collection(&self, resource: &ResourcePath) -> Result<Vec<Value>> {
        let auth = self.auth_header()?;
        let url = self.url(resource);
        debug!(%url, "fetching collection");
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await?;
        if let Some(err) = classify_fetch(response.status(), resource.as_str()) {
            return Err(err);
        }
        let body: Value = response.json().await?;
        Ok(envelope::members(body))
    }

    async fn execute(&self, entry: &QueueEntry) -> Result<WriteOutcome> {
        let auth = self.auth_header()?;
        let method = method_for(&entry.operation)?;
        let url = self.url(&entry.resource);
        debug!(%url, operation = %entry.operation, "replaying queued mutation");

        let mut request = self
            .client
            .request(method, &url)
            .header(reqwest::header::AUTHORIZATION, auth);
        if !entry.operation.is_delete() {
            request = request.json(&entry.payload);
            if matches!(entry.operation, Operation::Update) {
                request = request.header(reqwest::header::CONTENT_TYPE, MERGE_PATCH);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let outcome = classify_write(status, &body)?;
        if let WriteOutcome::Rejected { status, message } = &outcome {
            warn!(status, message, resource = entry.resource.as_str(), "mutation rejected");
        }
        Ok(outcome)
    }
}
