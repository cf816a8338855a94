use super::models::ErrorBody;
use crate::error::{Result, SyncError};
use serde::de::DeserializeOwned;

/// Pull a human-readable message out of an error body, preferring `detail`.
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Unknown error".to_string()
            } else {
                trimmed.to_string()
            }
        })
}

/// Turn a response into `T`, mapping non-2xx statuses to `SyncError::Api`.
pub async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = ensure_success(response).await?;
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(SyncError::from)
}

pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SyncError::Api {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

/// Auth endpoints treat every failure status as an authentication error.
pub fn into_auth_error(err: SyncError) -> SyncError {
    match err {
        SyncError::Api { status, message } => {
            SyncError::Auth(format!("status {}: {}", status, message))
        }
        other => other,
    }
}
