//! HTTP transport for the sync API.

use std::future::Future;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use super::{SyncError, SyncTransport};
use crate::protocol::{
    FullSyncRequest, FullSyncResponse, PullRequest, PullResponse, PushRequest, PushResponse,
};

/// Bearer-authenticated JSON client for a Slate server.
#[derive(Clone)]
pub struct HttpSyncClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpSyncClient {
    /// Create a client for the given base URL and optional bearer token.
    ///
    /// A missing token is not an error here: the coordinator treats an
    /// unauthenticated transport as "skip this cycle".
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, SyncError> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
            client: reqwest::Client::builder().build()?,
        })
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, SyncError> {
        let token = self.token.as_deref().ok_or(SyncError::Unauthenticated)?;

        let response = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SyncError::Unauthenticated);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Api(parse_api_error(status, &body)));
        }

        Ok(response.json::<R>().await?)
    }
}

impl SyncTransport for HttpSyncClient {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn push(
        &self,
        request: PushRequest,
    ) -> impl Future<Output = Result<PushResponse, SyncError>> + Send {
        async move { self.post_json("v1/sync/push", &request).await }
    }

    fn pull(
        &self,
        request: PullRequest,
    ) -> impl Future<Output = Result<PullResponse, SyncError>> + Send {
        async move { self.post_json("v1/sync/pull", &request).await }
    }

    fn full_sync(
        &self,
        request: FullSyncRequest,
    ) -> impl Future<Output = Result<FullSyncResponse, SyncError>> + Send {
        async move { self.post_json("v1/sync/full", &request).await }
    }
}

/// Connection-level failures mean "offline, retry next tick"; everything
/// else is a real transport fault.
fn classify_request_error(error: reqwest::Error) -> SyncError {
    if error.is_connect() || error.is_timeout() {
        SyncError::Offline(error.to_string())
    } else {
        SyncError::Http(error)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String, SyncError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SyncError::InvalidConfiguration(
            "server URL must not be empty".to_string(),
        ));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(SyncError::InvalidConfiguration(
            "server URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url(String::new()).is_err());
        assert!(normalize_base_url("api.example.com".to_string()).is_err());
    }

    #[test]
    fn test_normalize_base_url_trims_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://api.example.com/".to_string()).unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_blank_token_counts_as_unauthenticated() {
        let client = HttpSyncClient::new("https://api.example.com", Some("   ".to_string()))
            .unwrap();
        assert!(!client.is_authenticated());

        let client =
            HttpSyncClient::new("https://api.example.com", Some("token".to_string())).unwrap();
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_requests_without_token_fail_before_sending() {
        let client = HttpSyncClient::new("https://api.example.com", None).unwrap();
        let result = client.pull(PullRequest::default()).await;
        assert!(matches!(result, Err(SyncError::Unauthenticated)));
    }

    #[test]
    fn test_parse_api_error_prefers_structured_message() {
        let message = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Invalid request: bad cursor"}"#,
        );
        assert_eq!(message, "Invalid request: bad cursor (400)");

        let fallback = parse_api_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(fallback, "HTTP 502");
    }
}
