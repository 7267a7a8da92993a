//! Authenticated JSON client for the Zarc backend.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::token::TokenStore;

/// Message used when an error response carries no usable `detail`.
pub const DEFAULT_ERROR_DETAIL: &str = "Something went wrong";

/// HTTP client that attaches the stored bearer token to every call.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("zarc-api/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        let tokens = TokenStore::new(config.token_path.clone());
        Ok(Self {
            config,
            http,
            tokens,
        })
    }

    /// Client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Send a JSON request to `endpoint` and decode the JSON answer.
    ///
    /// Non-2xx responses become [`ApiError::Status`] with the body's
    /// `detail` message.
    pub async fn fetch_json<B, T>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.url(endpoint);
        debug!(method = %method, url = %url, "api request");

        let mut request = self
            .http
            .request(method, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = self.tokens.load()? {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<Value>(&bytes)
                .map(|v| error_detail(&v))
                .unwrap_or_else(|_| DEFAULT_ERROR_DETAIL.to_string());
            warn!(url = %url, status = status.as_u16(), detail = %detail, "api request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.fetch_json::<Value, T>(Method::GET, endpoint, None).await
    }

    pub async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch_json(Method::POST, endpoint, Some(body)).await
    }
}

/// Human-readable message from an error body.
///
/// Accepts `{"detail": "..."}` and the list form validation errors use
/// (`{"detail": [{"msg": "..."}]}`).
pub fn error_detail(body: &Value) -> String {
    match body.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                DEFAULT_ERROR_DETAIL.to_string()
            } else {
                messages.join("; ")
            }
        }
        _ => DEFAULT_ERROR_DETAIL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_detail_string() {
        assert_eq!(
            error_detail(&json!({"detail": "Email already registered"})),
            "Email already registered"
        );
    }

    #[test]
    fn test_error_detail_validation_list() {
        let body = json!({"detail": [
            {"loc": ["body", "password"], "msg": "Password must contain at least one digit"},
            {"loc": ["body", "email"], "msg": "value is not a valid email address"}
        ]});
        assert_eq!(
            error_detail(&body),
            "Password must contain at least one digit; value is not a valid email address"
        );
    }

    #[test]
    fn test_error_detail_default() {
        assert_eq!(error_detail(&json!({})), DEFAULT_ERROR_DETAIL);
        assert_eq!(error_detail(&json!({"detail": ""})), DEFAULT_ERROR_DETAIL);
        assert_eq!(error_detail(&json!({"detail": 42})), DEFAULT_ERROR_DETAIL);
    }
}
