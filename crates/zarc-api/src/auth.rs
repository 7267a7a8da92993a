//! Account sign-up and sign-in.
//!
//! Both calls return an access token which is persisted to the client's
//! [`TokenStore`](crate::TokenStore) so later requests are authenticated.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};

pub const SIGNUP_ENDPOINT: &str = "/api/auth/signup";
pub const SIGNIN_ENDPOINT: &str = "/api/auth/signin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl SignUpRequest {
    pub fn new(email: &str, username: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            username: username.trim().to_string(),
            password: password.to_string(),
            first_name: None,
            last_name: None,
            company: None,
            industry: None,
        }
    }

    /// Local checks matching the server's account rules.
    pub fn validate(&self) -> Result<()> {
        if !self.email.contains('@') {
            return Err(ApiError::Invalid("email address is not valid".to_string()));
        }
        let len = self.username.chars().count();
        if !(3..=50).contains(&len) {
            return Err(ApiError::Invalid(
                "username must be 3 to 50 characters".to_string(),
            ));
        }
        if !username_pattern().is_match(&self.username) {
            return Err(ApiError::Invalid(
                "username can only contain letters, numbers, underscores, and hyphens".to_string(),
            ));
        }
        let len = self.password.chars().count();
        if !(8..=72).contains(&len) {
            return Err(ApiError::Invalid(
                "password must be 8 to 72 characters".to_string(),
            ));
        }
        let rules = [
            (self.password.chars().any(|c| c.is_ascii_uppercase()), "uppercase letter"),
            (self.password.chars().any(|c| c.is_ascii_lowercase()), "lowercase letter"),
            (self.password.chars().any(|c| c.is_ascii_digit()), "digit"),
        ];
        if let Some((_, missing)) = rules.into_iter().find(|(ok, _)| !ok) {
            return Err(ApiError::Invalid(format!(
                "password must contain at least one {missing}"
            )));
        }
        Ok(())
    }
}

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid username pattern"))
}

/// `email` may also be a username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Server timestamp, kept verbatim.
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserResponse,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl ApiClient {
    /// Create an account and keep its token.
    pub async fn signup(&self, request: &SignUpRequest) -> Result<TokenResponse> {
        request.validate()?;
        let response: TokenResponse = self.post_json(SIGNUP_ENDPOINT, request).await?;
        self.tokens().save(&response.access_token)?;
        info!(event = "auth.signed_up", user_id = response.user.id, username = %response.user.username);
        Ok(response)
    }

    /// Sign in and keep the token.
    pub async fn signin(&self, request: &SignInRequest) -> Result<TokenResponse> {
        let response: TokenResponse = self.post_json(SIGNIN_ENDPOINT, request).await?;
        self.tokens().save(&response.access_token)?;
        info!(event = "auth.signed_in", user_id = response.user.id, username = %response.user.username);
        Ok(response)
    }

    /// Drop the stored token.
    pub fn signout(&self) -> Result<()> {
        self.tokens().clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_signup() {
        SignUpRequest::new("ana@zarc.dev", "ana_m", "Secret123").validate().unwrap();
    }

    #[test]
    fn test_username_rules() {
        let err = SignUpRequest::new("ana@zarc.dev", "an", "Secret123").validate().unwrap_err();
        assert!(err.to_string().contains("3 to 50"));
        let err = SignUpRequest::new("ana@zarc.dev", "ana m", "Secret123").validate().unwrap_err();
        assert!(err.to_string().contains("letters, numbers"));
    }

    #[test]
    fn test_password_rules() {
        let cases = [
            ("short1A", "8 to 72"),
            ("secret123", "uppercase letter"),
            ("SECRET123", "lowercase letter"),
            ("SecretPass", "digit"),
        ];
        for (password, expected) in cases {
            let err = SignUpRequest::new("ana@zarc.dev", "ana", password)
                .validate()
                .unwrap_err();
            assert!(err.to_string().contains(expected), "{password}: {err}");
        }
    }

    #[test]
    fn test_signup_body_omits_empty_profile_fields() {
        let body = serde_json::to_value(SignUpRequest::new("a@b.co", "abc", "Secret123")).unwrap();
        assert_eq!(body.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_token_response_defaults_type() {
        let parsed: TokenResponse = serde_json::from_str(
            r#"{"access_token":"t","user":{"id":1,"email":"a@b.co","username":"abc","created_at":"2024-10-14T09:30:00"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.token_type, "bearer");
        assert_eq!(parsed.user.first_name, None);
    }
}
