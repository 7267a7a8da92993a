//! Zarc API client
//!
//! JSON calls against the Zarc backend with a persisted bearer token, plus
//! the account sign-up and sign-in flows.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod token;

pub use auth::{SignInRequest, SignUpRequest, TokenResponse, UserResponse};
pub use client::{error_detail, ApiClient, DEFAULT_ERROR_DETAIL};
pub use config::{ApiConfig, DEFAULT_API_URL, DEFAULT_TOKEN_PATH};
pub use error::{ApiError, Result};
pub use token::TokenStore;

pub use reqwest::Method;
