//! Token-auth endpoints (`/auth/token/*`, `/auth/users/*`).
//!
//! This module only speaks HTTP. Persisting the issued token and caching the
//! current user belong to [`crate::session::AuthSession`].

use super::types::{LoginPayload, LoginResponse, RegisterPayload, UpdateMe, User};
use super::{ApiError, backend_message, decode, describe_failure, discard, fetch, json_body};
use crate::net::{HttpClient, RequestOptions, TokenChoice};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const PROFILE_UPDATE_FAILED: &str = "Profile update failed";

const LOGIN_PATH: &str = "/auth/token/login/";
const LOGOUT_PATH: &str = "/auth/token/logout/";
const USERS_PATH: &str = "/auth/users/";
const ME_PATH: &str = "/auth/users/me/";

pub struct AuthApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AuthApi<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Exchange credentials for a token. Sent without any stored token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the response is not 2xx or carries
    /// no `auth_token`; the message is `detail`, else the first
    /// `non_field_errors` entry, else [`LOGIN_FAILED`].
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let body = json_body(&LoginPayload { username, password })?;
        let response = self.http.request(LOGIN_PATH, RequestOptions::post().anonymous().json(body)).await?;

        if response.ok {
            let token = response
                .data
                .as_json()
                .and_then(|value| serde_json::from_value::<LoginResponse>(value.clone()).ok())
                .map(|login| login.auth_token)
                .filter(|token| !token.is_empty());
            if let Some(token) = token {
                return Ok(token);
            }
        }
        Err(ApiError::Rejected(backend_message(&response.data).unwrap_or_else(|| LOGIN_FAILED.to_owned())))
    }

    /// Invalidate the token on the server.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure or non-2xx.
    pub async fn logout(&self, token: TokenChoice) -> Result<(), ApiError> {
        discard(self.http, LOGOUT_PATH, RequestOptions::post().token(token)).await
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's validation message.
    pub async fn register(&self, username: &str, password: &str, re_password: &str) -> Result<User, ApiError> {
        let body = json_body(&RegisterPayload { username, password, re_password })?;
        let response = self.http.request(USERS_PATH, RequestOptions::post().anonymous().json(body)).await?;
        if !response.ok {
            return Err(ApiError::Rejected(describe_failure(&response.data, REGISTRATION_FAILED)));
        }
        decode(response)
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on network failure, non-2xx (e.g. an expired
    /// token), or an unexpected body.
    pub async fn fetch_me(&self) -> Result<User, ApiError> {
        fetch(self.http, ME_PATH, RequestOptions::get()).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's validation message.
    pub async fn update_me(&self, payload: &UpdateMe) -> Result<User, ApiError> {
        let response = self.http.request(ME_PATH, RequestOptions::patch().json(json_body(payload)?)).await?;
        if !response.ok {
            return Err(ApiError::Rejected(describe_failure(&response.data, PROFILE_UPDATE_FAILED)));
        }
        decode(response)
    }
}
