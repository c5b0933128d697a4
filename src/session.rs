//! Authentication session: the token and the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Sits between the [`TokenStore`](crate::token_store::TokenStore) (which
//! survives restarts) and [`AuthApi`] (which only speaks HTTP). The route
//! guard reads [`AuthSession::is_authenticated`] and calls
//! [`AuthSession::init_user`] when a token was restored without a user.
//!
//! DESIGN
//! ======
//! `token` mirrors the store: it is written to the store first and to the
//! session second, and both are cleared together. `user` is only ever set from
//! a successful `/auth/users/me/` response.
//!
//! ERROR HANDLING
//! ==============
//! `login` and `register` leave state untouched on failure. `logout` always
//! clears local state, then reports the remote failure if there was one.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::api::types::{UpdateMe, User};
use crate::api::{ApiError, AuthApi};
use crate::net::{HttpClient, TokenChoice};

#[derive(Debug)]
pub struct AuthSession {
    http: HttpClient,
    token: Option<String>,
    user: Option<User>,
}

impl AuthSession {
    /// Start a session, restoring any token left in the store.
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        let token = http.token_store().get();
        Self { http, token, user: None }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.http)
    }

    /// Re-read the stored token and load the matching user.
    ///
    /// With no stored token the user is cleared and no request is made.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] from `/auth/users/me/`; the user is cleared
    /// but the token is kept.
    pub async fn init_user(&mut self) -> Result<(), ApiError> {
        self.token = self.http.token_store().get();
        if self.token.is_none() {
            self.user = None;
            return Ok(());
        }

        match self.auth().fetch_me().await {
            Ok(user) => {
                tracing::debug!(username = %user.username, "user loaded");
                self.user = Some(user);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not load current user");
                self.user = None;
                Err(e)
            }
        }
    }

    /// Log in, persist the token, and load the user.
    ///
    /// Once the credentials are accepted the session is logged in; a failed
    /// user load is logged and leaves `user` empty for the guard to retry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's message when the
    /// credentials are refused (state unchanged), or [`ApiError::Store`] when
    /// the token cannot be persisted.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        let token = self.auth().login(username, password).await?;
        self.http.token_store().set(Some(&token))?;
        self.token = Some(token);
        tracing::info!(%username, "logged in");
        // init_user already logs the failure
        let _ = self.init_user().await;
        Ok(())
    }

    /// Log out on the server (best effort) and clear the local session.
    ///
    /// # Errors
    ///
    /// Returns the remote failure after local state has been cleared, or
    /// [`ApiError::Store`] if the store could not be cleared.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        let token = self.token.clone().or_else(|| self.http.token_store().get());
        let remote = match token {
            Some(token) => self.auth().logout(TokenChoice::Explicit(token)).await,
            None => Ok(()),
        };
        if let Err(e) = &remote {
            tracing::warn!(error = %e, "server logout failed, clearing local session anyway");
        }

        self.token = None;
        self.user = None;
        self.http.token_store().set(None)?;
        tracing::info!("logged out");
        remote
    }

    /// Create an account. The session is not logged in afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's validation message.
    pub async fn register(&self, username: &str, password: &str, re_password: &str) -> Result<User, ApiError> {
        let user = self.auth().register(username, password, re_password).await?;
        tracing::info!(username = %user.username, "registered");
        Ok(user)
    }

    /// Update the profile and replace the cached user with the response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's validation message;
    /// the cached user is unchanged.
    pub async fn update_profile(&mut self, changes: &UpdateMe) -> Result<&User, ApiError> {
        let user = self.auth().update_me(changes).await?;
        Ok(self.user.insert(user))
    }
}
