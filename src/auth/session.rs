//! Session store: login/logout lifecycle, user profile and role checks.
//!
//! Holds the in-memory side of the session (profile, last login error) while
//! the token pair lives in the `TokenStore` shared with the API client, so
//! the refresh protocol and the session always observe the same credentials.

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{ApiClient, ApiError};
use crate::auth::TokenStore;
use crate::models::{roles, User};

/// Fallback message when the server rejects credentials without a detail
const MSG_INVALID_CREDENTIALS: &str = "Credenciales incorrectas";

/// Message when no response was received at all
const MSG_NO_CONNECTION: &str = "No se pudo conectar al servidor";

/// Message for request-side failures (bad URL, unreadable response)
const MSG_REQUEST_FAILED: &str = "Error al realizar la solicitud";

pub struct SessionStore {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    /// Profile of the authenticated user; `None` until login or
    /// `fetch_profile` completes.
    pub user: Option<User>,
    /// User-facing message from the last failed login.
    pub error: Option<String>,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        let tokens = api.token_store();
        Self {
            api,
            tokens,
            user: None,
            error: None,
        }
    }

    /// The token store shared with the API client.
    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// Derived from the persisted access token, so a token that survived a
    /// process restart counts even before the profile is hydrated.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token().is_some()
    }

    pub fn user_role(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.role.as_deref())
    }

    /// Membership test of the user's role in the allowed set.
    /// False when no user or no role is set.
    pub fn has_role(&self, allowed: &[&str]) -> bool {
        match self.user_role() {
            Some(role) => allowed.contains(&role),
            None => false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&[roles::ADMINISTRADOR])
    }

    pub fn is_mesa_ayuda(&self) -> bool {
        self.has_role(&[roles::ADMINISTRADOR, roles::MESA_AYUDA])
    }

    pub fn can_manage_liquidaciones(&self) -> bool {
        self.has_role(&[roles::ADMINISTRADOR, roles::LIQUIDACIONES])
    }

    pub fn can_view_liquidaciones(&self) -> bool {
        self.has_role(&[
            roles::ADMINISTRADOR,
            roles::LIQUIDACIONES,
            roles::MESA_AYUDA,
            roles::GERENCIAL,
        ])
    }

    pub fn can_view_personal(&self) -> bool {
        self.has_role(&[
            roles::ADMINISTRADOR,
            roles::MESA_AYUDA,
            roles::LIQUIDACIONES,
            roles::GERENCIAL,
        ])
    }

    pub fn can_search_recibos(&self) -> bool {
        self.has_role(&[roles::ADMINISTRADOR, roles::MESA_AYUDA, roles::GERENCIAL])
    }

    /// Authenticate against the backend. On success the token pair is
    /// persisted (refresh token only if the server returned one) and the
    /// profile stored. On failure the cause is reduced to a user-facing
    /// message in `self.error` and the tokens are left untouched.
    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        self.error = None;
        match self.api.login(username, password).await {
            Ok(response) => {
                self.tokens.store_access_token(&response.access_token);
                if let Some(ref refresh) = response.refresh_token {
                    self.tokens.store_refresh_token(refresh);
                }
                info!(username = %response.user.username, "login successful");
                self.user = Some(response.user);
                true
            }
            Err(error) => {
                debug!(error = %error, "login failed");
                self.error = Some(Self::login_error_message(&error));
                false
            }
        }
    }

    fn login_error_message(error: &ApiError) -> String {
        if error.is_server_response() {
            error
                .server_message()
                .unwrap_or(MSG_INVALID_CREDENTIALS)
                .to_string()
        } else if matches!(error, ApiError::Network(_)) {
            MSG_NO_CONNECTION.to_string()
        } else {
            MSG_REQUEST_FAILED.to_string()
        }
    }

    /// End the session. The remote call is best-effort; in-memory state and
    /// persisted tokens are cleared whatever the outcome.
    pub async fn logout(&mut self) {
        if let Err(error) = self.api.logout().await {
            debug!(error = %error, "remote logout failed");
        }
        self.user = None;
        self.tokens.clear();
    }

    /// Load the profile for the persisted access token. Any failure is
    /// treated as token invalidity: tokens and profile are cleared.
    pub async fn fetch_profile(&mut self) -> bool {
        if self.tokens.access_token().is_none() {
            return false;
        }
        match self.api.me().await {
            Ok(user) => {
                self.user = Some(user);
                true
            }
            Err(error) => {
                debug!(error = %error, "profile fetch failed, clearing session");
                self.user = None;
                self.tokens.clear();
                false
            }
        }
    }

    /// Hydrate the profile when persisted credentials survived a restart.
    pub async fn initialize(&mut self) {
        if self.tokens.access_token().is_some() {
            self.fetch_profile().await;
        }
    }
}
