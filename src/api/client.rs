//! Authenticated API client for the Sueldos backend.
//!
//! This module provides the `ApiClient` struct that every resource request
//! goes through. It attaches the persisted bearer token to outbound
//! requests, intercepts 401 responses and runs the token-refresh protocol:
//! at most one refresh exchange is in flight at any time, requests that
//! fail while an exchange is running wait for its outcome, and the original
//! request is reissued once with the renewed token.

use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{broadcast, oneshot, Mutex};
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::models::RefreshTokenResponse;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Token-refresh exchange endpoint. Called directly on the transport so the
/// exchange itself can never re-enter the 401 recovery path.
const REFRESH_PATH: &str = "/api/auth/refresh";

/// Capacity of the session event channel. Events are rare (one per forced
/// re-authentication), a small buffer is plenty.
const SESSION_EVENT_CAPACITY: usize = 8;

/// Emitted when the session can no longer be recovered and the user must
/// re-authenticate. Whatever owns navigation should subscribe, route to the
/// login entry point and discard state that assumes a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Invalidated,
}

/// Requests are exempt from the refresh protocol when they target an auth
/// endpoint; a 401 from login or refresh is a final answer, not an expiry.
fn is_auth_path(path: &str) -> bool {
    path.contains("/auth/")
}

/// Coordination state for the refresh protocol. `waiters` is non-empty only
/// while `in_flight` is true; both are inspected and mutated under one lock
/// so the check-and-set and the queue drain are a single critical section.
#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<Result<String, String>>>,
}

/// Outcome of a single refresh-token exchange.
enum RefreshOutcome {
    Renewed(String),
    MissingToken,
    Failed(ApiError),
}

/// API client for the Sueldos backend.
/// Clone is cheap - the reqwest client, token store and refresh state are
/// all shared, so clones uphold the at-most-one-refresh invariant together.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    refresh: Arc<Mutex<RefreshState>>,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    /// Create a new API client against the given base URL, reading and
    /// writing tokens through the given store.
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            refresh: Arc::new(Mutex::new(RefreshState::default())),
            events,
        })
    }

    /// The token store this client reads bearer tokens from. Shared with the
    /// session store so both observe the same persisted credentials.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// Subscribe to session lifecycle events.
    pub fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Request pipeline =====

    /// Send a request, attaching the persisted access token if present.
    /// On a 401 from a non-auth endpoint the refresh protocol runs and the
    /// request is reissued once; every other failure is classified as-is.
    async fn execute<F>(
        &self,
        method: Method,
        path: &str,
        prepare: F,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    {
        let mut builder = prepare(self.http.request(method.clone(), self.endpoint(path)));
        if let Some(token) = self.tokens.access_token() {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);

        if status == StatusCode::UNAUTHORIZED && !is_auth_path(path) {
            self.recover(method, path, &prepare, error).await
        } else {
            Err(error)
        }
    }

    /// Run the refresh protocol for a request that observed a 401.
    ///
    /// The task that finds no exchange in flight becomes the refresher;
    /// everyone else parks a oneshot in the waiter queue and reuses the
    /// refresher's outcome. Queued entries are settled in arrival order,
    /// all of them only once the single exchange has settled.
    async fn recover<F>(
        &self,
        method: Method,
        path: &str,
        prepare: &F,
        original: ApiError,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    {
        let waiter = {
            let mut state = self.refresh.lock().await;
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                None
            }
        };

        if let Some(rx) = waiter {
            return match rx.await {
                Ok(Ok(token)) => self.resend(method, path, prepare, &token).await,
                Ok(Err(cause)) => Err(ApiError::SessionExpired(cause)),
                // The refresher was dropped before settling; surface the
                // original 401 rather than leaving the caller pending.
                Err(_) => Err(original),
            };
        }

        let outcome = self.exchange_refresh_token().await;

        // Reset in_flight and take the queue in the same critical section:
        // no waiter may be released early and none may be left behind.
        let waiters = {
            let mut state = self.refresh.lock().await;
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        match outcome {
            RefreshOutcome::Renewed(token) => {
                for tx in waiters {
                    let _ = tx.send(Ok(token.clone()));
                }
                self.resend(method, path, prepare, &token).await
            }
            RefreshOutcome::MissingToken => {
                for tx in waiters {
                    let _ = tx.send(Err("no refresh token available".to_string()));
                }
                Err(original)
            }
            RefreshOutcome::Failed(error) => {
                let cause = error.to_string();
                for tx in waiters {
                    let _ = tx.send(Err(cause.clone()));
                }
                Err(error)
            }
        }
    }

    /// Issue exactly one refresh-token exchange. Any failure purges the
    /// persisted tokens and emits `SessionEvent::Invalidated`.
    async fn exchange_refresh_token(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            debug!("no refresh token available, invalidating session");
            self.invalidate_session();
            return RefreshOutcome::MissingToken;
        };

        let result = self
            .http
            .post(self.endpoint(REFRESH_PATH))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token refresh request failed");
                self.invalidate_session();
                return RefreshOutcome::Failed(ApiError::Network(e));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "token refresh rejected");
            self.invalidate_session();
            return RefreshOutcome::Failed(ApiError::from_status(status, &body));
        }

        match response.json::<RefreshTokenResponse>().await {
            Ok(renewed) => {
                self.tokens.store_access_token(&renewed.access_token);
                debug!("access token renewed");
                RefreshOutcome::Renewed(renewed.access_token)
            }
            Err(e) => {
                warn!(error = %e, "token refresh response unreadable");
                self.invalidate_session();
                RefreshOutcome::Failed(ApiError::Network(e))
            }
        }
    }

    /// Reissue a request with a freshly renewed token. Runs at most once per
    /// original request; another 401 here propagates without a second pass
    /// through the refresh protocol.
    async fn resend<F>(
        &self,
        method: Method,
        path: &str,
        prepare: &F,
        token: &str,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    {
        let builder = prepare(self.http.request(method, self.endpoint(path))).bearer_auth(token);
        let response = builder.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    fn invalidate_session(&self) {
        self.tokens.clear();
        let _ = self.events.send(SessionEvent::Invalidated);
    }

    // ===== Typed helpers used by the endpoint methods =====

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, |b| b).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn get_json_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.execute(Method::GET, path, |b| b.query(query)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.execute(Method::GET, path, |b| b).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub(crate) async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(Method::POST, path, |b| b.json(body)).await?;
        Ok(response.json().await?)
    }

    /// POST with a body where the response payload is irrelevant.
    pub(crate) async fn post_json_empty<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, |b| b.json(body)).await?;
        Ok(())
    }

    /// POST without a body where the response payload is irrelevant.
    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::POST, path, |b| b).await?;
        Ok(())
    }

    /// POST a single file as multipart form data. The form is rebuilt from
    /// the owned bytes on a retry since multipart bodies cannot be cloned.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(Method::POST, path, |b| {
                let part = reqwest::multipart::Part::bytes(contents.clone())
                    .file_name(file_name.to_string());
                b.multipart(reqwest::multipart::Form::new().part("file", part))
            })
            .await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(Method::PUT, path, |b| b.json(body)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn patch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::PATCH, path, |b| b).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn delete_empty(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, |b| b).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Run with RUST_LOG=debug to watch the protocol when a test misbehaves.
    fn init_test_tracing() {
        use tracing_subscriber::EnvFilter;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    fn client_with_tokens(
        uri: &str,
        access: Option<&str>,
        refresh: Option<&str>,
    ) -> (ApiClient, Arc<MemoryTokenStore>) {
        let store = Arc::new(MemoryTokenStore::new());
        if let Some(token) = access {
            store.store_access_token(token);
        }
        if let Some(token) = refresh {
            store.store_refresh_token(token);
        }
        let client = ApiClient::new(uri, store.clone() as Arc<dyn TokenStore>)
            .expect("failed to build client");
        (client, store)
    }

    #[test]
    fn test_is_auth_path() {
        assert!(is_auth_path("/api/auth/login"));
        assert!(is_auth_path("/api/auth/refresh"));
        assert!(is_auth_path("/api/auth/me"));
        assert!(!is_auth_path("/api/users"));
        assert!(!is_auth_path("/api/liquidaciones/3"));
        assert!(!is_auth_path("/health"));
    }

    #[tokio::test]
    async fn test_no_bearer_header_without_token() {
        let server = MockServer::start().await;
        // If a bearer header were attached this mock would win and fail the call.
        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok", "database": "ok"
            })))
            .with_priority(5)
            .mount(&server)
            .await;

        let (client, _) = client_with_tokens(&server.uri(), None, None);
        let health: crate::models::HealthStatus =
            client.get_json("/health").await.expect("health check failed");
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_refresh_renews_token_and_retries_original_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/personal"))
            .and(header("authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(json!({ "refresh_token": "R1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "T2", "token_type": "bearer", "expires_in": 900
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/personal"))
            .and(header("authorization", "Bearer T2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [], "total": 0, "page": 1, "per_page": 25, "pages": 0
            })))
            .mount(&server)
            .await;

        let (client, store) = client_with_tokens(&server.uri(), Some("T1"), Some("R1"));
        let page: crate::models::PaginatedResponse<crate::models::Personal> = client
            .get_json("/api/personal")
            .await
            .expect("request should succeed after transparent refresh");

        assert_eq!(page.total, 0);
        assert_eq!(store.access_token().as_deref(), Some("T2"));
        // The refresh token is only consumed, never replaced, by the exchange.
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_401s_issue_a_single_refresh() {
        init_test_tracing();
        let server = MockServer::start().await;
        for resource in ["/api/users", "/api/personal", "/api/liquidaciones"] {
            Mock::given(method("GET"))
                .and(path(resource))
                .and(header("authorization", "Bearer T1"))
                .respond_with(ResponseTemplate::new(401))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path(resource))
                .and(header("authorization", "Bearer T2"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": [], "total": 0, "page": 1, "per_page": 25, "pages": 0
                })))
                .mount(&server)
                .await;
        }
        // The delay keeps the exchange in flight while the other requests
        // observe their 401s and queue behind it.
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(100))
                    .set_body_json(json!({
                        "access_token": "T2", "token_type": "bearer", "expires_in": 900
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = client_with_tokens(&server.uri(), Some("T1"), Some("R1"));

        type Page = crate::models::PaginatedResponse<crate::models::Personal>;
        let results = futures::future::join_all([
            client.get_json::<Page>("/api/users"),
            client.get_json::<Page>("/api/personal"),
            client.get_json::<Page>("/api/liquidaciones"),
        ])
        .await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(store.access_token().as_deref(), Some("T2"));
        // expect(1) on the refresh mock is verified when the server drops.
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_refresh_failure_rejects_all_queued_requests() {
        init_test_tracing();
        let server = MockServer::start().await;
        for resource in ["/api/users", "/api/personal"] {
            Mock::given(method("GET"))
                .and(path(resource))
                .respond_with(ResponseTemplate::new(401))
                .mount(&server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_delay(Duration::from_millis(100))
                    .set_body_json(json!({
                        "error": { "code": "AUTH_401", "message": "Refresh token inválido" }
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = client_with_tokens(&server.uri(), Some("T1"), Some("R1"));
        let mut events = client.session_events();

        type Page = crate::models::PaginatedResponse<crate::models::Personal>;
        let (a, b) = tokio::join!(
            client.get_json::<Page>("/api/users"),
            client.get_json::<Page>("/api/personal"),
        );

        for result in [a, b] {
            match result {
                Err(ApiError::Unauthorized { .. }) | Err(ApiError::SessionExpired(_)) => {}
                other => panic!("expected refresh failure to propagate, got {:?}", other),
            }
        }
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert!(matches!(events.try_recv(), Ok(SessionEvent::Invalidated)));
    }

    #[tokio::test]
    async fn test_missing_refresh_token_propagates_original_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/personal"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "code": "AUTH_401", "message": "Token expirado" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (client, store) = client_with_tokens(&server.uri(), Some("T1"), None);
        let mut events = client.session_events();

        type Page = crate::models::PaginatedResponse<crate::models::Personal>;
        match client.get_json::<Page>("/api/personal").await {
            Err(ApiError::Unauthorized { message }) => {
                assert_eq!(message.as_deref(), Some("Token expirado"))
            }
            other => panic!("expected the original 401, got {:?}", other),
        }
        assert_eq!(store.access_token(), None);
        assert!(matches!(events.try_recv(), Ok(SessionEvent::Invalidated)));
    }

    #[tokio::test]
    async fn test_auth_route_401_never_triggers_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "detail": "Credenciales incorrectas" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (client, store) = client_with_tokens(&server.uri(), Some("T1"), Some("R1"));
        let result = client.login("admin", "wrong").await;

        match result {
            Err(ApiError::Unauthorized { message }) => {
                assert_eq!(message.as_deref(), Some("Credenciales incorrectas"))
            }
            other => panic!("expected Unauthorized, got {:?}", other),
        }
        // A login rejection leaves the persisted tokens untouched.
        assert_eq!(store.access_token().as_deref(), Some("T1"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_retried_request_is_not_retried_twice() {
        let server = MockServer::start().await;
        // 401 for both the original and the retried token: the retry's 401
        // must propagate instead of entering the protocol again.
        Mock::given(method("GET"))
            .and(path("/api/personal"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "T2", "token_type": "bearer", "expires_in": 900
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client_with_tokens(&server.uri(), Some("T1"), Some("R1"));

        type Page = crate::models::PaginatedResponse<crate::models::Personal>;
        match client.get_json::<Page>("/api/personal").await {
            Err(ApiError::Unauthorized { .. }) => {}
            other => panic!("expected Unauthorized after single retry, got {:?}", other),
        }
    }
}
