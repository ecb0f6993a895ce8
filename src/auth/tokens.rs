//! Persisted token storage.
//!
//! The API client and the session store share one `TokenStore`: the client
//! reads the access token on every request and the refresh protocol writes
//! it, while login and logout own the full pair. Reads and writes never fail
//! the request path; storage errors are logged and treated as an absent
//! token.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Token file name inside the store directory
const TOKENS_FILE: &str = "tokens.json";

/// Service name for keychain entries
const SERVICE_NAME: &str = "sueldos-admin";

/// Keychain entry holding the access token
const ACCESS_TOKEN_KEY: &str = "access_token";

/// Keychain entry holding the refresh token
const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Storage capability for the bearer token pair.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn store_access_token(&self, token: &str);
    fn store_refresh_token(&self, token: &str);
    /// Remove both tokens.
    fn clear(&self);
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedTokens {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

// ============================================================================
// File-backed store
// ============================================================================

/// Token store persisted as a JSON file, one object with `access_token` and
/// `refresh_token` keys.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store persisting under the given directory.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            path: dir.join(TOKENS_FILE),
        }
    }

    fn read(&self) -> PersistedTokens {
        match self.try_read() {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "failed to read token file");
                PersistedTokens::default()
            }
        }
    }

    fn try_read(&self) -> Result<PersistedTokens> {
        if !self.path.exists() {
            return Ok(PersistedTokens::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read token file")?;
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn write(&self, tokens: &PersistedTokens) {
        if let Err(e) = self.try_write(tokens) {
            warn!(error = %e, "failed to write token file");
        }
    }

    fn try_write(&self, tokens: &PersistedTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.read().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token
    }

    fn store_access_token(&self, token: &str) {
        let mut tokens = self.read();
        tokens.access_token = Some(token.to_string());
        self.write(&tokens);
    }

    fn store_refresh_token(&self, token: &str) {
        let mut tokens = self.read();
        tokens.refresh_token = Some(token.to_string());
        self.write(&tokens);
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(error = %e, "failed to remove token file");
            }
        }
    }
}

// ============================================================================
// OS keychain store
// ============================================================================

/// Token store backed by the OS keychain via keyring.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a custom service name; separate installs can keep separate pairs.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        Entry::new(&self.service, key).ok()?.get_password().ok()
    }

    fn set(&self, key: &str, token: &str) {
        match Entry::new(&self.service, key) {
            Ok(entry) => {
                if let Err(e) = entry.set_password(token) {
                    warn!(key, error = %e, "failed to store token in keychain");
                }
            }
            Err(e) => warn!(key, error = %e, "failed to create keychain entry"),
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(entry) = Entry::new(&self.service, key) {
            // A missing entry is fine; clearing is idempotent.
            let _ = entry.delete_credential();
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    fn store_access_token(&self, token: &str) {
        self.set(ACCESS_TOKEN_KEY, token);
    }

    fn store_refresh_token(&self, token: &str) {
        self.set(REFRESH_TOKEN_KEY, token);
    }

    fn clear(&self) {
        self.remove(ACCESS_TOKEN_KEY);
        self.remove(REFRESH_TOKEN_KEY);
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Non-persisting token store. Useful for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<PersistedTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PersistedTokens> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.lock().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.lock().refresh_token.clone()
    }

    fn store_access_token(&self, token: &str) {
        self.lock().access_token = Some(token.to_string());
    }

    fn store_refresh_token(&self, token: &str) {
        self.lock().refresh_token = Some(token.to_string());
    }

    fn clear(&self) {
        *self.lock() = PersistedTokens::default();
    }
}
