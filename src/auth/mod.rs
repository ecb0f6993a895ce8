//! Authentication module for managing user sessions and tokens.
//!
//! This module provides:
//! - `SessionStore`: login/logout lifecycle, profile and role checks
//! - `TokenStore`: pluggable persisted storage for the bearer token pair,
//!   with file, OS keychain and in-memory implementations
//!
//! The token store is shared with the API client so the refresh protocol
//! and the session observe the same persisted credentials.

pub mod session;
pub mod tokens;

pub use session::SessionStore;
pub use tokens::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};
