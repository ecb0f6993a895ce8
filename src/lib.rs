//! Core client library for the Sueldos payroll administration API.
//!
//! This crate provides everything a front end needs to talk to the Sueldos
//! backend:
//!
//! - `ApiClient`: authenticated HTTP client with transparent access-token
//!   renewal (bearer attachment, 401 interception, single-flight refresh)
//! - `SessionStore`: login/logout lifecycle, user profile, role checks
//! - `TokenStore`: pluggable persisted token storage (file, OS keychain,
//!   in-memory)
//! - Typed models for users, liquidaciones, personal and recibos
//! - A navigation guard for the admin route table

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod models;
pub mod routes;

pub use api::{ApiClient, ApiError, SessionEvent};
pub use auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, SessionStore, TokenStore};
pub use catalog::Catalog;
pub use config::Config;
pub use routes::{guard, NavDecision, Route, RouteMeta};
