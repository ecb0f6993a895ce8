//! REST API client module for the Sueldos backend.
//!
//! This module provides the `ApiClient` for communicating with the payroll
//! API: authentication, users, liquidaciones, personal and recibos.
//!
//! The API uses JWT bearer token authentication with a refresh-token
//! exchange; expired access tokens are renewed transparently.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{ApiClient, SessionEvent};
pub use endpoints::{
    LiquidacionListQuery, PageQuery, PersonalListQuery, ReciboSearchQuery, UserListQuery,
    UserSearchQuery,
};
pub use error::ApiError;
