//! Data models for the Sueldos API.
//!
//! This module contains the wire types exchanged with the backend:
//!
//! - `User`, `LoginResponse`, `RefreshTokenResponse`: authentication
//! - `Liquidacion`, `LiquidacionProcesamiento`: payroll runs
//! - `Personal`: employee master data
//! - `Recibo`, `ReciboCompleto`, `ReciboConcepto`: pay slips
//! - `Constants`: server-provided reference data (roles, tipos, estados)

pub mod common;
pub mod constants;
pub mod liquidacion;
pub mod personal;
pub mod recibo;
pub mod user;

pub use common::{HealthStatus, PaginatedResponse};
pub use constants::{Constants, EstadoLiquidacionInfo, RoleInfo, TipoLiquidacionInfo};
pub use liquidacion::{Liquidacion, LiquidacionProcesamiento, ToggleActivaResponse};
pub use personal::Personal;
pub use recibo::{Recibo, ReciboCompleto, ReciboConcepto};
pub use user::{roles, LoginResponse, NewUser, RefreshTokenResponse, User, UserUpdate};
