//! Cached reference data from the constants endpoint.
//!
//! Role, liquidación-type and liquidación-state names change rarely, so they
//! are fetched once and served from memory with a staleness window. Lookups
//! fall back to the raw identifier when the catalog has not loaded.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::api::ApiClient;
use crate::models::{Constants, EstadoLiquidacionInfo, RoleInfo, TipoLiquidacionInfo};

/// Consider the catalog stale after 1 hour.
/// Reference data changes with deployments, not with user activity.
const CATALOG_STALE_MINUTES: i64 = 60;

#[derive(Default)]
pub struct Catalog {
    constants: Option<Constants>,
    fetched_at: Option<DateTime<Utc>>,
    /// Message from the last failed fetch.
    pub error: Option<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the catalog if it is missing or stale. Returns whether usable
    /// data is available afterwards; a failed refresh keeps serving the
    /// previous data when there is any.
    pub async fn fetch(&mut self, api: &ApiClient) -> bool {
        if self.constants.is_some() && !self.is_stale() {
            return true;
        }
        match api.constants().await {
            Ok(constants) => {
                debug!(
                    roles = constants.roles.len(),
                    tipos = constants.tipos_liquidacion.len(),
                    "catalog loaded"
                );
                self.constants = Some(constants);
                self.fetched_at = Some(Utc::now());
                self.error = None;
                true
            }
            Err(error) => {
                self.error = Some(error.to_string());
                self.constants.is_some()
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        match self.fetched_at {
            Some(at) => Utc::now() - at > Duration::minutes(CATALOG_STALE_MINUTES),
            None => true,
        }
    }

    pub fn roles(&self) -> &[RoleInfo] {
        self.constants.as_ref().map_or(&[], |c| &c.roles)
    }

    pub fn tipos_liquidacion(&self) -> &[TipoLiquidacionInfo] {
        self.constants.as_ref().map_or(&[], |c| &c.tipos_liquidacion)
    }

    pub fn estados_liquidacion(&self) -> &[EstadoLiquidacionInfo] {
        self.constants.as_ref().map_or(&[], |c| &c.estados_liquidacion)
    }

    pub fn role_name(&self, role_id: &str) -> String {
        self.roles()
            .iter()
            .find(|r| r.id == role_id)
            .map(|r| r.nombre.clone())
            .unwrap_or_else(|| role_id.to_string())
    }

    pub fn tipo_liquidacion_name(&self, tipo_id: i64) -> String {
        self.tipos_liquidacion()
            .iter()
            .find(|t| t.id == tipo_id)
            .map(|t| t.nombre.clone())
            .unwrap_or_else(|| format!("Tipo {}", tipo_id))
    }

    pub fn estado_liquidacion_name(&self, estado_id: i64) -> String {
        self.estados_liquidacion()
            .iter()
            .find(|e| e.id == estado_id)
            .map(|e| e.nombre.clone())
            .unwrap_or_else(|| format!("Estado {}", estado_id))
    }
}
