//! Typed request builders for the Sueldos resource endpoints.
//!
//! Thin wrappers over `ApiClient`: each method names a backend route, passes
//! its filters as a typed query or body, and decodes the typed response.
//! All of them go through the bearer-attachment/refresh machinery; the auth
//! endpoints are exempt from the refresh protocol by path.

use serde::Serialize;

use crate::models::{
    Constants, HealthStatus, Liquidacion, LiquidacionProcesamiento, LoginResponse, NewUser,
    PaginatedResponse, Personal, Recibo, ReciboCompleto, ToggleActivaResponse, User, UserUpdate,
};

use super::{ApiClient, ApiError};

// ============================================================================
// Query filters
// ============================================================================

/// Plain pagination, used where no other filters apply.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legajo: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legajo: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LiquidacionListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anio: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PersonalListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub programa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agrupamiento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horas: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anios: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legajo: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_nro: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_tipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuil: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ley: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReciboSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dni: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anio: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activa: Option<i64>,
}

// ============================================================================
// Endpoint methods
// ============================================================================

impl ApiClient {
    // ===== Auth =====

    /// Exchange credentials for a token pair and the user profile.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.post_json("/api/auth/login", &body).await
    }

    /// Tell the backend to revoke the session. The response is ignored by
    /// callers; local state is cleared regardless of the outcome.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty("/api/auth/logout").await
    }

    /// Fetch the profile of the currently authenticated user.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get_json("/api/auth/me").await
    }

    pub async fn change_my_password(
        &self,
        password_actual: &str,
        nueva_password: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "password_actual": password_actual,
            "nueva_password": nueva_password,
        });
        self.post_json_empty("/api/auth/change-password", &body).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "email": email });
        self.post_json_empty("/api/auth/forgot-password", &body).await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "token": token, "new_password": new_password });
        self.post_json_empty("/api/auth/reset-password", &body).await
    }

    // ===== Users =====

    pub async fn list_users(
        &self,
        query: &UserListQuery,
    ) -> Result<PaginatedResponse<User>, ApiError> {
        self.get_json_query("/api/users", query).await
    }

    pub async fn search_users(&self, query: &UserSearchQuery) -> Result<Vec<User>, ApiError> {
        self.get_json_query("/api/users/search", query).await
    }

    pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
        self.get_json(&format!("/api/users/{}", id)).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.post_json("/api/users", user).await
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        self.put_json(&format!("/api/users/{}", id), update).await
    }

    /// Administrative password reset for another user.
    pub async fn change_user_password(
        &self,
        user_id: i64,
        nueva_password: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({ "user_id": user_id, "nueva_password": nueva_password });
        self.post_json_empty("/api/users/change-password", &body).await
    }

    // ===== Liquidaciones =====

    pub async fn list_liquidaciones(
        &self,
        query: &LiquidacionListQuery,
    ) -> Result<PaginatedResponse<Liquidacion>, ApiError> {
        self.get_json_query("/api/liquidaciones", query).await
    }

    pub async fn get_liquidacion(&self, id: i64) -> Result<Liquidacion, ApiError> {
        self.get_json(&format!("/api/liquidaciones/{}", id)).await
    }

    /// Upload a liquidación source file for processing.
    pub async fn procesar_liquidacion(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<LiquidacionProcesamiento, ApiError> {
        self.post_multipart("/api/liquidaciones/procesar", file_name, contents)
            .await
    }

    pub async fn delete_liquidacion(&self, id: i64) -> Result<(), ApiError> {
        self.delete_empty(&format!("/api/liquidaciones/{}", id)).await
    }

    /// Flip whether a liquidación is the active one for its period.
    pub async fn toggle_liquidacion_activa(
        &self,
        id: i64,
    ) -> Result<ToggleActivaResponse, ApiError> {
        self.patch_json(&format!("/api/liquidaciones/{}/toggle-activa", id))
            .await
    }

    // ===== Personal =====

    pub async fn list_personal(
        &self,
        query: &PersonalListQuery,
    ) -> Result<PaginatedResponse<Personal>, ApiError> {
        self.get_json_query("/api/personal", query).await
    }

    // ===== Recibos =====

    /// The authenticated user's own pay slips.
    pub async fn mis_recibos(
        &self,
        query: &PageQuery,
    ) -> Result<PaginatedResponse<Recibo>, ApiError> {
        self.get_json_query("/api/recibos/mis-recibos", query).await
    }

    /// Search across all pay slips; gated server-side to helpdesk roles.
    pub async fn buscar_recibos(
        &self,
        query: &ReciboSearchQuery,
    ) -> Result<PaginatedResponse<Recibo>, ApiError> {
        self.get_json_query("/api/recibos/buscar", query).await
    }

    pub async fn get_recibo(&self, id: i64) -> Result<ReciboCompleto, ApiError> {
        self.get_json(&format!("/api/recibos/{}", id)).await
    }

    /// Download the rendered PDF for a pay slip.
    pub async fn descargar_recibo_pdf(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&format!("/api/recibos/{}/pdf", id)).await
    }

    // ===== Constants / health =====

    pub async fn constants(&self) -> Result<Constants, ApiError> {
        self.get_json("/api/constants").await
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health").await
    }
}
