use serde::{Deserialize, Serialize};

/// Role identifiers as stored in `User::role`. The server also publishes a
/// fine-grained permission list per role in the constants catalog, but
/// access checks are by coarse role membership only.
pub mod roles {
    pub const ADMINISTRADOR: &str = "administrador";
    pub const MESA_AYUDA: &str = "mesaayuda";
    pub const LIQUIDACIONES: &str = "liquidaciones";
    pub const GERENCIAL: &str = "gerencial";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Option<String>,
    pub legajo: Option<i64>,
    pub nombre: Option<String>,
    pub activo: Option<i64>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl User {
    /// Full name if the account has one, username otherwise.
    pub fn display_name(&self) -> &str {
        self.nombre.as_deref().unwrap_or(&self.username)
    }

    pub fn is_activo(&self) -> bool {
        self.activo == Some(1)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
}

/// Payload for creating a user account.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legajo: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
}

/// Partial update for a user account; unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
