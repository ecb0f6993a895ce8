use serde::{Deserialize, Serialize};

/// A role as published by the server, including its permission list.
/// Access checks only ever use the coarse role id; `permisos` is carried
/// for display purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    #[serde(default)]
    pub permisos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipoLiquidacionInfo {
    pub id: i64,
    pub nombre: String,
    pub descripcion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstadoLiquidacionInfo {
    pub id: i64,
    pub nombre: String,
    pub descripcion: String,
}

/// Server-provided reference data, fetched once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    pub roles: Vec<RoleInfo>,
    pub tipos_liquidacion: Vec<TipoLiquidacionInfo>,
    pub estados_liquidacion: Vec<EstadoLiquidacionInfo>,
}
