use serde::{Deserialize, Serialize};

/// A payroll run for a month/year/type period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liquidacion {
    pub id: i64,
    pub mes: i64,
    pub anio: i64,
    pub tipo: i64,
    pub estado: i64,
    pub activa: i64,
    pub fecha_activacion: Option<String>,
    pub created: Option<String>,
}

impl Liquidacion {
    pub fn is_activa(&self) -> bool {
        self.activa == 1
    }

    pub fn periodo_display(&self) -> String {
        format!("{:02}/{}", self.mes, self.anio)
    }
}

/// Result of uploading a liquidación source file for processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidacionProcesamiento {
    pub liquidacion_id: i64,
    pub mes: Option<i64>,
    pub anio: Option<i64>,
    pub tipo: Option<i64>,
    pub registros_personal: Option<i64>,
    pub registros_recibos: Option<i64>,
    pub mensaje: String,
    // Backends differ in how progress is streamed: ws_url or sse_url.
    pub ws_url: Option<String>,
    pub sse_url: Option<String>,
}

impl LiquidacionProcesamiento {
    /// The progress-stream URL, whichever transport the backend offers.
    pub fn progress_url(&self) -> Option<&str> {
        self.ws_url.as_deref().or(self.sse_url.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleActivaResponse {
    pub mensaje: String,
    pub activa: bool,
}
