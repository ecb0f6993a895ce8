use serde::{Deserialize, Serialize};

/// A single line item on a pay slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReciboConcepto {
    pub id: i64,
    pub codigo: String,
    pub texto: String,
    pub monto: f64,
    pub tipo: Option<String>,
}

/// Pay slip summary as returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recibo {
    pub id: i64,
    pub legajo: i64,
    pub created: String,
    pub recibos_x_liquidaciones: i64,
    pub mes: i64,
    pub anio: i64,
    pub tipo: i64,
    pub activa: i64,
}

impl Recibo {
    pub fn periodo_display(&self) -> String {
        format!("{:02}/{}", self.mes, self.anio)
    }
}

/// Pay slip detail with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReciboCompleto {
    #[serde(flatten)]
    pub recibo: Recibo,
    pub modified: String,
    pub fecha_activacion: Option<String>,
    pub conceptos: Vec<ReciboConcepto>,
}

impl ReciboCompleto {
    /// Net amount: deductions carry negative montos.
    pub fn total(&self) -> f64 {
        self.conceptos.iter().map(|c| c.monto).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recibo_completo() {
        let json = r#"{
            "id": 7, "legajo": 1234, "created": "2025-06-30T12:00:00",
            "recibos_x_liquidaciones": 18, "mes": 6, "anio": 2025,
            "tipo": 1, "activa": 1, "modified": "2025-07-01T09:00:00",
            "conceptos": [
                { "id": 1, "codigo": "101", "texto": "Sueldo básico", "monto": 850000.5, "tipo": "haber" },
                { "id": 2, "codigo": "810", "texto": "Jubilación", "monto": -93500.0 }
            ]
        }"#;

        let recibo: ReciboCompleto = serde_json::from_str(json).expect("Failed to parse recibo");
        assert_eq!(recibo.recibo.id, 7);
        assert_eq!(recibo.recibo.periodo_display(), "06/2025");
        assert_eq!(recibo.fecha_activacion, None);
        assert_eq!(recibo.conceptos.len(), 2);
        assert!((recibo.total() - 756500.5).abs() < f64::EPSILON);
    }
}
