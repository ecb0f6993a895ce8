use serde::{Deserialize, Serialize};

/// Employee master record as imported into a liquidación.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personal {
    pub id: i64,
    pub programa: String,
    pub agrupamiento: String,
    pub categoria: i64,
    pub horas: i64,
    pub anios: i64,
    pub personal_x_liquidaciones: i64,
    pub legajo: i64,
    pub created: String,
    pub doc_nro: i64,
    pub doc_tipo: String,
    pub cuil: i64,
    pub ley: i64,
    pub nombre: String,
}

impl Personal {
    /// Format the CUIL as XX-XXXXXXXX-X for display.
    /// Returns the plain digits if the value is not 11 digits long.
    pub fn cuil_display(&self) -> String {
        let digits = self.cuil.to_string();
        if digits.len() == 11 {
            format!("{}-{}-{}", &digits[0..2], &digits[2..10], &digits[10..11])
        } else {
            digits
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal_with_cuil(cuil: i64) -> Personal {
        Personal {
            id: 1,
            programa: "21".to_string(),
            agrupamiento: "A".to_string(),
            categoria: 3,
            horas: 35,
            anios: 12,
            personal_x_liquidaciones: 18,
            legajo: 4521,
            created: "2025-06-30T12:00:00".to_string(),
            doc_nro: 23456789,
            doc_tipo: "DNI".to_string(),
            cuil,
            ley: 1269,
            nombre: "García, María".to_string(),
        }
    }

    #[test]
    fn test_cuil_display() {
        assert_eq!(personal_with_cuil(27234567893).cuil_display(), "27-23456789-3");
        // Malformed values come back as-is rather than panicking.
        assert_eq!(personal_with_cuil(1234).cuil_display(), "1234");
    }
}
