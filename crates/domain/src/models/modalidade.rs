//! Modalidade (sport category) reference data.

use serde::Serialize;

/// A sport category. Immutable reference data seeded by migration; users and
/// activities may only reference existing names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modalidade {
    pub id: i64,
    pub nome: String,
}

/// Public modalidade representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalidadeResponse {
    pub id: i64,
    pub nome: String,
}

impl From<Modalidade> for ModalidadeResponse {
    fn from(m: Modalidade) -> Self {
        Self {
            id: m.id,
            nome: m.nome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_modalidade() {
        let m = Modalidade {
            id: 3,
            nome: "FUTEBOL".to_string(),
        };
        let response = ModalidadeResponse::from(m);

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"id":3,"nome":"FUTEBOL"}"#);
    }
}
